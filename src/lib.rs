//! Duplicate detection and hierarchy validation for organization
//! directories.
//!
//! The core is pure and synchronous: a caller loads a table of
//! organization records once, then runs the duplicate matcher, the
//! cluster builder, and the hierarchy validator as plain functions over
//! the same records. Callers (a CLI, a batch job, a test) control when
//! computation happens; nothing here caches state between invocations.

pub mod clustering;
pub mod export;
pub mod hierarchy;
pub mod ingest;
pub mod matching;
pub mod models;

pub use models::{Cluster, HierarchyEdge, MatchCandidate, MatchMode, OrgRecord, ValidationReport};
