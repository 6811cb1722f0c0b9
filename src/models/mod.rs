//! Core data types shared by the matching, clustering, and hierarchy
//! modules.

use serde::{Deserialize, Serialize};

use crate::matching::normalize::normalize_name;

/// One row of the input table. Identity is the row position in the input
/// sequence, not the (optional, possibly duplicated) `org_code`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrgRecord {
    /// Name as it appeared in the source; always used for display.
    pub raw_name: String,
    /// Cached canonical comparison form of `raw_name`.
    pub normalized_name: String,
    pub org_code: Option<String>,
    pub parent_code: Option<String>,
}

impl OrgRecord {
    /// Build a record, deriving and caching the normalized name.
    pub fn new(
        raw_name: impl Into<String>,
        org_code: Option<String>,
        parent_code: Option<String>,
    ) -> Self {
        let raw_name = raw_name.into();
        let normalized_name = normalize_name(&raw_name);
        Self {
            raw_name,
            normalized_name,
            org_code,
            parent_code,
        }
    }

    /// Organization code, with empty and whitespace-only cells treated as
    /// absent.
    pub fn code(&self) -> Option<&str> {
        self.org_code.as_deref().filter(|c| !c.trim().is_empty())
    }

    /// Parent code, with empty and whitespace-only cells treated as
    /// absent. A record without a parent is never a dangling reference.
    pub fn parent(&self) -> Option<&str> {
        self.parent_code.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Similarity scoring variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Edit-distance similarity over the strings as given; sensitive to
    /// word order.
    Ratio,
    /// Tokenize on whitespace, sort tokens, rejoin, then score; word
    /// order no longer matters.
    TokenSort,
}

impl MatchMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchMode::Ratio => "ratio",
            MatchMode::TokenSort => "token_sort",
        }
    }
}

/// A pair of records whose similarity met the matcher's threshold.
/// `index_a < index_b`; each unordered pair is reported once.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchCandidate {
    pub index_a: usize,
    pub index_b: usize,
    /// Similarity in [0,100].
    pub score: f64,
}

/// A group of two or more records considered probable duplicates.
/// Members are record indices into the input sequence, never repeated
/// within one cluster. Under the greedy strategy the first member is the
/// seed the others were scored against.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Cluster {
    pub members: Vec<usize>,
}

impl Cluster {
    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// A declared child-to-parent reference, present only for records that
/// carry both their own code and a non-empty parent code. Handed to an
/// external graph renderer; dangling references are included as declared.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyEdge {
    pub child_code: String,
    pub parent_code: String,
}

/// Findings of the hierarchy validator. Empty lists are valid outcomes,
/// not failures.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    /// Indices of records whose parent_code resolves to no known
    /// org_code.
    pub dangling_parents: Vec<usize>,
    /// Codes claimed by more than one record. Resolution elsewhere is
    /// last-write-wins, matching the mapping used for dangling checks.
    pub duplicate_codes: Vec<String>,
    /// Code sequences forming reference cycles, each reported once
    /// starting from its lexicographically smallest code. A
    /// self-referencing record is a cycle of one.
    pub cycles: Vec<Vec<String>>,
}

impl ValidationReport {
    /// True when validation produced no findings at all.
    pub fn is_clean(&self) -> bool {
        self.dangling_parents.is_empty() && self.duplicate_codes.is_empty() && self.cycles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_record_caches_normalized_name() {
        let record = OrgRecord::new("Acme Inc", Some("A1".to_string()), None);
        assert_eq!(record.raw_name, "Acme Inc");
        assert_eq!(record.normalized_name, "acme");
    }

    #[test]
    fn test_empty_codes_treated_as_absent() {
        let record = OrgRecord::new("Acme", Some("".to_string()), Some("  ".to_string()));
        assert_eq!(record.code(), None);
        assert_eq!(record.parent(), None);

        let record = OrgRecord::new("Acme", Some("A1".to_string()), Some("P1".to_string()));
        assert_eq!(record.code(), Some("A1"));
        assert_eq!(record.parent(), Some("P1"));
    }

    #[test]
    fn test_match_mode_as_str() {
        assert_eq!(MatchMode::Ratio.as_str(), "ratio");
        assert_eq!(MatchMode::TokenSort.as_str(), "token_sort");
    }

    #[test]
    fn test_clean_report() {
        assert!(ValidationReport::default().is_clean());
        let report = ValidationReport {
            dangling_parents: vec![2],
            ..Default::default()
        };
        assert!(!report.is_clean());
    }
}
