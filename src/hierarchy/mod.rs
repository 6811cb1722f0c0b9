//! Validation of the parent/child hierarchy declared through code
//! references.

use std::collections::HashMap;

use log::debug;
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;

use crate::models::{HierarchyEdge, OrgRecord, ValidationReport};

/// One display row of the hierarchy table: the record's own code and
/// name plus its parent reference resolved to the parent's raw name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct HierarchyRow {
    pub org_code: Option<String>,
    pub org_name: String,
    pub parent_code: Option<String>,
    pub parent_name: Option<String>,
}

/// Check the declared hierarchy for dangling parent references,
/// duplicated codes, and reference cycles.
///
/// The org_code → record mapping is built last-write-wins, so when a
/// code is claimed twice the later row owns it; the earlier claim is
/// surfaced in `duplicate_codes` rather than dropped silently. A record
/// whose parent cell is empty or missing has no parent and is never
/// flagged dangling. Pure function of the input table.
pub fn validate(records: &[OrgRecord]) -> ValidationReport {
    let mut code_to_index: HashMap<&str, usize> = HashMap::new();
    let mut duplicate_codes: Vec<String> = Vec::new();

    for (index, record) in records.iter().enumerate() {
        if let Some(code) = record.code() {
            if code_to_index.insert(code, index).is_some()
                && !duplicate_codes.iter().any(|c| c == code)
            {
                duplicate_codes.push(code.to_string());
            }
        }
    }

    let mut dangling_parents = Vec::new();
    for (index, record) in records.iter().enumerate() {
        if let Some(parent) = record.parent() {
            if !code_to_index.contains_key(parent) {
                dangling_parents.push(index);
            }
        }
    }

    let cycles = find_cycles(records, &code_to_index);
    debug!(
        "hierarchy validation: {} dangling, {} duplicate codes, {} cycles over {} records",
        dangling_parents.len(),
        duplicate_codes.len(),
        cycles.len(),
        records.len()
    );

    ValidationReport {
        dangling_parents,
        duplicate_codes,
        cycles,
    }
}

/// One edge per record that declares both its own code and a parent
/// code, for an external graph renderer. References to unknown parents
/// are included as declared.
pub fn hierarchy_edges(records: &[OrgRecord]) -> Vec<HierarchyEdge> {
    records
        .iter()
        .filter_map(|record| {
            let child = record.code()?;
            let parent = record.parent()?;
            Some(HierarchyEdge {
                child_code: child.to_string(),
                parent_code: parent.to_string(),
            })
        })
        .collect()
}

/// The input table with parent codes resolved to display names, one row
/// per record in input order. Unresolvable parents leave `parent_name`
/// empty.
pub fn hierarchy_rows(records: &[OrgRecord]) -> Vec<HierarchyRow> {
    let mut code_to_name: HashMap<&str, &str> = HashMap::new();
    for record in records {
        if let Some(code) = record.code() {
            code_to_name.insert(code, record.raw_name.as_str());
        }
    }

    records
        .iter()
        .map(|record| HierarchyRow {
            org_code: record.code().map(str::to_string),
            org_name: record.raw_name.clone(),
            parent_code: record.parent().map(str::to_string),
            parent_name: record
                .parent()
                .and_then(|p| code_to_name.get(p))
                .map(|n| n.to_string()),
        })
        .collect()
}

/// Find reference cycles among resolvable codes. Because each code has
/// at most one parent edge, every strongly connected component larger
/// than one node is a simple ring; it is reported once, starting from
/// its smallest code and following parent references around the ring.
fn find_cycles<'a>(
    records: &'a [OrgRecord],
    code_to_index: &HashMap<&'a str, usize>,
) -> Vec<Vec<String>> {
    let mut graph: DiGraph<&str, ()> = DiGraph::new();
    let mut code_nodes: HashMap<&str, NodeIndex> = HashMap::new();

    // Nodes in record order so the output is deterministic.
    for record in records {
        if let Some(code) = record.code() {
            code_nodes
                .entry(code)
                .or_insert_with(|| graph.add_node(code));
        }
    }
    for (index, record) in records.iter().enumerate() {
        if let Some(code) = record.code() {
            // Only the winning claimant of a duplicated code defines its
            // parent edge, mirroring the last-write-wins mapping.
            if code_to_index.get(code) != Some(&index) {
                continue;
            }
            if let Some(parent) = record.parent() {
                if code_to_index.contains_key(parent) {
                    graph.add_edge(code_nodes[code], code_nodes[parent], ());
                }
            }
        }
    }

    let mut cycles = Vec::new();
    for scc in tarjan_scc(&graph) {
        let is_self_loop =
            scc.len() == 1 && graph.find_edge(scc[0], scc[0]).is_some();
        if scc.len() < 2 && !is_self_loop {
            continue;
        }

        let start = scc
            .iter()
            .map(|&n| graph[n])
            .min()
            .unwrap_or_default();
        let mut sequence = vec![start.to_string()];
        let mut current = resolved_parent(start, records, code_to_index);
        while let Some(code) = current {
            if code == start {
                break;
            }
            sequence.push(code.to_string());
            current = resolved_parent(code, records, code_to_index);
        }
        cycles.push(sequence);
    }

    cycles.sort();
    cycles
}

/// The parent a code resolves to under the last-write-wins mapping, or
/// nothing when the parent is absent or unknown.
fn resolved_parent<'a>(
    code: &str,
    records: &'a [OrgRecord],
    code_to_index: &HashMap<&'a str, usize>,
) -> Option<&'a str> {
    let record = records.get(*code_to_index.get(code)?)?;
    let parent = record.parent()?;
    code_to_index.contains_key(parent).then_some(parent)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, code: Option<&str>, parent: Option<&str>) -> OrgRecord {
        OrgRecord::new(
            name,
            code.map(str::to_string),
            parent.map(str::to_string),
        )
    }

    #[test]
    fn test_dangling_parent_detection() {
        let records = vec![
            record("Acme Inc", Some("A1"), None),
            record("ACME INCORPORATED", Some("A2"), Some("A1")),
            record("Globex LLC", Some("G1"), Some("X9")),
        ];
        let report = validate(&records);
        assert_eq!(report.dangling_parents, vec![2]);
        assert!(report.duplicate_codes.is_empty());
        assert!(report.cycles.is_empty());
    }

    #[test]
    fn test_missing_parent_is_not_dangling() {
        let records = vec![
            record("Acme Inc", Some("A1"), None),
            record("Acme Europe", Some("A2"), Some("")),
            record("Acme Asia", Some("A3"), Some("  ")),
        ];
        let report = validate(&records);
        assert!(report.dangling_parents.is_empty());
    }

    #[test]
    fn test_duplicate_codes_resolve_last_write_wins() {
        let records = vec![
            record("First Claim", Some("D1"), None),
            record("Second Claim", Some("D1"), None),
            record("Child Org", Some("C1"), Some("D1")),
        ];
        let report = validate(&records);
        assert_eq!(report.duplicate_codes, vec!["D1".to_string()]);
        // The reference still resolves, so the child is not dangling.
        assert!(report.dangling_parents.is_empty());

        let rows = hierarchy_rows(&records);
        assert_eq!(rows[2].parent_name.as_deref(), Some("Second Claim"));
    }

    #[test]
    fn test_cycle_detection() {
        let records = vec![
            record("Org A", Some("A"), Some("B")),
            record("Org B", Some("B"), Some("C")),
            record("Org C", Some("C"), Some("A")),
            record("Org D", Some("D"), Some("A")),
        ];
        let report = validate(&records);
        assert_eq!(report.cycles, vec![vec!["A".to_string(), "B".to_string(), "C".to_string()]]);
        assert!(report.dangling_parents.is_empty());
    }

    #[test]
    fn test_self_reference_is_a_cycle_of_one() {
        let records = vec![record("Ouroboros", Some("S"), Some("S"))];
        let report = validate(&records);
        assert_eq!(report.cycles, vec![vec!["S".to_string()]]);
        // The code resolves to itself, so it is not dangling.
        assert!(report.dangling_parents.is_empty());
    }

    #[test]
    fn test_hierarchy_edges_skip_records_without_codes() {
        let records = vec![
            record("Acme Inc", Some("A1"), None),
            record("Acme Europe", Some("A2"), Some("A1")),
            record("No Code Org", None, Some("A1")),
            record("Globex LLC", Some("G1"), Some("X9")),
        ];
        let edges = hierarchy_edges(&records);
        assert_eq!(
            edges,
            vec![
                HierarchyEdge {
                    child_code: "A2".to_string(),
                    parent_code: "A1".to_string(),
                },
                HierarchyEdge {
                    child_code: "G1".to_string(),
                    parent_code: "X9".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_hierarchy_rows_resolve_parent_names() {
        let records = vec![
            record("Acme Inc", Some("A1"), None),
            record("Acme Europe", Some("A2"), Some("A1")),
            record("Globex LLC", Some("G1"), Some("X9")),
        ];
        let rows = hierarchy_rows(&records);
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].parent_name, None);
        assert_eq!(rows[1].parent_name.as_deref(), Some("Acme Inc"));
        assert_eq!(rows[1].parent_code.as_deref(), Some("A1"));
        assert_eq!(rows[2].parent_name, None); // X9 resolves to nothing
        assert_eq!(rows[2].parent_code.as_deref(), Some("X9"));
    }

    #[test]
    fn test_validate_does_not_mutate_input() {
        let records = vec![
            record("Acme Inc", Some("A1"), None),
            record("Globex LLC", Some("G1"), Some("X9")),
        ];
        let before = records.clone();
        let _ = validate(&records);
        let _ = hierarchy_rows(&records);
        assert_eq!(records, before);
    }

    #[test]
    fn test_empty_table() {
        let report = validate(&[]);
        assert!(report.is_clean());
        assert!(hierarchy_edges(&[]).is_empty());
        assert!(hierarchy_rows(&[]).is_empty());
    }
}
