//! CSV ingestion. The analyses operate on one fully-loaded finite table
//! per invocation; this module produces that table.

use std::path::Path;

use anyhow::{bail, Context, Result};
use log::info;
use serde::Deserialize;

use crate::models::OrgRecord;

/// A parsed input table.
#[derive(Debug, Clone)]
pub struct OrgTable {
    pub records: Vec<OrgRecord>,
    /// True when both `org_code` and `parent_code` columns exist in the
    /// source. Hierarchy validation is skipped entirely when false —
    /// absent columns are a property of the table, not a validator
    /// error.
    pub has_hierarchy_columns: bool,
}

#[derive(Debug, Deserialize)]
struct RawOrgRow {
    org_name: String,
    #[serde(default)]
    org_code: Option<String>,
    #[serde(default)]
    parent_code: Option<String>,
}

/// Load organization records from a CSV file with an `org_name` column
/// and optional `org_code`/`parent_code` columns. Empty cells in the
/// optional columns are treated as absent values.
pub fn load_csv(path: &Path) -> Result<OrgTable> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open {}", path.display()))?;

    let headers = reader
        .headers()
        .context("failed to read CSV headers")?
        .clone();
    if !headers.iter().any(|h| h == "org_name") {
        bail!("{}: missing required column org_name", path.display());
    }
    let has_hierarchy_columns =
        headers.iter().any(|h| h == "org_code") && headers.iter().any(|h| h == "parent_code");

    let mut records = Vec::new();
    for (row_number, row) in reader.deserialize::<RawOrgRow>().enumerate() {
        let row = row.with_context(|| format!("failed to parse CSV row {}", row_number + 2))?;
        records.push(OrgRecord::new(row.org_name, row.org_code, row.parent_code));
    }

    info!(
        "loaded {} records from {} (hierarchy columns present: {})",
        records.len(),
        path.display(),
        has_hierarchy_columns
    );
    Ok(OrgTable {
        records,
        has_hierarchy_columns,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn csv_file(contents: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_full_table() {
        let file = csv_file(
            "org_name,org_code,parent_code\n\
             Acme Inc,A1,\n\
             ACME INCORPORATED,A2,A1\n\
             Globex LLC,G1,X9\n",
        );
        let table = load_csv(file.path()).unwrap();

        assert!(table.has_hierarchy_columns);
        assert_eq!(table.records.len(), 3);
        assert_eq!(table.records[0].normalized_name, "acme");
        assert_eq!(table.records[1].normalized_name, "acme incorporated");
        assert_eq!(table.records[0].parent(), None); // empty cell
        assert_eq!(table.records[1].parent(), Some("A1"));
        assert_eq!(table.records[2].code(), Some("G1"));
    }

    #[test]
    fn test_name_only_table_skips_hierarchy() {
        let file = csv_file("org_name\nAcme Inc\nGlobex LLC\n");
        let table = load_csv(file.path()).unwrap();

        assert!(!table.has_hierarchy_columns);
        assert_eq!(table.records.len(), 2);
        assert_eq!(table.records[0].org_code, None);
        assert_eq!(table.records[0].parent_code, None);
    }

    #[test]
    fn test_missing_name_column_is_rejected() {
        let file = csv_file("organization,code\nAcme Inc,A1\n");
        let err = load_csv(file.path()).unwrap_err();
        assert!(err.to_string().contains("org_name"));
    }

    #[test]
    fn test_header_only_table_is_empty() {
        let file = csv_file("org_name,org_code,parent_code\n");
        let table = load_csv(file.path()).unwrap();
        assert!(table.records.is_empty());
        assert!(table.has_hierarchy_columns);
    }
}
