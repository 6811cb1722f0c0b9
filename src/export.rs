//! Delimited-text output for match candidates, clusters, and the
//! hierarchy table. Labels always use raw names, never the normalized
//! comparison form.

use std::io::Write;

use anyhow::{Context, Result};

use crate::hierarchy::HierarchyRow;
use crate::models::{Cluster, MatchCandidate, OrgRecord};

/// Write match candidates as `org_a,org_b,score` rows.
pub fn write_matches<W: Write>(
    writer: W,
    records: &[OrgRecord],
    matches: &[MatchCandidate],
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["org_a", "org_b", "score"])
        .context("failed to write match header")?;
    for candidate in matches {
        let score = format!("{:.2}", candidate.score);
        csv_writer
            .write_record([
                records[candidate.index_a].raw_name.as_str(),
                records[candidate.index_b].raw_name.as_str(),
                score.as_str(),
            ])
            .context("failed to write match row")?;
    }
    csv_writer.flush().context("failed to flush match output")?;
    Ok(())
}

/// Write clusters as one row per member, tagged with a 1-based cluster
/// id.
pub fn write_clusters<W: Write>(
    writer: W,
    records: &[OrgRecord],
    clusters: &[Cluster],
) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    csv_writer
        .write_record(["cluster", "org_name"])
        .context("failed to write cluster header")?;
    for (cluster_id, cluster) in clusters.iter().enumerate() {
        for &member in &cluster.members {
            let id = (cluster_id + 1).to_string();
            csv_writer
                .write_record([id.as_str(), records[member].raw_name.as_str()])
                .context("failed to write cluster row")?;
        }
    }
    csv_writer.flush().context("failed to flush cluster output")?;
    Ok(())
}

/// Write the resolved hierarchy table.
pub fn write_hierarchy<W: Write>(writer: W, rows: &[HierarchyRow]) -> Result<()> {
    let mut csv_writer = csv::Writer::from_writer(writer);
    for row in rows {
        csv_writer
            .serialize(row)
            .context("failed to write hierarchy row")?;
    }
    csv_writer
        .flush()
        .context("failed to flush hierarchy output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hierarchy;
    use crate::models::MatchMode;

    fn sample_records() -> Vec<OrgRecord> {
        vec![
            OrgRecord::new("Acme Inc", Some("A1".to_string()), None),
            OrgRecord::new("Acme Ltd", Some("A2".to_string()), Some("A1".to_string())),
            OrgRecord::new("Globex LLC", Some("G1".to_string()), Some("X9".to_string())),
        ]
    }

    #[test]
    fn test_matches_use_raw_names() {
        let records = sample_records();
        let matches = crate::matching::find_matches(&records, 100.0, MatchMode::Ratio);
        assert_eq!(matches.len(), 1);

        let mut out = Vec::new();
        write_matches(&mut out, &records, &matches).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "org_a,org_b,score");
        assert_eq!(lines[1], "Acme Inc,Acme Ltd,100.00");
    }

    #[test]
    fn test_cluster_rows_carry_cluster_ids() {
        let records = sample_records();
        let clusters = crate::clustering::build_clusters(&records, 100.0);

        let mut out = Vec::new();
        write_clusters(&mut out, &records, &clusters).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["cluster,org_name", "1,Acme Inc", "1,Acme Ltd"]);
    }

    #[test]
    fn test_hierarchy_table_round_trip() {
        let records = sample_records();
        let rows = hierarchy::hierarchy_rows(&records);

        let mut out = Vec::new();
        write_hierarchy(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "org_code,org_name,parent_code,parent_name");
        assert_eq!(lines[1], "A1,Acme Inc,,");
        assert_eq!(lines[2], "A2,Acme Ltd,A1,Acme Inc");
        assert_eq!(lines[3], "G1,Globex LLC,X9,");
    }

    #[test]
    fn test_empty_results_still_produce_headers() {
        let records: Vec<OrgRecord> = Vec::new();
        let mut out = Vec::new();
        write_matches(&mut out, &records, &[]).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "org_a,org_b,score\n");
    }
}
