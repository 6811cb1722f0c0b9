//! orgmatch CLI: load an organization table, find probable duplicate
//! records, group them into similarity clusters, and validate the
//! declared code hierarchy.

use std::collections::HashMap;
use std::fs::File;
use std::io;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, ValueEnum};
use indicatif::{ProgressBar, ProgressStyle};
use log::{info, warn};
use serde::Serialize;
use uuid::Uuid;

use orgmatch::clustering::{self, ClusterStrategy};
use orgmatch::models::{MatchMode, ValidationReport};
use orgmatch::{export, hierarchy, ingest, matching};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Ratio,
    TokenSort,
}

impl From<ModeArg> for MatchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Ratio => MatchMode::Ratio,
            ModeArg::TokenSort => MatchMode::TokenSort,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StrategyArg {
    Greedy,
    Components,
}

impl From<StrategyArg> for ClusterStrategy {
    fn from(strategy: StrategyArg) -> Self {
        match strategy {
            StrategyArg::Greedy => ClusterStrategy::GreedySeed,
            StrategyArg::Components => ClusterStrategy::ConnectedComponents,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "orgmatch",
    about = "Duplicate detection and hierarchy validation for organization directories"
)]
struct Cli {
    /// Input CSV with an org_name column and optional org_code/parent_code columns
    input: PathBuf,

    /// Similarity threshold for duplicate candidates, 0-100
    #[arg(long, default_value_t = 90.0)]
    threshold: f64,

    /// Similarity threshold for cluster membership, 0-100
    #[arg(long, default_value_t = 90.0)]
    cluster_threshold: f64,

    /// Scoring mode for duplicate matching
    #[arg(long, value_enum, default_value = "ratio")]
    mode: ModeArg,

    /// Clustering strategy
    #[arg(long, value_enum, default_value = "greedy")]
    strategy: StrategyArg,

    /// Write match candidates to this CSV (stdout when omitted)
    #[arg(long)]
    matches_out: Option<PathBuf>,

    /// Write clusters to this CSV
    #[arg(long)]
    clusters_out: Option<PathBuf>,

    /// Write the resolved hierarchy table to this CSV
    #[arg(long)]
    hierarchy_out: Option<PathBuf>,

    /// Skip hierarchy validation even when the code columns are present
    #[arg(long)]
    skip_hierarchy: bool,
}

#[derive(Debug, Serialize)]
struct RunSummary {
    run_id: String,
    started_at: String,
    records: usize,
    match_candidates: usize,
    clusters: usize,
    dangling_parents: Option<usize>,
    duplicate_codes: Option<usize>,
    cycles: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let cli = Cli::parse();

    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    info!("Starting orgmatch run {}", run_id);

    let mut phase_times: HashMap<&str, Duration> = HashMap::new();

    let phase_start = Instant::now();
    let table = ingest::load_csv(&cli.input)?;
    phase_times.insert("load", phase_start.elapsed());

    let main_pb = ProgressBar::new(3);
    main_pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("█▉▊▋▌▍▎▏  "),
    );

    main_pb.set_message("Matching duplicates...");
    let phase_start = Instant::now();
    let matches = matching::find_matches(&table.records, cli.threshold, cli.mode.into());
    phase_times.insert("matching", phase_start.elapsed());
    info!(
        "{} duplicate candidates at threshold {}",
        matches.len(),
        cli.threshold
    );
    main_pb.inc(1);

    main_pb.set_message("Building clusters...");
    let phase_start = Instant::now();
    let clusters = clustering::build_clusters_with_strategy(
        &table.records,
        cli.cluster_threshold,
        cli.strategy.into(),
    );
    phase_times.insert("clustering", phase_start.elapsed());
    main_pb.inc(1);

    main_pb.set_message("Validating hierarchy...");
    let phase_start = Instant::now();
    let report = if cli.skip_hierarchy {
        info!("hierarchy validation skipped by request");
        None
    } else if !table.has_hierarchy_columns {
        info!("org_code/parent_code columns not present; skipping hierarchy validation");
        None
    } else {
        Some(hierarchy::validate(&table.records))
    };
    phase_times.insert("hierarchy", phase_start.elapsed());
    main_pb.inc(1);
    main_pb.finish_with_message("Analysis complete");

    if let Some(report) = &report {
        log_findings(report, &table.records);
    }

    match &cli.matches_out {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            export::write_matches(file, &table.records, &matches)?;
            info!("wrote {} match candidates to {}", matches.len(), path.display());
        }
        None => {
            export::write_matches(io::stdout().lock(), &table.records, &matches)?;
        }
    }

    if let Some(path) = &cli.clusters_out {
        let file =
            File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
        export::write_clusters(file, &table.records, &clusters)?;
        info!("wrote {} clusters to {}", clusters.len(), path.display());
    }

    if let Some(path) = &cli.hierarchy_out {
        if table.has_hierarchy_columns {
            let rows = hierarchy::hierarchy_rows(&table.records);
            let file = File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            export::write_hierarchy(file, &rows)?;
            info!("wrote hierarchy table to {}", path.display());
        } else {
            warn!("hierarchy output requested but the code columns are not present");
        }
    }

    let summary = RunSummary {
        run_id,
        started_at: started_at.to_rfc3339(),
        records: table.records.len(),
        match_candidates: matches.len(),
        clusters: clusters.len(),
        dangling_parents: report.as_ref().map(|r| r.dangling_parents.len()),
        duplicate_codes: report.as_ref().map(|r| r.duplicate_codes.len()),
        cycles: report.as_ref().map(|r| r.cycles.len()),
    };
    info!(
        "run summary: {}",
        serde_json::to_string(&summary).context("failed to serialize run summary")?
    );
    for (phase, elapsed) in &phase_times {
        info!("phase {}: {:.2?}", phase, elapsed);
    }

    Ok(())
}

fn log_findings(report: &ValidationReport, records: &[orgmatch::models::OrgRecord]) {
    for &index in &report.dangling_parents {
        let record = &records[index];
        warn!(
            "dangling parent: {:?} references unknown code {:?}",
            record.raw_name,
            record.parent().unwrap_or_default()
        );
    }
    for code in &report.duplicate_codes {
        warn!("org_code {:?} is claimed by more than one record", code);
    }
    for cycle in &report.cycles {
        warn!("reference cycle: {}", cycle.join(" -> "));
    }
    if report.is_clean() {
        info!("hierarchy is consistent: no dangling parents, duplicates, or cycles");
    }
}
