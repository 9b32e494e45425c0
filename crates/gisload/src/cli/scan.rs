//! Scan command - discover shapefiles and show their classification.
//!
//! Read-only: nothing is spawned and the database is never touched.

use crate::cli::output::{display_relative, print_table};
use gisload::{ClassifyTable, LoadConfig, LoadPlan, ScanIssue, Scanner};
use serde::Serialize;
use std::path::PathBuf;

/// Arguments for the scan command.
#[derive(Debug)]
pub struct ScanArgs {
    pub path: Option<PathBuf>,
    pub json: bool,
    pub quiet: bool,
}

/// One row of scan output.
#[derive(Debug, Serialize)]
pub struct ScanRow {
    pub path: String,
    pub file_name: String,
    pub schema: Option<String>,
    pub table: String,
}

/// Complete scan report, also the JSON payload.
#[derive(Debug, Serialize)]
pub struct ScanReport {
    pub root: PathBuf,
    pub files: Vec<ScanRow>,
    pub unrecognized: usize,
    pub dirs_walked: usize,
    pub issues: Vec<ScanIssue>,
}

/// Execute the scan command.
pub fn run(args: ScanArgs, mut config: LoadConfig) -> anyhow::Result<()> {
    if let Some(path) = args.path {
        config.root = path;
    }
    crate::cli::check_root(&config.root)?;

    let outcome = Scanner::new(&config.pattern)?.scan(&config.root)?;
    let rules = ClassifyTable::from_rules(config.rules.clone());
    let plan = LoadPlan::build(&outcome, &rules, config.srid);

    let report = ScanReport {
        files: plan
            .jobs
            .iter()
            .map(|job| ScanRow {
                path: display_relative(&job.source, &config.root),
                file_name: job.file_name.clone(),
                schema: job.classification.as_schema().map(str::to_string),
                table: job.table.clone(),
            })
            .collect(),
        unrecognized: plan.unrecognized(),
        dirs_walked: outcome.dirs_walked,
        issues: outcome.issues,
        root: config.root,
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if args.quiet {
        for row in &report.files {
            println!("{}", row.path);
        }
    } else {
        output_table(&report);
    }

    Ok(())
}

fn output_table(report: &ScanReport) {
    if report.files.is_empty() {
        println!("No shapefiles found under {}", report.root.display());
        return;
    }

    println!(
        "Found {} shapefile{} under {} ({} unrecognized)",
        report.files.len(),
        if report.files.len() == 1 { "" } else { "s" },
        report.root.display(),
        report.unrecognized,
    );
    println!();

    let rows = report
        .files
        .iter()
        .map(|row| {
            vec![
                row.path.clone(),
                row.schema
                    .clone()
                    .unwrap_or_else(|| "(unrecognized)".to_string()),
                row.schema
                    .as_ref()
                    .map(|schema| format!("{schema}.{}", row.table))
                    .unwrap_or_else(|| "-".to_string()),
            ]
        })
        .collect();
    print_table(&["File", "Schema", "Target"], rows);

    for issue in &report.issues {
        eprintln!("warning: could not read {}: {}", issue.path, issue.message);
    }
}
