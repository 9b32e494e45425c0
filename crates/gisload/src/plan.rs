//! Load planning: derive the destination target for each discovered file.
//!
//! Planning is pure. Nothing here touches the filesystem beyond an optional
//! sidecar existence check, and nothing spawns a process; execution lives in
//! [`crate::dispatch`].

use crate::classify::{Classification, ClassifyTable};
use crate::config::LoadConfig;
use crate::scan::ScanOutcome;
use std::path::PathBuf;

/// Derive the destination table name from a base filename by stripping
/// exactly the last four characters. This matches the original workflow:
/// it is only correct for names that truly end in a 4-character extension
/// such as `.shp`, which the scan pattern guarantees in practice. Names of
/// four characters or fewer yield an empty string.
pub fn table_name(file_name: &str) -> String {
    let cut = file_name
        .char_indices()
        .rev()
        .nth(3)
        .map(|(idx, _)| idx)
        .unwrap_or(0);
    file_name[..cut].to_string()
}

/// One planned load: a source shapefile and its destination.
#[derive(Debug, Clone)]
pub struct LoadJob {
    pub source: PathBuf,
    pub file_name: String,
    pub classification: Classification,
    pub table: String,
    pub srid: u32,
}

impl LoadJob {
    /// Destination schema: the classified one, or the caller's fallback for
    /// unrecognized files.
    pub fn schema_or<'a>(&'a self, fallback: Option<&'a str>) -> Option<&'a str> {
        self.classification.as_schema().or(fallback)
    }

    /// Render the equivalent shell pipeline for logs and dry runs. Display
    /// only: execution always goes through argument-vector spawns, never a
    /// shell.
    pub fn render_pipeline(&self, schema: &str, config: &LoadConfig) -> String {
        let mut client = format!("{} -U {}", config.tools.psql, config.database.user);
        if let Some(host) = &config.database.host {
            client.push_str(&format!(" -h {host}"));
        }
        if let Some(port) = config.database.port {
            client.push_str(&format!(" -p {port}"));
        }
        format!(
            "{} -I -s {} {} {}.{} | {} -d {}",
            config.tools.shp2pgsql,
            self.srid,
            self.source.display(),
            schema,
            self.table,
            client,
            config.database.dbname,
        )
    }

    /// The `.dbf` sidecar the converter needs for attribute data, when it is
    /// missing next to the `.shp`.
    pub fn missing_sidecar(&self) -> Option<PathBuf> {
        let dbf = self.source.with_extension("dbf");
        if dbf.exists() {
            None
        } else {
            Some(dbf)
        }
    }
}

/// Ordered list of planned loads.
#[derive(Debug)]
pub struct LoadPlan {
    pub jobs: Vec<LoadJob>,
}

impl LoadPlan {
    /// Plan every scanned file: classify it and derive its table name.
    /// Unrecognized files stay in the plan carrying the sentinel so they are
    /// visible in scan output and dry runs; the dispatcher applies policy.
    pub fn build(scan: &ScanOutcome, rules: &ClassifyTable, srid: u32) -> Self {
        let jobs = scan
            .files
            .iter()
            .map(|file| LoadJob {
                source: file.path.clone(),
                file_name: file.file_name.clone(),
                classification: rules.classify(&file.file_name),
                table: table_name(&file.file_name),
                srid,
            })
            .collect();
        Self { jobs }
    }

    pub fn unrecognized(&self) -> usize {
        self.jobs
            .iter()
            .filter(|job| job.classification.is_unrecognized())
            .count()
    }

    pub fn is_empty(&self) -> bool {
        self.jobs.is_empty()
    }
}
