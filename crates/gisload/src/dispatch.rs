//! Sequential execution of load jobs through the external toolchain.
//!
//! Each job spawns `shp2pgsql` with its stdout wired straight into a `psql`
//! child, waits for both, and records the pair of exit statuses. One pipeline
//! runs at a time; a failed load never stops the remaining jobs. The only
//! fatal conditions are a missing tool binary (every job would fail the same
//! way) and the `abort` policy for unrecognized files.

use crate::config::{LoadConfig, UnrecognizedPolicy};
use crate::error::{GisloadError, Result};
use crate::plan::{LoadJob, LoadPlan};
use std::io;
use std::process::{Command, Stdio};
use tracing::{error, info, warn};

/// What happened to a single job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Both children exited zero.
    Loaded,
    /// No schema mapping and no fallback; not attempted.
    SkippedUnrecognized,
    /// `shp2pgsql` exited non-zero (or was killed by a signal).
    ConverterFailed { code: Option<i32> },
    /// `psql` exited non-zero; carries the tail of its stderr.
    ClientFailed {
        code: Option<i32>,
        stderr_tail: String,
    },
    /// A child could not be started (other than a missing binary, which is
    /// fatal for the whole run).
    SpawnFailed { message: String },
}

impl Outcome {
    pub fn is_failure(&self) -> bool {
        !matches!(self, Outcome::Loaded | Outcome::SkippedUnrecognized)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Outcome::Loaded => "loaded",
            Outcome::SkippedUnrecognized => "skipped (unrecognized)",
            Outcome::ConverterFailed { .. } => "converter failed",
            Outcome::ClientFailed { .. } => "client failed",
            Outcome::SpawnFailed { .. } => "spawn failed",
        }
    }
}

/// Per-job record in the final report.
#[derive(Debug)]
pub struct JobOutcome {
    pub file_name: String,
    pub source: std::path::PathBuf,
    /// `schema.table`, when a schema was resolved.
    pub target: Option<String>,
    pub outcome: Outcome,
}

/// Accumulated results of a dispatch run.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub outcomes: Vec<JobOutcome>,
}

impl DispatchReport {
    pub fn loaded(&self) -> usize {
        self.count(|o| matches!(o, Outcome::Loaded))
    }

    pub fn skipped(&self) -> usize {
        self.count(|o| matches!(o, Outcome::SkippedUnrecognized))
    }

    pub fn failed(&self) -> usize {
        self.count(|o| o.is_failure())
    }

    /// True when no job failed. Skipped files do not make a run dirty.
    pub fn is_clean(&self) -> bool {
        self.failed() == 0
    }

    fn count(&self, pred: impl Fn(&Outcome) -> bool) -> usize {
        self.outcomes.iter().filter(|j| pred(&j.outcome)).count()
    }

    fn push(&mut self, job: &LoadJob, target: Option<String>, outcome: Outcome) {
        self.outcomes.push(JobOutcome {
            file_name: job.file_name.clone(),
            source: job.source.clone(),
            target,
            outcome,
        });
    }
}

/// Sequential load dispatcher.
pub struct Dispatcher<'a> {
    config: &'a LoadConfig,
}

impl<'a> Dispatcher<'a> {
    pub fn new(config: &'a LoadConfig) -> Self {
        Self { config }
    }

    /// Run every job in the plan, in order, one pipeline at a time.
    pub fn run(&self, plan: &LoadPlan) -> Result<DispatchReport> {
        let mut report = DispatchReport::default();

        for job in &plan.jobs {
            let schema = match job.schema_or(self.config.fallback_schema.as_deref()) {
                Some(schema) => schema.to_string(),
                None => match self.config.on_unrecognized {
                    UnrecognizedPolicy::Skip => {
                        warn!(
                            file = %job.file_name,
                            path = %job.source.display(),
                            "no schema mapping, skipping"
                        );
                        report.push(job, None, Outcome::SkippedUnrecognized);
                        continue;
                    }
                    UnrecognizedPolicy::Abort => {
                        return Err(GisloadError::Aborted(format!(
                            "no schema mapping for {}",
                            job.source.display()
                        )));
                    }
                },
            };

            if job.classification.is_unrecognized() {
                warn!(
                    file = %job.file_name,
                    schema = %schema,
                    "no schema mapping, loading into fallback schema"
                );
            }
            if let Some(sidecar) = job.missing_sidecar() {
                warn!(
                    file = %job.file_name,
                    sidecar = %sidecar.display(),
                    "attribute sidecar missing, attributes may be lost"
                );
            }

            let target = format!("{schema}.{}", job.table);
            info!(
                file = %job.file_name,
                target = %target,
                "loading"
            );

            let outcome = self.run_pipeline(job, &target)?;
            match &outcome {
                Outcome::Loaded => info!(file = %job.file_name, target = %target, "loaded"),
                Outcome::ConverterFailed { code } => {
                    error!(file = %job.file_name, code = ?code, "shp2pgsql failed");
                }
                Outcome::ClientFailed { code, stderr_tail } => {
                    error!(
                        file = %job.file_name,
                        code = ?code,
                        stderr = %stderr_tail,
                        "psql failed"
                    );
                }
                Outcome::SpawnFailed { message } => {
                    error!(file = %job.file_name, message = %message, "spawn failed");
                }
                Outcome::SkippedUnrecognized => {}
            }
            report.push(job, Some(target), outcome);
        }

        Ok(report)
    }

    /// Spawn `shp2pgsql | psql` for one job and wait for both children.
    fn run_pipeline(&self, job: &LoadJob, target: &str) -> Result<Outcome> {
        let tools = &self.config.tools;
        let db = &self.config.database;

        let mut converter = match Command::new(&tools.shp2pgsql)
            .arg("-I")
            .arg("-s")
            .arg(job.srid.to_string())
            .arg(&job.source)
            .arg(target)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
        {
            Ok(child) => child,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                return Err(tool_not_found(&tools.shp2pgsql, "tools.shp2pgsql"));
            }
            Err(e) => {
                return Ok(Outcome::SpawnFailed {
                    message: format!("{}: {e}", tools.shp2pgsql),
                })
            }
        };

        let sql = converter.stdout.take().ok_or_else(|| GisloadError::Spawn {
            tool: tools.shp2pgsql.clone(),
            message: "missing stdout handle".to_string(),
        })?;

        let mut client_cmd = Command::new(&tools.psql);
        client_cmd.arg("-U").arg(&db.user);
        if let Some(host) = &db.host {
            client_cmd.arg("-h").arg(host);
        }
        if let Some(port) = db.port {
            client_cmd.arg("-p").arg(port.to_string());
        }
        client_cmd.arg("-d").arg(&db.dbname);

        let client = match client_cmd
            .stdin(Stdio::from(sql))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
        {
            Ok(child) => child,
            Err(e) => {
                let missing = e.kind() == io::ErrorKind::NotFound;
                let _ = converter.kill();
                let _ = converter.wait();
                if missing {
                    return Err(tool_not_found(&tools.psql, "tools.psql"));
                }
                return Ok(Outcome::SpawnFailed {
                    message: format!("{}: {e}", tools.psql),
                });
            }
        };

        let converter_status = converter.wait()?;
        let client_out = client.wait_with_output()?;

        if !converter_status.success() {
            return Ok(Outcome::ConverterFailed {
                code: converter_status.code(),
            });
        }
        if !client_out.status.success() {
            return Ok(Outcome::ClientFailed {
                code: client_out.status.code(),
                stderr_tail: stderr_tail(&client_out.stderr),
            });
        }
        Ok(Outcome::Loaded)
    }
}

fn tool_not_found(tool: &str, config_key: &str) -> GisloadError {
    GisloadError::ToolNotFound {
        tool: tool.to_string(),
        hint: format!(
            "Install the PostGIS client tools or point {config_key} at the binary."
        ),
    }
}

/// Last few stderr lines, for the per-file failure report.
fn stderr_tail(bytes: &[u8]) -> String {
    const TAIL_LINES: usize = 5;
    let text = String::from_utf8_lossy(bytes);
    let lines: Vec<&str> = text.lines().filter(|l| !l.trim().is_empty()).collect();
    let start = lines.len().saturating_sub(TAIL_LINES);
    lines[start..].join("\n")
}
