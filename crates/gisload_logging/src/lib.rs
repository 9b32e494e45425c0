//! Shared logging setup for the gisload binary.
//!
//! Every run logs to a size-capped file under the gisload home directory so
//! batch runs driven from cron leave a trail. The stderr layer stays quiet
//! (warnings only) unless `--verbose` or `RUST_LOG` widens it.

use anyhow::{Context, Result};
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const DEFAULT_LOG_FILTER: &str = "gisload=info";
const CONSOLE_LOG_FILTER: &str = "gisload=warn";
const MAX_LOG_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Logging configuration for the gisload binary.
pub struct LogConfig<'a> {
    pub app_name: &'a str,
    pub verbose: bool,
}

/// Initialize tracing with a capped file writer and a stderr layer.
pub fn init_logging(config: LogConfig<'_>) -> Result<()> {
    let log_dir = ensure_logs_dir().context("Failed to ensure log directory")?;
    let file_writer = SharedLogFile::open(log_dir, config.app_name)
        .context("Failed to open log file")?;

    let file_filter = env_filter_or(DEFAULT_LOG_FILTER);
    let console_filter = if config.verbose {
        env_filter_or(DEFAULT_LOG_FILTER)
    } else {
        env_filter_or(CONSOLE_LOG_FILTER)
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(file_writer)
                .with_ansi(false)
                .with_filter(file_filter),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .without_time()
                .with_target(false)
                .with_filter(console_filter),
        )
        .init();

    Ok(())
}

fn env_filter_or(default: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
}

/// Get the gisload home directory: ~/.gisload
pub fn gisload_home() -> PathBuf {
    if let Ok(override_path) = std::env::var("GISLOAD_HOME") {
        return PathBuf::from(override_path);
    }
    dirs::home_dir()
        .expect("Could not determine home directory")
        .join(".gisload")
}

/// Get the logs directory: ~/.gisload/logs
pub fn logs_dir() -> PathBuf {
    gisload_home().join("logs")
}

/// Ensure the logs directory exists.
pub fn ensure_logs_dir() -> Result<PathBuf> {
    let logs = logs_dir();
    fs::create_dir_all(&logs)
        .with_context(|| format!("Failed to create logs directory: {}", logs.display()))?;
    Ok(logs)
}

/// Append-only log file capped at `MAX_LOG_FILE_SIZE`. When the cap is hit
/// the current file is renamed to `<name>.log.old` (replacing any previous
/// spill) and a fresh file is started.
struct CappedLogFile {
    path: PathBuf,
    spill_path: PathBuf,
    file: File,
    size: u64,
}

impl CappedLogFile {
    fn open(dir: PathBuf, base_name: &str) -> io::Result<Self> {
        fs::create_dir_all(&dir)?;
        let name = sanitize_name(base_name);
        let path = dir.join(format!("{name}.log"));
        let spill_path = dir.join(format!("{name}.log.old"));
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        let size = file.metadata()?.len();
        let mut capped = Self {
            path,
            spill_path,
            file,
            size,
        };
        if capped.size > MAX_LOG_FILE_SIZE {
            capped.roll()?;
        }
        Ok(capped)
    }

    fn roll(&mut self) -> io::Result<()> {
        let _ = self.file.flush();
        fs::rename(&self.path, &self.spill_path)?;
        self.file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        self.size = 0;
        Ok(())
    }
}

impl Write for CappedLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if self.size + buf.len() as u64 > MAX_LOG_FILE_SIZE {
            self.roll()?;
        }
        let written = self.file.write(buf)?;
        self.size += written as u64;
        Ok(written)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.file.flush()
    }
}

/// Clonable handle over the capped log file, usable as a tracing writer.
#[derive(Clone)]
struct SharedLogFile {
    inner: Arc<Mutex<CappedLogFile>>,
}

impl SharedLogFile {
    fn open(dir: PathBuf, base_name: &str) -> Result<Self> {
        let file = CappedLogFile::open(dir, base_name)
            .with_context(|| format!("Failed to open log file for {base_name}"))?;
        Ok(Self {
            inner: Arc::new(Mutex::new(file)),
        })
    }
}

impl Write for SharedLogFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        let mut guard = self
            .inner
            .lock()
            .map_err(|_| io::Error::new(io::ErrorKind::Other, "log writer lock poisoned"))?;
        guard.flush()
    }
}

impl<'a> tracing_subscriber::fmt::MakeWriter<'a> for SharedLogFile {
    type Writer = SharedLogFile;

    fn make_writer(&'a self) -> Self::Writer {
        self.clone()
    }
}

fn sanitize_name(name: &str) -> String {
    name.chars()
        .map(|ch| {
            if ch.is_ascii_alphanumeric() || ch == '-' || ch == '_' {
                ch
            } else {
                '_'
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_replaces_path_separators() {
        assert_eq!(sanitize_name("gisload"), "gisload");
        assert_eq!(sanitize_name("gis/load"), "gis_load");
    }

    #[test]
    fn capped_file_rolls_over() {
        let dir = tempfile::tempdir().unwrap();
        let mut file = CappedLogFile::open(dir.path().to_path_buf(), "roll").unwrap();
        let line = vec![b'x'; 1024];
        let mut written = 0u64;
        while written <= MAX_LOG_FILE_SIZE {
            file.write_all(&line).unwrap();
            written += line.len() as u64;
        }
        assert!(dir.path().join("roll.log.old").exists());
        assert!(file.size < MAX_LOG_FILE_SIZE);
    }
}
