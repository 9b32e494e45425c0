//! Command-line interface for gisload.
//!
//! `scan` and `rules` are read-only; only `load` spawns the external
//! toolchain, and `load --dry-run` demotes even that to printing.

pub mod error;
pub mod load;
pub mod output;
pub mod rules;
pub mod scan;

pub use error::HelpfulError;

use gisload::LoadConfig;
use std::path::Path;

/// Resolve the effective configuration: an explicit `--config` path must
/// exist; otherwise the default config file is used when present, built-in
/// defaults when not.
pub fn resolve_config(explicit: Option<&Path>) -> anyhow::Result<LoadConfig> {
    match explicit {
        Some(path) => {
            if !path.exists() {
                return Err(HelpfulError::config_not_found(path).into());
            }
            Ok(LoadConfig::load(path)?)
        }
        None => {
            let default = LoadConfig::default_path();
            if default.exists() {
                Ok(LoadConfig::load(&default)?)
            } else {
                Ok(LoadConfig::default())
            }
        }
    }
}

/// Shared root validation for scan/load.
pub(crate) fn check_root(root: &Path) -> anyhow::Result<()> {
    if !root.exists() {
        return Err(HelpfulError::path_not_found(root).into());
    }
    if !root.is_dir() {
        return Err(HelpfulError::not_a_directory(root).into());
    }
    Ok(())
}
