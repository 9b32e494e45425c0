//! Configuration for gisload.
//!
//! Everything the original workflow hardcoded (scan root, filename pattern,
//! SRID, database coordinates, tool binaries) is injected here. Values come
//! from a TOML file with field-level defaults; CLI flags override on top.

use crate::classify::ClassifyRule;
use crate::error::{GisloadError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Main configuration for a load run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadConfig {
    /// Directory tree to scan.
    #[serde(default = "default_root")]
    pub root: PathBuf,

    /// Filename glob for shapefile discovery.
    #[serde(default = "default_pattern")]
    pub pattern: String,

    /// Source SRID handed to the converter (`shp2pgsql -s`).
    #[serde(default = "default_srid")]
    pub srid: u32,

    /// What to do with files the classification table does not know.
    #[serde(default)]
    pub on_unrecognized: UnrecognizedPolicy,

    /// When set, unrecognized files load into this schema instead of
    /// following `on_unrecognized`.
    #[serde(default)]
    pub fallback_schema: Option<String>,

    /// Target database coordinates.
    #[serde(default)]
    pub database: DatabaseConfig,

    /// External tool binaries.
    #[serde(default)]
    pub tools: ToolsConfig,

    /// Classification rules; empty means the built-in table.
    #[serde(default)]
    pub rules: Vec<ClassifyRule>,
}

/// Connection coordinates for the target PostGIS database, passed through
/// to `psql`. Host and port are optional: when absent the client falls back
/// to its libpq defaults (local socket).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_user")]
    pub user: String,

    #[serde(default = "default_db_name")]
    pub dbname: String,

    #[serde(default)]
    pub host: Option<String>,

    #[serde(default)]
    pub port: Option<u16>,
}

/// Names (or absolute paths) of the external binaries.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default = "default_shp2pgsql")]
    pub shp2pgsql: String,

    #[serde(default = "default_psql")]
    pub psql: String,
}

/// Policy for files without a schema mapping.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnrecognizedPolicy {
    /// Warn and move on to the next file.
    #[default]
    Skip,
    /// Stop the whole run.
    Abort,
}

fn default_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_pattern() -> String {
    "*.shp".to_string()
}

fn default_srid() -> u32 {
    2180
}

fn default_db_user() -> String {
    "postgres".to_string()
}

fn default_db_name() -> String {
    "oze".to_string()
}

fn default_shp2pgsql() -> String {
    "shp2pgsql".to_string()
}

fn default_psql() -> String {
    "psql".to_string()
}

impl Default for LoadConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            pattern: default_pattern(),
            srid: default_srid(),
            database: DatabaseConfig::default(),
            tools: ToolsConfig::default(),
            rules: Vec::new(),
            on_unrecognized: UnrecognizedPolicy::default(),
            fallback_schema: None,
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            user: default_db_user(),
            dbname: default_db_name(),
            host: None,
            port: None,
        }
    }
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            shp2pgsql: default_shp2pgsql(),
            psql: default_psql(),
        }
    }
}

impl LoadConfig {
    /// Load configuration from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: LoadConfig = toml::from_str(&content).map_err(|e| {
            GisloadError::Config(format!("Failed to parse {}: {e}", path.display()))
        })?;
        Ok(config)
    }

    /// Save configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| GisloadError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Default config file location: ~/.gisload/config.toml
    pub fn default_path() -> PathBuf {
        gisload_logging::gisload_home().join("config.toml")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = LoadConfig::default();
        assert_eq!(config.pattern, "*.shp");
        assert_eq!(config.srid, 2180);
        assert_eq!(config.database.user, "postgres");
        assert_eq!(config.database.dbname, "oze");
        assert_eq!(config.database.host, None);
        assert_eq!(config.tools.shp2pgsql, "shp2pgsql");
        assert_eq!(config.tools.psql, "psql");
        assert_eq!(config.on_unrecognized, UnrecognizedPolicy::Skip);
        assert!(config.rules.is_empty());
        assert!(config.fallback_schema.is_none());
    }

    #[test]
    fn partial_toml_fills_in_defaults() {
        let config: LoadConfig = toml::from_str(
            r#"
            root = "/data/oze"

            [database]
            dbname = "siting"
            "#,
        )
        .unwrap();
        assert_eq!(config.root, PathBuf::from("/data/oze"));
        assert_eq!(config.database.dbname, "siting");
        assert_eq!(config.database.user, "postgres");
        assert_eq!(config.srid, 2180);
    }

    #[test]
    fn config_round_trips_through_toml() {
        let config = LoadConfig {
            root: PathBuf::from("/data"),
            srid: 4326,
            rules: vec![ClassifyRule {
                file_name: "lakes.shp".to_string(),
                schema: "hydrology".to_string(),
            }],
            fallback_schema: Some("staging".to_string()),
            on_unrecognized: UnrecognizedPolicy::Abort,
            ..LoadConfig::default()
        };

        let toml_str = toml::to_string_pretty(&config).unwrap();
        let parsed: LoadConfig = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed.root, config.root);
        assert_eq!(parsed.srid, 4326);
        assert_eq!(parsed.rules, config.rules);
        assert_eq!(parsed.fallback_schema, config.fallback_schema);
        assert_eq!(parsed.on_unrecognized, UnrecognizedPolicy::Abort);
    }

    #[test]
    fn save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = LoadConfig {
            root: PathBuf::from("/data/shapes"),
            ..LoadConfig::default()
        };
        config.save(&path).unwrap();
        let loaded = LoadConfig::load(&path).unwrap();
        assert_eq!(loaded.root, config.root);
        assert_eq!(loaded.srid, config.srid);
    }
}
