//! Error types for the gisload library.

use std::io;
use thiserror::Error;

/// Library error type. CLI commands wrap this in `anyhow` at the boundary.
#[derive(Error, Debug)]
pub enum GisloadError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Pattern error: {0}")]
    Pattern(String),

    #[error("'{tool}' not found. {hint}")]
    ToolNotFound { tool: String, hint: String },

    #[error("Failed to spawn {tool}: {message}")]
    Spawn { tool: String, message: String },

    #[error("Run aborted: {0}")]
    Aborted(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GisloadError>;
