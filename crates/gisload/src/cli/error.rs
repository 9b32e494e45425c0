//! Helpful error types for CLI commands.
//!
//! Every error carries what went wrong, context, and concrete suggestions.

use std::fmt;
use std::path::Path;

/// An error with context and fix suggestions.
#[derive(Debug)]
pub struct HelpfulError {
    pub message: String,
    pub context: Option<String>,
    pub suggestions: Vec<String>,
}

impl HelpfulError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            context: None,
            suggestions: Vec::new(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_suggestions(
        mut self,
        suggestions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.suggestions
            .extend(suggestions.into_iter().map(|s| s.into()));
        self
    }

    // === Common error constructors ===

    /// Scan root does not exist.
    pub fn path_not_found(path: &Path) -> Self {
        Self::new(format!("Path not found: {}", path.display()))
            .with_context("The scan root does not exist on the filesystem")
            .with_suggestions([
                format!("TRY: Check that the path exists: ls -la {}", path.display()),
                "TRY: Set `root` in the config file or pass the directory as an argument"
                    .to_string(),
            ])
    }

    /// Scan root exists but is not a directory.
    pub fn not_a_directory(path: &Path) -> Self {
        Self::new(format!("Not a directory: {}", path.display()))
            .with_context("gisload scans a directory tree, not a single file")
            .with_suggestions([format!(
                "TRY: Scan the containing directory: gisload scan {}",
                path.parent()
                    .map(|p| p.display().to_string())
                    .unwrap_or_else(|| ".".to_string())
            )])
    }

    /// Explicit --config path does not exist.
    pub fn config_not_found(path: &Path) -> Self {
        Self::new(format!("Config file not found: {}", path.display()))
            .with_context("--config was given but the file does not exist")
            .with_suggestions([
                format!("TRY: Check the path: ls -la {}", path.display()),
                "TRY: Omit --config to run with built-in defaults".to_string(),
            ])
    }
}

impl fmt::Display for HelpfulError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.message)?;
        if let Some(context) = &self.context {
            writeln!(f)?;
            writeln!(f, "{context}")?;
        }
        if !self.suggestions.is_empty() {
            writeln!(f)?;
            for suggestion in &self.suggestions {
                writeln!(f, "  {suggestion}")?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for HelpfulError {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn display_includes_context_and_suggestions() {
        let err = HelpfulError::path_not_found(&PathBuf::from("/no/such/dir"));
        let text = err.to_string();
        assert!(text.contains("Path not found: /no/such/dir"));
        assert!(text.contains("TRY:"));
    }
}
