//! Recursive shapefile discovery.
//!
//! Walks a directory tree and keeps every regular file whose *filename*
//! matches the configured glob. Directories and non-matching files are
//! skipped silently; unreadable entries are collected as issues and the walk
//! continues, so one bad subtree never hides the rest of the data.

use crate::error::{GisloadError, Result};
use globset::{GlobBuilder, GlobMatcher};
use serde::Serialize;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// A file kept by the scan.
///
/// Invariant: `file_name` is always the final segment of `path`.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveredFile {
    pub path: PathBuf,
    pub file_name: String,
}

/// A filesystem entry the walk could not read.
#[derive(Debug, Clone, Serialize)]
pub struct ScanIssue {
    pub path: String,
    pub message: String,
}

/// Everything a scan produced.
#[derive(Debug)]
pub struct ScanOutcome {
    /// Matched files, sorted by path for stable output.
    pub files: Vec<DiscoveredFile>,
    /// Number of directories visited.
    pub dirs_walked: usize,
    /// Entries that could not be read.
    pub issues: Vec<ScanIssue>,
}

/// Filename-glob scanner.
pub struct Scanner {
    matcher: GlobMatcher,
}

impl Scanner {
    /// Compile the filename glob. Case-sensitivity follows the host
    /// filesystem convention: insensitive on Windows, sensitive elsewhere.
    pub fn new(pattern: &str) -> Result<Self> {
        let mut builder = GlobBuilder::new(pattern);
        if cfg!(windows) {
            builder.case_insensitive(true);
        }
        let matcher = builder
            .build()
            .map_err(|e| GisloadError::Pattern(format!("Invalid pattern '{pattern}': {e}")))?
            .compile_matcher();
        Ok(Self { matcher })
    }

    /// Walk `root` and collect matching files. Symlinks are not followed.
    pub fn scan(&self, root: &Path) -> Result<ScanOutcome> {
        if !root.is_dir() {
            return Err(GisloadError::Config(format!(
                "Scan root is not a directory: {}",
                root.display()
            )));
        }

        let mut files = Vec::new();
        let mut issues = Vec::new();
        let mut dirs_walked = 0;

        for entry in WalkDir::new(root).follow_links(false) {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let path = err
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| root.display().to_string());
                    issues.push(ScanIssue {
                        path,
                        message: err.to_string(),
                    });
                    continue;
                }
            };

            if entry.file_type().is_dir() {
                dirs_walked += 1;
                continue;
            }
            if !entry.file_type().is_file() {
                continue;
            }

            let file_name = entry.file_name().to_string_lossy().to_string();
            if !self.matcher.is_match(&file_name) {
                continue;
            }

            files.push(DiscoveredFile {
                path: entry.into_path(),
                file_name,
            });
        }

        files.sort_by(|a, b| a.path.cmp(&b.path));

        tracing::debug!(
            files = files.len(),
            dirs = dirs_walked,
            issues = issues.len(),
            "scan finished"
        );

        Ok(ScanOutcome {
            files,
            dirs_walked,
            issues,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn scan_keeps_only_matching_files() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("a/OT_BUIT_P.shp"));
        touch(&root.join("a/b/dzialki.shp"));
        touch(&root.join("a/notes.txt"));

        let outcome = Scanner::new("*.shp").unwrap().scan(root).unwrap();

        let names: Vec<&str> = outcome
            .files
            .iter()
            .map(|f| f.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["OT_BUIT_P.shp", "dzialki.shp"]);
        assert!(outcome.issues.is_empty());
    }

    #[test]
    fn file_name_is_final_path_segment() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("deep/nested/budynki.shp"));

        let outcome = Scanner::new("*.shp").unwrap().scan(root).unwrap();
        assert_eq!(outcome.files.len(), 1);
        let file = &outcome.files[0];
        assert_eq!(
            file.path.file_name().unwrap().to_string_lossy(),
            file.file_name
        );
    }

    #[test]
    fn results_are_sorted_by_path() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("z/one.shp"));
        touch(&root.join("a/two.shp"));
        touch(&root.join("m/three.shp"));

        let outcome = Scanner::new("*.shp").unwrap().scan(root).unwrap();
        let paths: Vec<_> = outcome.files.iter().map(|f| f.path.clone()).collect();
        let mut sorted = paths.clone();
        sorted.sort();
        assert_eq!(paths, sorted);
    }

    #[cfg(unix)]
    #[test]
    fn matching_is_case_sensitive_on_unix() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("UPPER.SHP"));
        touch(&root.join("lower.shp"));

        let outcome = Scanner::new("*.shp").unwrap().scan(root).unwrap();
        let names: Vec<&str> = outcome
            .files
            .iter()
            .map(|f| f.file_name.as_str())
            .collect();
        assert_eq!(names, vec!["lower.shp"]);
    }

    #[test]
    fn scan_root_must_be_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("plain.txt");
        fs::write(&file, b"").unwrap();

        let scanner = Scanner::new("*.shp").unwrap();
        assert!(scanner.scan(&file).is_err());
        assert!(scanner.scan(&dir.path().join("missing")).is_err());
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(Scanner::new("[").is_err());
    }
}
