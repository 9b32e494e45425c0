//! CLI integration tests for the read-only commands (`scan`, `rules`,
//! `load --dry-run`). None of these touch the external toolchain.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

fn gisload_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_gisload"))
}

fn run_cli(args: &[&str], home: &Path) -> Output {
    Command::new(gisload_bin())
        .args(args)
        .env("GISLOAD_HOME", home)
        .output()
        .expect("failed to execute gisload")
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, b"").unwrap();
}

#[derive(Debug, Deserialize)]
struct ScanReport {
    root: PathBuf,
    files: Vec<ScanRow>,
    unrecognized: usize,
    dirs_walked: usize,
    issues: Vec<ScanIssue>,
}

#[derive(Debug, Deserialize)]
struct ScanRow {
    path: String,
    file_name: String,
    schema: Option<String>,
    table: String,
}

#[derive(Debug, Deserialize)]
#[allow(dead_code)]
struct ScanIssue {
    path: String,
    message: String,
}

fn scan_json(data: &Path, home: &Path) -> ScanReport {
    let output = run_cli(&["scan", data.to_str().unwrap(), "--json"], home);
    assert!(
        output.status.success(),
        "scan failed\nstdout:\n{}\nstderr:\n{}",
        String::from_utf8_lossy(&output.stdout),
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("scan --json did not emit valid JSON")
}

#[test]
fn scan_finds_only_matching_files() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    touch(&data.join("a/OT_BUIT_P.shp"));
    touch(&data.join("a/b/dzialki.shp"));
    touch(&data.join("a/notes.txt"));

    let report = scan_json(&data, dir.path());

    assert_eq!(report.root, data);
    assert!(report.dirs_walked >= 3);
    assert!(report.issues.is_empty());
    assert_eq!(report.unrecognized, 0);

    let names: Vec<&str> = report.files.iter().map(|f| f.file_name.as_str()).collect();
    assert_eq!(names, vec!["OT_BUIT_P.shp", "dzialki.shp"]);

    let poles = &report.files[0];
    assert_eq!(poles.schema.as_deref(), Some("utility_poles"));
    assert_eq!(poles.table, "OT_BUIT_P");
    assert_eq!(poles.path, "a/OT_BUIT_P.shp");

    let parcels = &report.files[1];
    assert_eq!(parcels.schema.as_deref(), Some("parcels"));
    assert_eq!(parcels.table, "dzialki");
}

#[test]
fn scan_reports_unrecognized_files() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    touch(&data.join("unknown_layer.shp"));

    let report = scan_json(&data, dir.path());
    assert_eq!(report.files.len(), 1);
    assert_eq!(report.unrecognized, 1);
    assert_eq!(report.files[0].schema, None);
    assert_eq!(report.files[0].table, "unknown_layer");
}

#[test]
fn scan_quiet_lists_relative_paths() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    touch(&data.join("x/budynki.shp"));

    let output = run_cli(&["scan", data.to_str().unwrap(), "--quiet"], dir.path());
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.trim(), "x/budynki.shp");
}

#[test]
fn scan_missing_root_is_a_helpful_error() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("no_such_dir");

    let output = run_cli(&["scan", missing.to_str().unwrap()], dir.path());
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Path not found"), "stderr:\n{stderr}");
}

#[test]
fn dry_run_renders_the_legacy_pipeline() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    let shp = data.join("budynki.shp");
    touch(&shp);

    let output = run_cli(
        &["load", data.to_str().unwrap(), "--dry-run"],
        dir.path(),
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(
        stdout.trim(),
        format!(
            "shp2pgsql -I -s 2180 {} buildings.budynki | psql -U postgres -d oze",
            shp.display()
        )
    );
}

#[test]
fn dry_run_marks_unrecognized_files_as_skipped() {
    let dir = TempDir::new().unwrap();
    let data = dir.path().join("data");
    touch(&data.join("unknown_layer.shp"));

    let output = run_cli(
        &["load", data.to_str().unwrap(), "--dry-run"],
        dir.path(),
    );
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(
        stdout.contains("# skip (unrecognized):"),
        "stdout:\n{stdout}"
    );
}

#[test]
fn rules_json_lists_the_builtin_table() {
    #[derive(Debug, Deserialize)]
    struct Rule {
        file_name: String,
        schema: String,
    }

    let dir = TempDir::new().unwrap();
    let output = run_cli(&["rules", "--json"], dir.path());
    assert!(output.status.success());
    let rules: Vec<Rule> = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(rules.len(), 11);
    assert!(rules
        .iter()
        .any(|r| r.file_name == "budynki.shp" && r.schema == "buildings"));
    assert!(rules
        .iter()
        .any(|r| r.file_name == "OT_TCRZ_A.shp" && r.schema == "protected_areas"));
}
