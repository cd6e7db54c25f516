//! Integration tests for log routing in the binary.
//!
//! Verifies that `--log-output file` without `--log-file` writes to the default
//! file under the platform state directory, and that the default destination
//! is stderr.

use super::test_utils::write_template_fixture;
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

/// Matches default_log_file in src/logging.rs: ProjectDirs state dir for "pagesmith".
fn expected_log_path(state_home: &Path) -> std::path::PathBuf {
    state_home.join("pagesmith").join("pagesmith.log")
}

fn run_themes(temp_dir: &TempDir, extra: &[&str]) -> Output {
    let workspace = temp_dir.path().join("ws");
    write_template_fixture(&workspace.join("templates"));
    let home = temp_dir.path().join("home");
    fs::create_dir_all(&home).unwrap();

    Command::new(env!("CARGO_BIN_EXE_pagesmith"))
        .env_clear()
        .env("HOME", &home)
        .env("XDG_STATE_HOME", temp_dir.path().join("state"))
        .env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .current_dir(&workspace)
        .arg("--workspace")
        .arg(&workspace)
        .args(extra)
        .arg("themes")
        .output()
        .unwrap()
}

#[test]
fn test_file_output_uses_default_log_path() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_themes(&temp_dir, &["--log-output", "file"]);

    assert!(
        output.status.success(),
        "pagesmith themes should succeed: stderr={:?}",
        String::from_utf8_lossy(&output.stderr)
    );

    let log_path = expected_log_path(&temp_dir.path().join("state"));
    assert!(log_path.exists(), "log file should exist at {}", log_path.display());
    let content = fs::read_to_string(&log_path).unwrap();
    assert!(
        content.contains("Pagesmith starting"),
        "log file should contain a startup message; got: {}",
        content.lines().next().unwrap_or("")
    );
}

#[test]
fn test_default_logging_goes_to_stderr_and_quiet_silences_it() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_themes(&temp_dir, &[]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Pagesmith starting"));

    let quiet_dir = TempDir::new().unwrap();
    let quiet = run_themes(&quiet_dir, &["--quiet"]);
    assert!(quiet.status.success());
    assert!(quiet.stderr.is_empty());
}

#[test]
fn test_json_format_emits_structured_lines() {
    let temp_dir = TempDir::new().unwrap();
    let output = run_themes(&temp_dir, &["--log-format", "json"]);
    assert!(output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    let first = stderr.lines().next().unwrap();
    let line: serde_json::Value = serde_json::from_str(first).unwrap();
    assert!(line.get("timestamp").is_some());
    assert_eq!(line["level"], "INFO");
}
