//! Integration tests for the pagesmith binary's commands and exit behavior.

use super::test_utils::write_template_fixture;
use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};
use tempfile::TempDir;

fn workspace(temp_dir: &TempDir) -> PathBuf {
    let workspace = temp_dir.path().join("ws");
    write_template_fixture(&workspace.join("templates"));
    workspace
}

fn pagesmith(temp_dir: &TempDir, workspace: &PathBuf, args: &[&str]) -> Output {
    let home = temp_dir.path().join("home");
    fs::create_dir_all(&home).unwrap();
    Command::new(env!("CARGO_BIN_EXE_pagesmith"))
        .env_clear()
        .env("HOME", &home)
        .env("XDG_CONFIG_HOME", temp_dir.path().join("config"))
        .current_dir(workspace)
        .arg("--workspace")
        .arg(workspace)
        .arg("--quiet")
        .args(args)
        .output()
        .unwrap()
}

#[test]
fn test_themes_lists_catalogue() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    let output = pagesmith(&temp_dir, &ws, &["themes", "--format", "json"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["total"], 2);
    assert_eq!(value["themes"][0]["theme"], "demo-corporate");
    assert_eq!(value["themes"][0]["files"][2], "contact");
}

#[test]
fn test_run_without_configuration_aborts() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    let output = pagesmith(&temp_dir, &ws, &["run"]);
    assert_eq!(output.status.code(), Some(1));

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.starts_with("Process aborted:"), "stderr: {}", stderr);
    assert!(stderr.contains("Database"));
}

#[test]
fn test_validate_reports_config_and_theme_problems() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);
    fs::remove_file(ws.join("templates/demo-shop/shop.html")).unwrap();

    let output = pagesmith(&temp_dir, &ws, &["validate", "--format", "json"]);
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["valid"], false);
    assert!(!value["config_errors"].as_array().unwrap().is_empty());
    let shop = &value["themes"][1];
    assert_eq!(shop["theme"], "demo-shop");
    assert_eq!(shop["problems"].as_array().unwrap().len(), 1);
}

#[test]
fn test_validate_passes_with_complete_configuration() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);
    fs::create_dir_all(ws.join("config")).unwrap();
    fs::write(
        ws.join("config/config.toml"),
        r#"
[database]
host = "localhost"
name = "sites"

[ftp]
host = "localhost"

[provider]
provider_type = "openai"
api_key = "sk-test"
"#,
    )
    .unwrap();

    let output = pagesmith(&temp_dir, &ws, &["validate"]);
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).contains("Validation passed"));
}

#[test]
fn test_explicit_config_file_must_exist() {
    let temp_dir = TempDir::new().unwrap();
    let ws = workspace(&temp_dir);

    let output = pagesmith(&temp_dir, &ws, &["--config", "missing.toml", "themes"]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).starts_with("Process aborted:"));
}
