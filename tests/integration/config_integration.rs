//! Integration tests for Configuration System

use super::test_utils::with_isolated_env;
use pagesmith::config::{ConfigLoader, ProviderType, ValidationError};
use std::fs;
use tempfile::TempDir;

fn write_workspace_config(workspace: &std::path::Path, name: &str, content: &str) {
    let dir = workspace.join("config");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join(name), content).unwrap();
}

#[test]
fn test_defaults_without_any_source() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let config = with_isolated_env(&temp_dir, &[], || ConfigLoader::load(&workspace).unwrap());

    assert_eq!(config.database.port, 3306);
    assert_eq!(config.database.table, "app_descriptions");
    assert_eq!(config.ftp.port, 21);
    assert_eq!(config.generation.max_retries, 2);
    assert_eq!(config.generation.theme_attempts, 3);
    assert_eq!(config.publish.root_dir, "LIVE");
    assert_eq!(config.templates.root, workspace.join("templates"));
    assert!(config.notify.url.is_none());
    assert!(config.notify.timeout_secs.is_none());
    assert!(config.provider.connect_timeout_secs.is_none());
    assert!(config.provider.request_timeout_secs.is_none());

    // Nothing says where the database or FTP server is.
    let errors = config.validate().unwrap_err();
    assert!(errors.iter().any(|e| matches!(e, ValidationError::Database(_))));
    assert!(errors.iter().any(|e| matches!(e, ValidationError::Ftp(_))));
}

#[test]
fn test_legacy_environment_variables_fill_credentials() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    fs::create_dir_all(&workspace).unwrap();

    let vars = [
        ("DB_HOST", "db.internal"),
        ("DB_USERNAME", "builder"),
        ("DB_PASSWORD", "s3cret"),
        ("DB_NAME", "sites"),
        ("FTP_SERVER", "ftp.internal"),
        ("FTP_USERNAME", "deploy"),
        ("FTP_PASSWORD", "hunter2"),
        ("OPENAI_API_KEY", "sk-test"),
    ];
    let config = with_isolated_env(&temp_dir, &vars, || ConfigLoader::load(&workspace).unwrap());

    assert_eq!(config.database.host, "db.internal");
    assert_eq!(config.database.username, "builder");
    assert_eq!(config.database.name, "sites");
    assert_eq!(config.ftp.host, "ftp.internal");
    assert_eq!(config.ftp.password, "hunter2");
    assert_eq!(config.provider.provider_type, ProviderType::OpenAI);
    assert_eq!(config.provider.api_key.as_deref(), Some("sk-test"));
    assert!(config.validate().is_ok());
}

#[test]
fn test_prefixed_variables_override_legacy_and_files() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    write_workspace_config(
        &workspace,
        "config.toml",
        r#"
[database]
host = "from-file"
port = 3307
"#,
    );

    let vars = [
        ("DB_HOST", "from-legacy"),
        ("PAGESMITH__DATABASE__HOST", "from-prefixed"),
        ("PAGESMITH__GENERATION__MAX_RETRIES", "4"),
    ];
    let config = with_isolated_env(&temp_dir, &vars, || ConfigLoader::load(&workspace).unwrap());

    assert_eq!(config.database.host, "from-prefixed");
    assert_eq!(config.database.port, 3307);
    assert_eq!(config.generation.max_retries, 4);
}

#[test]
fn test_environment_specific_file_overrides_base() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    write_workspace_config(
        &workspace,
        "config.toml",
        r#"
[publish]
root_dir = "LIVE"
upload_values = false

[templates]
root = "site-templates"
"#,
    );
    write_workspace_config(
        &workspace,
        "staging.toml",
        r#"
[publish]
root_dir = "STAGING"
"#,
    );

    let config = with_isolated_env(&temp_dir, &[("PAGESMITH_ENV", "staging")], || {
        ConfigLoader::load(&workspace).unwrap()
    });

    assert_eq!(config.publish.root_dir, "STAGING");
    assert!(!config.publish.upload_values);
    assert_eq!(config.templates.root, workspace.join("site-templates"));
}

#[test]
fn test_global_file_is_lowest_file_layer() {
    let temp_dir = TempDir::new().unwrap();
    let workspace = temp_dir.path().join("ws");
    write_workspace_config(
        &workspace,
        "config.toml",
        r#"
[ftp]
host = "workspace-ftp"
"#,
    );
    let global_dir = temp_dir.path().join("xdg").join("pagesmith");
    fs::create_dir_all(&global_dir).unwrap();
    fs::write(
        global_dir.join("config.toml"),
        r#"
[ftp]
host = "global-ftp"
username = "global-user"
"#,
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, &[], || ConfigLoader::load(&workspace).unwrap());

    assert_eq!(config.ftp.host, "workspace-ftp");
    assert_eq!(config.ftp.username, "global-user");
}

#[test]
fn test_load_from_file_resolves_templates_next_to_file() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("deploy").join("pagesmith.toml");
    fs::create_dir_all(config_file.parent().unwrap()).unwrap();
    fs::write(
        &config_file,
        r#"
[database]
host = "localhost"
name = "sites"

[ftp]
host = "localhost"

[provider]
provider_type = "local_custom"
model = "llama3"
endpoint = "http://localhost:8080/v1"

[notify]
url = "https://queue.example.com/processed?id={id}"

[templates]
root = "themes"
"#,
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, &[], || {
        ConfigLoader::load_from_file(&config_file).unwrap()
    });

    assert_eq!(config.provider.provider_type, ProviderType::LocalCustom);
    assert_eq!(config.provider.model, "llama3");
    assert_eq!(
        config.templates.root,
        temp_dir.path().join("deploy").join("themes")
    );
    assert!(config.validate().is_ok());
}

#[test]
fn test_load_from_missing_file_fails() {
    let temp_dir = TempDir::new().unwrap();
    let missing = temp_dir.path().join("nope.toml");
    assert!(ConfigLoader::load_from_file(&missing).is_err());
}

#[test]
fn test_validation_collects_every_problem() {
    let temp_dir = TempDir::new().unwrap();
    let config_file = temp_dir.path().join("bad.toml");
    fs::write(
        &config_file,
        r#"
[database]
host = "localhost"
name = "sites"
table = "requests; drop"

[ftp]
host = "localhost"

[provider]
provider_type = "openai"
api_key = "sk-test"

[generation]
max_retries = 50
theme_attempts = 0

[notify]
url = "ftp://not-http"
"#,
    )
    .unwrap();

    let config = with_isolated_env(&temp_dir, &[], || {
        ConfigLoader::load_from_file(&config_file).unwrap()
    });
    let errors = config.validate().unwrap_err();

    assert!(errors.iter().any(|e| matches!(e, ValidationError::Database(m) if m.contains("table"))));
    assert_eq!(
        errors
            .iter()
            .filter(|e| matches!(e, ValidationError::Generation(_)))
            .count(),
        2
    );
    assert!(errors.iter().any(|e| matches!(e, ValidationError::Notify(_))));
}
