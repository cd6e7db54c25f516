//! Workspace config files.
//!
//! Layered in order: `pagesmith.toml` at the workspace root, `config/config.toml`, then the
//! deployment overlay `config/{PAGESMITH_ENV}.toml`.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, File, FileFormat};
use std::path::{Path, PathBuf};

pub const ENV_VAR: &str = "PAGESMITH_ENV";
const DEFAULT_ENV: &str = "production";

/// Existing workspace config files for `env_name`, lowest precedence first.
pub fn candidate_files(workspace_root: &Path, env_name: &str) -> Vec<PathBuf> {
    let config_dir = workspace_root.join("config");
    [
        workspace_root.join("pagesmith.toml"),
        config_dir.join("config.toml"),
        config_dir.join(format!("{}.toml", env_name)),
    ]
    .into_iter()
    .filter(|path| path.is_file())
    .collect()
}

pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
    workspace_root: &Path,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    let env_name = std::env::var(ENV_VAR).unwrap_or_else(|_| DEFAULT_ENV.to_string());
    Ok(candidate_files(workspace_root, &env_name)
        .into_iter()
        .fold(builder, |builder, path| {
            builder.add_source(File::from(path).format(FileFormat::Toml))
        }))
}
