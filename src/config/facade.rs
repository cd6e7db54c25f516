//! ConfigLoader: the single entry point that assembles layered sources into a
//! `PagesmithConfig`.

use super::merge::merge_policy;
use super::sources::{environment, global_file, workspace_file};
use super::PagesmithConfig;
use config::{ConfigError, File};
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration for a workspace.
    ///
    /// Precedence (highest last): defaults, global file, `pagesmith.toml`,
    /// `config/config.toml`, `config/{PAGESMITH_ENV}.toml`, legacy environment,
    /// `PAGESMITH__*` environment.
    pub fn load(workspace_root: &Path) -> Result<PagesmithConfig, ConfigError> {
        let builder = merge_policy::builder_with_defaults()?;
        let builder = global_file::add_to_builder(builder)?;
        let builder = workspace_file::add_to_builder(builder, workspace_root)?;
        let builder = environment::add_to_builder(builder)?;

        let mut config: PagesmithConfig = builder.build()?.try_deserialize()?;
        config.templates.root = config.templates.resolve_root(workspace_root);
        debug!(
            workspace = %workspace_root.display(),
            templates = %config.templates.root.display(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load configuration from an explicit file, skipping global and workspace files.
    /// Environment variables still apply on top. Relative template roots resolve
    /// against the file's directory.
    pub fn load_from_file(path: &Path) -> Result<PagesmithConfig, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let builder = merge_policy::builder_with_defaults()?
            .add_source(File::from(path.to_path_buf()).required(true));
        let builder = environment::add_to_builder(builder)?;

        let mut config: PagesmithConfig = builder.build()?.try_deserialize()?;
        let base = path.parent().unwrap_or_else(|| Path::new("."));
        config.templates.root = config.templates.resolve_root(base);
        Ok(config)
    }

    /// Location of the user-level configuration file, if a home directory is known.
    pub fn global_config_path() -> Option<PathBuf> {
        global_file::global_config_path()
    }
}
