//! Merge rules: defaults, override order, conflict handling.
//!
//! Sources are added lowest precedence first: defaults, global file, workspace
//! files, legacy bare environment variables, then `PAGESMITH__*` variables.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("database.port", 3306)?
        .set_default("database.table", "app_descriptions")?
        .set_default("ftp.port", 21)?
        .set_default("templates.root", "templates")?
        .set_default("templates.file_structure", "file_structure.json")?
        .set_default("generation.max_retries", 2)?
        .set_default("generation.theme_attempts", 3)?
        .set_default("publish.root_dir", "LIVE")
}
