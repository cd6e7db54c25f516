//! Configuration System
//!
//! One explicit configuration object, built once at startup from layered sources
//! (defaults, global file, workspace files, environment) and handed to every
//! component that needs it. Nothing reads the process environment after load.

use crate::logging::LoggingConfig;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub use crate::provider::{ProviderConfig, ProviderType};

mod facade;
mod merge;
mod sources;

pub use facade::ConfigLoader;

/// Root configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PagesmithConfig {
    /// Build request database
    #[serde(default)]
    pub database: DatabaseConfig,

    /// File-transfer endpoint that receives published pages
    #[serde(default)]
    pub ftp: FtpConfig,

    /// Text-generation provider
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Template store location
    #[serde(default)]
    pub templates: TemplateConfig,

    /// Retry bounds for generation and theme selection
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Queue-cleanup notification endpoint
    #[serde(default)]
    pub notify: NotifyConfig,

    /// Remote layout and index page settings
    #[serde(default)]
    pub publish: PublishConfig,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_db_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,

    /// Database (schema) name
    #[serde(default)]
    pub name: String,

    /// Table holding build requests
    #[serde(default = "default_table")]
    pub table: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_port() -> u16 {
    3306
}

fn default_table() -> String {
    "app_descriptions".to_string()
}

fn default_max_connections() -> u32 {
    1
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_db_port(),
            username: String::new(),
            password: String::new(),
            name: String::new(),
            table: default_table(),
            max_connections: default_max_connections(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FtpConfig {
    #[serde(default)]
    pub host: String,

    #[serde(default = "default_ftp_port")]
    pub port: u16,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

fn default_ftp_port() -> u16 {
    21
}

impl Default for FtpConfig {
    fn default() -> Self {
        Self {
            host: String::new(),
            port: default_ftp_port(),
            username: String::new(),
            password: String::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateConfig {
    /// Directory holding `file_structure.json` and one subdirectory per theme.
    /// Relative paths resolve against the workspace root.
    #[serde(default = "default_template_root")]
    pub root: PathBuf,

    /// Theme-to-files mapping, relative to `root`
    #[serde(default = "default_file_structure")]
    pub file_structure: String,
}

fn default_template_root() -> PathBuf {
    PathBuf::from("templates")
}

fn default_file_structure() -> String {
    "file_structure.json".to_string()
}

impl Default for TemplateConfig {
    fn default() -> Self {
        Self {
            root: default_template_root(),
            file_structure: default_file_structure(),
        }
    }
}

impl TemplateConfig {
    /// Template root as an absolute path when it was given relative to the workspace.
    pub fn resolve_root(&self, workspace_root: &Path) -> PathBuf {
        if self.root.is_absolute() {
            self.root.clone()
        } else {
            workspace_root.join(&self.root)
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Retries after the first attempt; total calls are `max_retries + 1`
    #[serde(default = "default_max_retries")]
    pub max_retries: usize,

    /// Total classification attempts when a request asks for automatic theme selection
    #[serde(default = "default_theme_attempts")]
    pub theme_attempts: usize,
}

fn default_max_retries() -> usize {
    2
}

fn default_theme_attempts() -> usize {
    3
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            theme_attempts: default_theme_attempts(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NotifyConfig {
    /// GET endpoint signalling that a queue entry was processed; `{id}` is replaced
    /// with the request id. Notification is skipped when unset.
    #[serde(default)]
    pub url: Option<String>,

    /// Unset leaves the HTTP client's own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Remote directory under which every request gets `<root_dir>/<id>/`
    #[serde(default = "default_root_dir")]
    pub root_dir: String,

    /// Filename of the wrapper page embedding the first rendered page
    #[serde(default = "default_index_filename")]
    pub index_filename: String,

    /// Also upload the generated values as `<file_key>.values.json`
    #[serde(default)]
    pub upload_values: bool,

    #[serde(default = "default_cta_text")]
    pub cta_text: String,

    #[serde(default = "default_cta_url")]
    pub cta_url: String,
}

fn default_root_dir() -> String {
    "LIVE".to_string()
}

fn default_index_filename() -> String {
    "index.html".to_string()
}

fn default_cta_text() -> String {
    "Like what you see? Claim this website and make it yours.".to_string()
}

fn default_cta_url() -> String {
    "/claim".to_string()
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            root_dir: default_root_dir(),
            index_filename: default_index_filename(),
            upload_values: false,
            cta_text: default_cta_text(),
            cta_url: default_cta_url(),
        }
    }
}

/// Upper bound on configured generation retries.
const MAX_CONFIGURED_RETRIES: usize = 10;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    Database(String),
    Ftp(String),
    Provider(String),
    Generation(String),
    Notify(String),
    Publish(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Database(msg) => write!(f, "Database: {}", msg),
            ValidationError::Ftp(msg) => write!(f, "FTP: {}", msg),
            ValidationError::Provider(msg) => write!(f, "Provider: {}", msg),
            ValidationError::Generation(msg) => write!(f, "Generation: {}", msg),
            ValidationError::Notify(msg) => write!(f, "Notify: {}", msg),
            ValidationError::Publish(msg) => write!(f, "Publish: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl PagesmithConfig {
    /// Validate the entire configuration, collecting every problem.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if self.database.host.trim().is_empty() {
            errors.push(ValidationError::Database("host cannot be empty".to_string()));
        }
        if self.database.name.trim().is_empty() {
            errors.push(ValidationError::Database("name cannot be empty".to_string()));
        }
        if !is_sql_identifier(&self.database.table) {
            errors.push(ValidationError::Database(format!(
                "table '{}' is not a plain identifier",
                self.database.table
            )));
        }
        if self.database.max_connections == 0 {
            errors.push(ValidationError::Database(
                "max_connections must be at least 1".to_string(),
            ));
        }

        if self.ftp.host.trim().is_empty() {
            errors.push(ValidationError::Ftp("host cannot be empty".to_string()));
        }

        if let Err(e) = self.provider.validate() {
            errors.push(ValidationError::Provider(e));
        }

        if self.generation.max_retries > MAX_CONFIGURED_RETRIES {
            errors.push(ValidationError::Generation(format!(
                "max_retries {} exceeds limit of {}",
                self.generation.max_retries, MAX_CONFIGURED_RETRIES
            )));
        }
        if self.generation.theme_attempts == 0 {
            errors.push(ValidationError::Generation(
                "theme_attempts must be at least 1".to_string(),
            ));
        }

        if let Some(url) = &self.notify.url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                errors.push(ValidationError::Notify(format!(
                    "url must be http(s): {}",
                    url
                )));
            }
        }

        if self.publish.root_dir.trim_matches('/').is_empty() {
            errors.push(ValidationError::Publish("root_dir cannot be empty".to_string()));
        }
        if self.publish.index_filename.contains('/') || self.publish.index_filename.is_empty() {
            errors.push(ValidationError::Publish(format!(
                "index_filename must be a bare file name: '{}'",
                self.publish.index_filename
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// The table name is interpolated into SQL, so it must be a bare identifier.
pub(crate) fn is_sql_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_')
        && !name.starts_with(|c: char| c.is_ascii_digit())
}
