//! Environment sources: `PAGESMITH__SECTION__KEY` variables plus the bare legacy
//! variables (`DB_HOST`, `FTP_SERVER`, `OPENAI_API_KEY`, ...) that existing scheduler
//! deployments export.

use config::builder::DefaultState;
use config::{ConfigBuilder, ConfigError, Environment, Map, Source, Value};
use std::collections::HashMap;

/// Legacy variable name and the config key it populates.
pub const LEGACY_VARIABLES: &[(&str, &str)] = &[
    ("DB_HOST", "database.host"),
    ("DB_USERNAME", "database.username"),
    ("DB_PASSWORD", "database.password"),
    ("DB_NAME", "database.name"),
    ("FTP_SERVER", "ftp.host"),
    ("FTP_USERNAME", "ftp.username"),
    ("FTP_PASSWORD", "ftp.password"),
    ("OPENAI_API_KEY", "provider.api_key"),
];

/// Source reading the legacy bare variables. Empty values are ignored.
#[derive(Debug, Clone, Default)]
pub struct LegacyEnvironment {
    source: Option<HashMap<String, String>>,
}

impl LegacyEnvironment {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read from the given map instead of the process environment.
    #[cfg(test)]
    pub fn with_source(source: HashMap<String, String>) -> Self {
        Self {
            source: Some(source),
        }
    }

    fn lookup(&self, name: &str) -> Option<String> {
        match &self.source {
            Some(map) => map.get(name).cloned(),
            None => std::env::var(name).ok(),
        }
    }
}

impl Source for LegacyEnvironment {
    fn clone_into_box(&self) -> Box<dyn Source + Send + Sync> {
        Box::new(self.clone())
    }

    fn collect(&self) -> Result<Map<String, Value>, ConfigError> {
        let origin = "legacy environment".to_string();
        let mut collected = Map::new();
        for (variable, key) in LEGACY_VARIABLES {
            if let Some(value) = self.lookup(variable).filter(|v| !v.is_empty()) {
                collected.insert((*key).to_string(), Value::new(Some(&origin), value));
            }
        }
        Ok(collected)
    }
}

/// Prefixed environment source: `PAGESMITH__DATABASE__HOST` -> `database.host`.
pub fn prefixed() -> Environment {
    Environment::with_prefix("PAGESMITH")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Add both environment sources; prefixed variables win over legacy ones.
pub fn add_to_builder(
    builder: ConfigBuilder<DefaultState>,
) -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Ok(builder
        .add_source(LegacyEnvironment::new())
        .add_source(prefixed()))
}
