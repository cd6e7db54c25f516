//! Template Store
//!
//! Read-only access to the theme catalogue on disk:
//!
//! ```text
//! <root>/file_structure.json        {"theme": ["file_key", ...], ...}
//! <root>/<theme>/<file_key>.json    reference values (placeholder token -> sample text)
//! <root>/<theme>/<file_key>.html    page template containing the placeholder tokens
//! ```

use crate::error::BuildError;
use crate::types::{PageValues, TemplateSet};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

pub struct TemplateStore {
    root: PathBuf,
    file_structure: String,
}

impl TemplateStore {
    pub fn new(root: impl Into<PathBuf>, file_structure: impl Into<String>) -> Self {
        Self {
            root: root.into(),
            file_structure: file_structure.into(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Load the theme-to-files mapping.
    pub fn load_template_set(&self) -> Result<TemplateSet, BuildError> {
        let path = self.root.join(&self.file_structure);
        let raw = read_resource(&path)?;
        let set: TemplateSet = serde_json::from_str(&raw).map_err(|e| {
            BuildError::Config(format!("Malformed file structure {}: {}", path.display(), e))
        })?;
        debug!(path = %path.display(), themes = set.len(), "Loaded template set");
        Ok(set)
    }

    /// Reference values for one page. These define the required key set.
    pub fn reference_values(&self, theme: &str, file_key: &str) -> Result<PageValues, BuildError> {
        let path = self.page_path(theme, file_key, "json");
        let raw = read_resource(&path)?;
        let value: Value = serde_json::from_str(&raw).map_err(|e| {
            BuildError::Config(format!("Malformed reference values {}: {}", path.display(), e))
        })?;
        match value {
            Value::Object(map) => Ok(map
                .into_iter()
                .map(|(key, value)| (key, value_to_text(value)))
                .collect()),
            _ => Err(BuildError::Config(format!(
                "Reference values {} must be a JSON object",
                path.display()
            ))),
        }
    }

    /// HTML template for one page.
    pub fn html_template(&self, theme: &str, file_key: &str) -> Result<String, BuildError> {
        read_resource(&self.page_path(theme, file_key, "html"))
    }

    /// Check that every page of a theme has both its reference values and its template.
    /// Returns one message per problem found.
    pub fn validate_theme(&self, set: &TemplateSet, theme: &str) -> Vec<String> {
        let Some(files) = set.files_for(theme) else {
            return vec![format!("Theme '{}' is not in the template set", theme)];
        };
        if files.is_empty() {
            return vec![format!("Theme '{}' has no files", theme)];
        }

        let mut problems = Vec::new();
        for file_key in files {
            if let Err(e) = self.reference_values(theme, file_key) {
                problems.push(format!("{}/{}: {}", theme, file_key, e));
            }
            if !self.page_path(theme, file_key, "html").is_file() {
                problems.push(format!("{}/{}: missing HTML template", theme, file_key));
            }
        }
        problems
    }

    fn page_path(&self, theme: &str, file_key: &str, extension: &str) -> PathBuf {
        self.root
            .join(theme)
            .join(format!("{}.{}", file_key, extension))
    }
}

fn read_resource(path: &Path) -> Result<String, BuildError> {
    std::fs::read_to_string(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => {
            BuildError::MissingResource(format!("{} not found", path.display()))
        }
        _ => BuildError::Io(e),
    })
}

/// Text form of a JSON value as it should appear in a page.
pub(crate) fn value_to_text(value: Value) -> String {
    match value {
        Value::String(s) => s,
        other => other.to_string(),
    }
}
