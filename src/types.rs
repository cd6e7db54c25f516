//! Core types shared across the build pipeline.

use crate::error::BuildError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Theme value meaning "let the system choose".
pub const AUTO_THEME: &str = "ai";

/// Replacement text keyed by placeholder token, for one page.
pub type PageValues = BTreeMap<String, String>;

/// Lifecycle status of a build request. Only ever moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RequestStatus {
    Pending,
    Building,
    Completed,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "PENDING",
            RequestStatus::Building => "BUILDING",
            RequestStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestStatus {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PENDING" => Ok(RequestStatus::Pending),
            "BUILDING" => Ok(RequestStatus::Building),
            "COMPLETED" => Ok(RequestStatus::Completed),
            other => Err(BuildError::Config(format!(
                "Unknown request status: {}",
                other
            ))),
        }
    }
}

/// Account tier; gates how many of a theme's files are built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum UserType {
    Free,
    Paid,
}

impl UserType {
    pub fn as_str(&self) -> &'static str {
        match self {
            UserType::Free => "FREE",
            UserType::Paid => "PAID",
        }
    }
}

impl fmt::Display for UserType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserType {
    type Err = BuildError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "FREE" => Ok(UserType::Free),
            "PAID" => Ok(UserType::Paid),
            other => Err(BuildError::Config(format!("Unknown user type: {}", other))),
        }
    }
}

/// A pending website-build request as read from the requests table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildRequest {
    pub id: i64,
    pub description: String,
    pub theme: String,
    pub status: RequestStatus,
    pub user_type: UserType,
}

impl BuildRequest {
    pub fn wants_auto_theme(&self) -> bool {
        self.theme.trim().eq_ignore_ascii_case(AUTO_THEME)
    }
}

/// Theme name to ordered page file keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateSet {
    themes: BTreeMap<String, Vec<String>>,
}

impl TemplateSet {
    pub fn new(themes: BTreeMap<String, Vec<String>>) -> Self {
        Self { themes }
    }

    pub fn files_for(&self, theme: &str) -> Option<&[String]> {
        self.themes.get(theme).map(Vec::as_slice)
    }

    /// Theme names available for selection, excluding the auto-select sentinel.
    pub fn theme_names(&self) -> Vec<String> {
        self.themes
            .keys()
            .filter(|name| !name.eq_ignore_ascii_case(AUTO_THEME))
            .cloned()
            .collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<String>)> {
        self.themes.iter()
    }

    pub fn len(&self) -> usize {
        self.themes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.themes.is_empty()
    }
}
