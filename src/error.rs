//! Error types for the Pagesmith build worker.

use thiserror::Error;

/// Build-related errors
///
/// Only `Generation` and `Validation` are recovered, and only inside the bounded
/// retry loops. Everything else propagates to the top of the run.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("Connectivity failure: {0}")]
    Connectivity(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Max retries exceeded for {target} after {attempts} attempts: {last_error}")]
    MaxRetriesExceeded {
        target: String,
        attempts: usize,
        last_error: String,
    },

    #[error("Missing resource: {0}")]
    MissingResource(String),

    #[error("Publish failed: {0}")]
    Publish(String),

    #[error("Notification failed: {0}")]
    Notification(String),

    #[error("Build request {0} was claimed by another run")]
    AlreadyClaimed(i64),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BuildError {
    /// Whether the failure feeds a bounded retry loop instead of aborting the run.
    pub fn is_retryable(&self) -> bool {
        matches!(self, BuildError::Generation(_) | BuildError::Validation(_))
    }
}

impl From<config::ConfigError> for BuildError {
    fn from(err: config::ConfigError) -> Self {
        BuildError::Config(err.to_string())
    }
}

impl From<sqlx::Error> for BuildError {
    fn from(err: sqlx::Error) -> Self {
        BuildError::Connectivity(format!("Database error: {}", err))
    }
}
