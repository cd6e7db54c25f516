//! Queue-cleanup notification sent after a build completes.

use crate::config::NotifyConfig;
use crate::error::BuildError;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use tracing::debug;

/// Placeholder substituted with the request id in the notification URL.
pub const ID_PLACEHOLDER: &str = "{id}";

pub struct Notifier {
    client: Client,
    url_template: String,
}

impl Notifier {
    pub fn new(
        url_template: impl Into<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, BuildError> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| BuildError::Config(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            url_template: url_template.into(),
        })
    }

    /// `None` when no notification URL is configured.
    pub fn from_config(config: &NotifyConfig) -> Result<Option<Self>, BuildError> {
        config
            .url
            .as_deref()
            .filter(|url| !url.trim().is_empty())
            .map(|url| Self::new(url, config.timeout_secs.map(Duration::from_secs)))
            .transpose()
    }

    pub fn url_for(&self, request_id: i64) -> String {
        self.url_template
            .replace(ID_PLACEHOLDER, &request_id.to_string())
    }

    /// Signal that `request_id` was processed. Only HTTP 200 counts as success.
    pub async fn notify(&self, request_id: i64) -> Result<(), BuildError> {
        let url = self.url_for(request_id);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| BuildError::Notification(format!("GET {} failed: {}", url, e)))?;

        let status = response.status();
        debug!(request_id, status = status.as_u16(), "Notification sent");
        if status != StatusCode::OK {
            return Err(BuildError::Notification(format!(
                "GET {} returned {}",
                url, status
            )));
        }
        Ok(())
    }
}
