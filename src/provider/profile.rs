//! Provider configuration schema owned by the provider domain.

use crate::error::BuildError;
use crate::provider::{CompletionOptions, HttpTimeouts, ModelProvider};
use serde::{Deserialize, Serialize};

/// Provider type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderType {
    #[serde(rename = "openai")]
    OpenAI,
    /// Any server speaking the OpenAI chat-completions protocol
    LocalCustom,
}

/// Provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_provider_type")]
    pub provider_type: ProviderType,

    /// Model identifier sent with every request
    #[serde(default = "default_model")]
    pub model: String,

    /// API key; required for OpenAI
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override; required for local_custom
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,

    /// Unset leaves the HTTP client's own default
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub connect_timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

fn default_provider_type() -> ProviderType {
    ProviderType::OpenAI
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            provider_type: default_provider_type(),
            model: default_model(),
            api_key: None,
            endpoint: None,
            temperature: None,
            max_tokens: None,
            connect_timeout_secs: None,
            request_timeout_secs: None,
        }
    }
}

impl ProviderConfig {
    /// Validate provider configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("model cannot be empty".to_string());
        }
        if let Some(endpoint) = &self.endpoint {
            if !(endpoint.starts_with("http://") || endpoint.starts_with("https://")) {
                return Err(format!("endpoint must be an http(s) URL: {}", endpoint));
            }
        }
        if let Some(temperature) = self.temperature {
            if !(0.0..=2.0).contains(&temperature) {
                return Err(format!("temperature {} outside 0.0-2.0", temperature));
            }
        }
        match self.provider_type {
            ProviderType::OpenAI => {
                if self.api_key.as_deref().map_or(true, |k| k.trim().is_empty()) {
                    return Err("api_key is required for openai".to_string());
                }
            }
            ProviderType::LocalCustom => {
                if self.endpoint.is_none() {
                    return Err("endpoint is required for local_custom".to_string());
                }
            }
        }
        Ok(())
    }

    /// Convert to the runtime provider description used by `ProviderFactory`.
    pub fn to_model_provider(&self) -> Result<ModelProvider, BuildError> {
        match self.provider_type {
            ProviderType::OpenAI => {
                let api_key = self.api_key.clone().ok_or_else(|| {
                    BuildError::Config("OpenAI provider requires an api_key".to_string())
                })?;
                Ok(ModelProvider::OpenAI {
                    model: self.model.clone(),
                    api_key,
                    base_url: self.endpoint.clone(),
                })
            }
            ProviderType::LocalCustom => {
                let endpoint = self.endpoint.clone().ok_or_else(|| {
                    BuildError::Config("local_custom provider requires an endpoint".to_string())
                })?;
                Ok(ModelProvider::LocalCustom {
                    model: self.model.clone(),
                    endpoint,
                    api_key: self.api_key.clone(),
                })
            }
        }
    }

    pub fn timeouts(&self) -> HttpTimeouts {
        HttpTimeouts::from_secs(self.connect_timeout_secs, self.request_timeout_secs)
    }

    pub fn completion_options(&self) -> CompletionOptions {
        CompletionOptions {
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        }
    }
}
