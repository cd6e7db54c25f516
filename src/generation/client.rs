//! Generation client: exactly one request to the text-generation service per call.

use crate::error::BuildError;
use crate::provider::{ChatMessage, CompletionOptions, ModelProviderClient};
use std::sync::Arc;
use std::time::Instant;
use tracing::debug;

#[derive(Clone)]
pub struct GenerationClient {
    provider: Arc<dyn ModelProviderClient>,
    options: CompletionOptions,
}

impl GenerationClient {
    pub fn new(provider: Arc<dyn ModelProviderClient>, options: CompletionOptions) -> Self {
        Self { provider, options }
    }

    /// Send a system instruction and user payload; return the completion text trimmed.
    ///
    /// Every failure, whatever its cause, surfaces as `BuildError::Generation`.
    /// There is no retry at this layer.
    pub async fn generate(&self, system_prompt: &str, user_prompt: &str) -> Result<String, BuildError> {
        let started = Instant::now();
        let messages = vec![ChatMessage::system(system_prompt), ChatMessage::user(user_prompt)];

        let response = self
            .provider
            .complete(messages, self.options.clone())
            .await
            .map_err(|e| match e {
                BuildError::Generation(msg) => BuildError::Generation(msg),
                other => BuildError::Generation(other.to_string()),
            })?;

        debug!(
            provider = self.provider.provider_name(),
            model = %response.model,
            total_tokens = response.usage.total_tokens,
            finish_reason = ?response.finish_reason,
            duration_ms = started.elapsed().as_millis() as u64,
            "Generation completed"
        );

        Ok(response.content.trim().to_string())
    }

    pub fn model_name(&self) -> &str {
        self.provider.model_name()
    }
}
