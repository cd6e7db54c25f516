//! Model Provider Abstraction
//!
//! Transport to the text-generation service. Every provider speaks the OpenAI
//! chat-completions protocol; the hosted OpenAI API and self-hosted compatible
//! servers differ only in base URL and authentication.

use crate::error::BuildError;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod profile;

pub use profile::{ProviderConfig, ProviderType};

/// Model provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum ModelProvider {
    OpenAI {
        model: String,
        api_key: String,
        base_url: Option<String>, // For custom endpoints (e.g., Azure OpenAI)
    },
    LocalCustom {
        model: String,
        endpoint: String, // Full endpoint URL (e.g., http://localhost:8080/v1)
        api_key: Option<String>,
    },
}

/// Speaker of a chat message, serialized the way chat-completions endpoints expect.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: MessageRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: MessageRole::User,
            content: content.into(),
        }
    }
}

/// Sampling knobs forwarded to the endpoint; unset values are left to the server.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompletionOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
    pub model: String,
    pub usage: TokenUsage,
    pub finish_reason: Option<String>,
}

/// Model provider client trait
#[async_trait]
pub trait ModelProviderClient: Send + Sync {
    /// Generate a completion from a list of messages
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, BuildError>;

    /// Get the provider name
    fn provider_name(&self) -> &str;

    /// Get the model name
    fn model_name(&self) -> &str;
}

#[derive(Serialize)]
struct WireRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Deserialize)]
struct WireResponse {
    model: String,
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<TokenUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireReply,
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireReply {
    #[serde(default)]
    content: Option<String>,
}

fn map_http_error(error: reqwest::Error) -> BuildError {
    if error.is_timeout() {
        BuildError::Generation(format!("Request timeout: {}", error))
    } else if error.is_connect() {
        BuildError::Generation(format!("Connection error: {}", error))
    } else {
        BuildError::Generation(format!("HTTP error: {}", error))
    }
}

fn map_status_error(status: reqwest::StatusCode, body: &str) -> BuildError {
    match status.as_u16() {
        401 => BuildError::Generation(format!("Authentication failed: {}", body)),
        404 => BuildError::Generation(format!("Model not found: {}", body)),
        429 => BuildError::Generation(format!("Rate limit exceeded: {}", body)),
        _ => BuildError::Generation(format!("Request failed with status {}: {}", status, body)),
    }
}

/// Optional HTTP timeouts for provider requests. Unset values leave reqwest's defaults.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HttpTimeouts {
    pub connect: Option<Duration>,
    pub request: Option<Duration>,
}

impl HttpTimeouts {
    pub fn from_secs(connect: Option<u64>, request: Option<u64>) -> Self {
        Self {
            connect: connect.map(Duration::from_secs),
            request: request.map(Duration::from_secs),
        }
    }
}

fn build_provider_http_client(timeouts: HttpTimeouts) -> Result<Client, BuildError> {
    let mut builder = Client::builder();
    if let Some(connect) = timeouts.connect {
        builder = builder.connect_timeout(connect);
    }
    if let Some(request) = timeouts.request {
        builder = builder.timeout(request);
    }
    builder
        .build()
        .map_err(|e| BuildError::Config(format!("Failed to create HTTP client: {}", e)))
}

/// Send one chat-completion request to an OpenAI-compatible endpoint.
async fn send_chat_completion(
    client: &Client,
    url: &str,
    api_key: Option<&str>,
    model: &str,
    messages: Vec<ChatMessage>,
    options: CompletionOptions,
) -> Result<CompletionResponse, BuildError> {
    let request = WireRequest {
        model,
        messages: &messages,
        temperature: options.temperature,
        max_tokens: options.max_tokens,
        stream: false,
    };

    let mut builder = client
        .post(url)
        .header("Content-Type", "application/json")
        .json(&request);
    if let Some(key) = api_key {
        builder = builder.header("Authorization", format!("Bearer {}", key));
    }

    let response = builder.send().await.map_err(map_http_error)?;

    if !response.status().is_success() {
        let status = response.status();
        let error_text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());
        return Err(map_status_error(status, &error_text));
    }

    let completion: WireResponse = response
        .json()
        .await
        .map_err(|e| BuildError::Generation(format!("Failed to parse response: {}", e)))?;

    let choice = completion
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| BuildError::Generation("No choices in response".to_string()))?;

    Ok(CompletionResponse {
        content: choice.message.content.unwrap_or_default(),
        model: completion.model,
        usage: completion.usage.unwrap_or_default(),
        finish_reason: choice.finish_reason,
    })
}

/// OpenAI provider client
pub struct OpenAIClient {
    client: Client,
    model: String,
    api_key: String,
    base_url: String,
}

impl OpenAIClient {
    pub fn new(
        model: String,
        api_key: String,
        base_url: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, BuildError> {
        let client = build_provider_http_client(timeouts)?;
        let base_url = base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string());

        Ok(Self {
            client,
            model,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl ModelProviderClient for OpenAIClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, BuildError> {
        let url = format!("{}/chat/completions", self.base_url);
        send_chat_completion(
            &self.client,
            &url,
            Some(&self.api_key),
            &self.model,
            messages,
            options,
        )
        .await
    }

    fn provider_name(&self) -> &str {
        "openai"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Custom local provider client (OpenAI-compatible API)
pub struct CustomLocalClient {
    client: Client,
    model: String,
    endpoint: String,
    api_key: Option<String>,
}

impl CustomLocalClient {
    pub fn new(
        model: String,
        endpoint: String,
        api_key: Option<String>,
        timeouts: HttpTimeouts,
    ) -> Result<Self, BuildError> {
        let client = build_provider_http_client(timeouts)?;
        Ok(Self {
            client,
            model,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl ModelProviderClient for CustomLocalClient {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        options: CompletionOptions,
    ) -> Result<CompletionResponse, BuildError> {
        let url = format!("{}/chat/completions", self.endpoint);
        send_chat_completion(
            &self.client,
            &url,
            self.api_key.as_deref(),
            &self.model,
            messages,
            options,
        )
        .await
    }

    fn provider_name(&self) -> &str {
        "local"
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

/// Provider factory for creating provider clients
pub struct ProviderFactory;

impl ProviderFactory {
    pub fn create_client(
        provider: &ModelProvider,
        timeouts: HttpTimeouts,
    ) -> Result<Box<dyn ModelProviderClient>, BuildError> {
        match provider {
            ModelProvider::OpenAI {
                model,
                api_key,
                base_url,
            } => Ok(Box::new(OpenAIClient::new(
                model.clone(),
                api_key.clone(),
                base_url.clone(),
                timeouts,
            )?)),
            ModelProvider::LocalCustom {
                model,
                endpoint,
                api_key,
            } => Ok(Box::new(CustomLocalClient::new(
                model.clone(),
                endpoint.clone(),
                api_key.clone(),
                timeouts,
            )?)),
        }
    }

    /// Create the client described by a provider configuration section.
    pub fn from_config(config: &ProviderConfig) -> Result<Box<dyn ModelProviderClient>, BuildError> {
        Self::create_client(&config.to_model_provider()?, config.timeouts())
    }
}

// Mock provider for testing
#[cfg(test)]
pub struct MockProvider {
    responses: Vec<Result<String, String>>,
    calls: std::sync::Mutex<Vec<Vec<ChatMessage>>>,
    model_name: String,
}

#[cfg(test)]
impl MockProvider {
    /// Replies in order; once exhausted the last reply repeats.
    pub fn new(responses: Vec<Result<String, String>>) -> Self {
        Self {
            responses,
            calls: std::sync::Mutex::new(Vec::new()),
            model_name: "mock-model".to_string(),
        }
    }

    /// Same successful reply for every call.
    pub fn always(content: &str) -> Self {
        Self::new(vec![Ok(content.to_string())])
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// User payload of every call, in order.
    pub fn user_prompts(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter_map(|messages| {
                messages
                    .iter()
                    .find(|m| m.role == MessageRole::User)
                    .map(|m| m.content.clone())
            })
            .collect()
    }
}

#[cfg(test)]
#[async_trait]
impl ModelProviderClient for MockProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _options: CompletionOptions,
    ) -> Result<CompletionResponse, BuildError> {
        let index = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(messages);
            calls.len() - 1
        };
        let reply = self
            .responses
            .get(index)
            .or_else(|| self.responses.last())
            .cloned()
            .unwrap_or_else(|| Ok("Mock response".to_string()));

        match reply {
            Ok(content) => Ok(CompletionResponse {
                content,
                model: self.model_name.clone(),
                usage: TokenUsage {
                    prompt_tokens: 10,
                    completion_tokens: 20,
                    total_tokens: 30,
                },
                finish_reason: Some("stop".to_string()),
            }),
            Err(msg) => Err(BuildError::Generation(msg)),
        }
    }

    fn provider_name(&self) -> &str {
        "mock"
    }

    fn model_name(&self) -> &str {
        &self.model_name
    }
}
