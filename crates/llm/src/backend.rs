//! Azure OpenAI chat-completions backend
//!
//! Minimal non-streaming client for the chat completions endpoint of an
//! Azure OpenAI deployment. The assistant only ever needs one system + one
//! user message per call.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use member_assist_config::LlmSettings;

use crate::LlmError;

/// Configuration for the Azure OpenAI backend
#[derive(Debug, Clone)]
pub struct AzureOpenAiConfig {
    /// Resource endpoint, e.g. "https://myresource.openai.azure.com"
    pub endpoint: String,
    /// Chat deployment name
    pub deployment: String,
    /// API version query parameter
    pub api_version: String,
    /// API key
    pub api_key: String,
    /// Sampling temperature
    pub temperature: f32,
    /// Maximum tokens to generate
    pub max_tokens: usize,
    /// Request timeout
    pub timeout: Duration,
}

impl AzureOpenAiConfig {
    /// Build from settings, reading the API key from the configured
    /// environment variable
    pub fn from_settings(settings: &LlmSettings) -> Result<Self, LlmError> {
        let api_key = std::env::var(&settings.api_key_env).map_err(|_| {
            LlmError::Configuration(format!("{} not set", settings.api_key_env))
        })?;

        if settings.endpoint.is_empty() {
            return Err(LlmError::Configuration("llm.endpoint not set".to_string()));
        }

        Ok(Self {
            endpoint: settings.endpoint.clone(),
            deployment: settings.deployment.clone(),
            api_version: settings.api_version.clone(),
            api_key,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            timeout: Duration::from_secs(settings.timeout_secs),
        })
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature.clamp(0.0, 2.0);
        self
    }

    /// Set max tokens
    pub fn with_max_tokens(mut self, max_tokens: usize) -> Self {
        self.max_tokens = max_tokens;
        self
    }
}

/// A chat completion backend: one system prompt, one user message, one
/// text reply
#[async_trait]
pub trait ChatBackend: Send + Sync {
    async fn chat(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError>;
}

/// Azure OpenAI chat backend
pub struct AzureOpenAiBackend {
    config: AzureOpenAiConfig,
    client: Client,
}

impl AzureOpenAiBackend {
    pub fn new(config: AzureOpenAiConfig) -> Result<Self, LlmError> {
        if config.api_key.is_empty() {
            return Err(LlmError::Configuration("API key is empty".to_string()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| LlmError::Network(e.to_string()))?;

        Ok(Self { config, client })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.deployment,
            self.config.api_version,
        )
    }
}

#[async_trait]
impl ChatBackend for AzureOpenAiBackend {
    async fn chat(&self, system_prompt: &str, user_message: &str) -> Result<String, LlmError> {
        let request = ChatRequest {
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: system_prompt.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: user_message.to_string(),
                },
            ],
            temperature: self.config.temperature,
            max_tokens: self.config.max_tokens,
        };

        let response = self
            .client
            .post(self.completions_url())
            .header("api-key", &self.config.api_key)
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LlmError::Api(format!("HTTP {}: {}", status, error_text)));
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmError::InvalidResponse(e.to_string()))?;

        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        tracing::debug!(chars = content.len(), "Chat completion received");
        Ok(content)
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: usize,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}
