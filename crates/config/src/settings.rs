//! Main settings module

use serde::{Deserialize, Serialize};

use crate::agent::AgentConfig;
use crate::ConfigError;

/// Runtime environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    /// Development mode - relaxed validation, permissive CORS
    #[default]
    Development,
    /// Production mode - all validations enforced
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Main application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Runtime environment (development, production)
    #[serde(default)]
    pub environment: RuntimeEnvironment,

    /// HTTP server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Cloud LLM configuration (intent classification and slot hints)
    #[serde(default)]
    pub llm: LlmSettings,

    /// Cloud speech configuration (synthesis and recognition)
    #[serde(default)]
    pub speech: SpeechSettings,

    /// Dialogue behavior configuration
    #[serde(default)]
    pub agent: AgentConfig,
}

impl Settings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate settings
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "Port must be non-zero".to_string(),
            });
        }

        if !(0.0..=2.0).contains(&self.llm.temperature) {
            return Err(ConfigError::InvalidValue {
                field: "llm.temperature".to_string(),
                message: format!("Must be between 0.0 and 2.0, got {}", self.llm.temperature),
            });
        }

        if self.llm.max_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "llm.max_tokens".to_string(),
                message: "Must be greater than zero".to_string(),
            });
        }

        self.agent.validate()?;

        // Production requires a real LLM endpoint; development degrades to
        // classifier fallbacks instead.
        if self.environment.is_production() && self.llm.endpoint.is_empty() {
            return Err(ConfigError::Missing("llm.endpoint".to_string()));
        }

        Ok(())
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind host
    #[serde(default = "default_host")]
    pub host: String,
    /// Bind port
    #[serde(default = "default_port")]
    pub port: u16,
    /// Allowed CORS origins; empty defaults to localhost:3000
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Disable to allow any origin (development only)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,
    /// Maximum live sessions kept in memory
    #[serde(default = "default_max_sessions")]
    pub max_sessions: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            cors_enabled: default_true(),
            max_sessions: default_max_sessions(),
        }
    }
}

/// Cloud LLM (Azure OpenAI) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    /// Resource endpoint, e.g. "https://myresource.openai.azure.com"
    #[serde(default)]
    pub endpoint: String,
    /// Deployment name of the chat model
    #[serde(default = "default_deployment")]
    pub deployment: String,
    /// API version query parameter
    #[serde(default = "default_api_version")]
    pub api_version: String,
    /// Environment variable holding the API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Sampling temperature for intent classification
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Maximum tokens per completion
    #[serde(default = "default_max_tokens")]
    pub max_tokens: usize,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            deployment: default_deployment(),
            api_version: default_api_version(),
            api_key_env: default_api_key_env(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Cloud speech service configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpeechSettings {
    /// Text-to-speech endpoint
    #[serde(default)]
    pub tts_endpoint: String,
    /// Speech-to-text endpoint
    #[serde(default)]
    pub stt_endpoint: String,
    /// Voice name for synthesis
    #[serde(default = "default_voice")]
    pub voice: String,
    /// BCP-47 language code
    #[serde(default = "default_language_code")]
    pub language_code: String,
    /// Environment variable holding the speech API key
    #[serde(default = "default_speech_key_env")]
    pub api_key_env: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for SpeechSettings {
    fn default() -> Self {
        Self {
            tts_endpoint: String::new(),
            stt_endpoint: String::new(),
            voice: default_voice(),
            language_code: default_language_code(),
            api_key_env: default_speech_key_env(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_true() -> bool {
    true
}

fn default_max_sessions() -> usize {
    100
}

fn default_deployment() -> String {
    "gpt-4o".to_string()
}

fn default_api_version() -> String {
    "2024-02-15-preview".to_string()
}

fn default_api_key_env() -> String {
    "AZURE_OPENAI_API_KEY".to_string()
}

fn default_temperature() -> f32 {
    0.7
}

fn default_max_tokens() -> usize {
    300
}

fn default_timeout_secs() -> u64 {
    30
}

fn default_voice() -> String {
    "en-US-Neural2-J".to_string()
}

fn default_language_code() -> String {
    "en-US".to_string()
}

fn default_speech_key_env() -> String {
    "SPEECH_API_KEY".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let settings = Settings::default();
        assert!(settings.validate().is_ok());
        assert_eq!(settings.server.port, 8080);
    }

    #[test]
    fn test_zero_port_rejected() {
        let mut settings = Settings::default();
        settings.server.port = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_temperature_bounds() {
        let mut settings = Settings::default();
        settings.llm.temperature = 3.5;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_production_requires_endpoint() {
        let mut settings = Settings::default();
        settings.environment = RuntimeEnvironment::Production;
        assert!(settings.validate().is_err());

        settings.llm.endpoint = "https://example.openai.azure.com".to_string();
        assert!(settings.validate().is_ok());
    }
}
