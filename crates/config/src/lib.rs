//! Configuration for the member assistant
//!
//! Settings merge three layers, lowest priority first: compiled defaults,
//! `config/{env}.toml`, and `MEMBER_ASSIST_*` environment variables.

pub mod agent;
pub mod prompts;
pub mod settings;

pub use agent::AgentConfig;
pub use prompts::{classifier_system_prompt, slot_hint_system_prompt};
pub use settings::{LlmSettings, ServerConfig, Settings, SpeechSettings};

use thiserror::Error;

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Missing required setting: {0}")]
    Missing(String),
}

/// Load settings for the given environment
///
/// Priority: env vars > `config/{env}.toml` > `config/default.toml` >
/// compiled defaults. Missing files are skipped, not errors.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = config::Config::builder()
        .add_source(config::File::with_name("config/default").required(false));

    if let Some(env) = env {
        builder = builder
            .add_source(config::File::with_name(&format!("config/{}", env)).required(false));
    }

    let loaded = builder
        .add_source(config::Environment::with_prefix("MEMBER_ASSIST").separator("__"))
        .build()?;

    let settings: Settings = loaded.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}
