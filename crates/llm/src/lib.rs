//! Cloud LLM integration
//!
//! Two thin oracles over an Azure OpenAI chat deployment:
//! - intent classification (`{intent, response}` JSON contract)
//! - slot-value hints (bare normalized value per slot kind)
//!
//! Both degrade gracefully: malformed model output becomes an unstructured
//! reply, never a hard failure.

pub mod backend;
pub mod classifier;

pub use backend::{AzureOpenAiBackend, AzureOpenAiConfig, ChatBackend};
pub use classifier::LlmIntentClassifier;

use thiserror::Error;

/// LLM errors
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("API error: {0}")]
    Api(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Network(format!("request timed out: {}", err))
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for member_assist_core::Error {
    fn from(err: LlmError) -> Self {
        member_assist_core::Error::Llm(err.to_string())
    }
}
