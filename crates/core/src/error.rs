//! Crate-wide error type

use thiserror::Error;

/// Errors surfaced across the assistant crates
#[derive(Debug, Error)]
pub enum Error {
    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Slot extraction failed: {0}")]
    SlotExtraction(String),

    #[error("Speech service error: {0}")]
    Speech(String),

    #[error("Record store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;
