//! Core traits and types for the member assistant
//!
//! This crate provides foundational types used across all other crates:
//! - Conversation state and the slot/effect vocabulary of the dialogue machine
//! - Customer record types held by the record store
//! - Intent labels returned by the classifier
//! - Core traits for pluggable backends (intent classification, slot hints,
//!   record storage, speech)
//! - Error types

pub mod customer;
pub mod effect;
pub mod error;
pub mod intent;
pub mod state;
pub mod traits;

pub use customer::{Balance, CustomerRecord, RecordPatch};
pub use effect::{DisplayDirective, Effect};
pub use error::{Error, Result};
pub use intent::{ClassifiedIntent, IntentLabel};
pub use state::{AdviserSlot, ConversationState, PendingUpdate, SlotKind};
pub use traits::{
    IntentClassifier, RecordStore, SlotHintProvider, SpeechRecognizer, SpeechSynthesizer,
};
