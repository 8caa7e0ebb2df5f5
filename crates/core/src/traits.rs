//! Traits for pluggable backends
//!
//! The dialogue machine itself is pure; everything that suspends (LLM calls,
//! speech services) or holds shared state (the record store) sits behind one
//! of these traits so tests can swap in mocks.

use async_trait::async_trait;

use crate::customer::{CustomerRecord, RecordPatch};
use crate::error::Result;
use crate::intent::ClassifiedIntent;
use crate::state::SlotKind;

/// Maps a free-form utterance to an intent label plus a reply
///
/// Implementations call the cloud LLM; on transport or parse failure they
/// degrade to [`ClassifiedIntent::fallback`] rather than erroring the
/// conversation, except for hard transport failures which the driver
/// handles with a generic apology.
#[async_trait]
pub trait IntentClassifier: Send + Sync {
    async fn classify(&self, utterance: &str) -> Result<ClassifiedIntent>;
}

/// Produces the LLM-normalized candidate for a slot value
///
/// The returned hint is advisory; the local extraction cascade decides the
/// final value.
#[async_trait]
pub trait SlotHintProvider: Send + Sync {
    async fn slot_hint(&self, utterance: &str, kind: SlotKind) -> Result<String>;
}

/// Owns the singleton customer record
///
/// All mutation flows through [`RecordStore::update`] so there is a single
/// writer path regardless of whether the change came from the verified
/// dialogue flow or the REST endpoint.
pub trait RecordStore: Send + Sync {
    /// Snapshot of the current record
    fn get(&self) -> CustomerRecord;

    /// Merge the patch and return the updated record
    fn update(&self, patch: &RecordPatch) -> CustomerRecord;
}

/// Text-to-speech backend
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Synthesize speech; returns encoded audio bytes (MP3)
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>>;
}

/// Speech-to-text backend
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Recognize speech from encoded audio bytes; returns the transcript
    async fn recognize(&self, audio: &[u8]) -> Result<String>;
}
