//! Intent classification and slot hints over a chat backend
//!
//! The model is asked for `{"intent": ..., "response": ...}`. Models wrap
//! JSON in code fences often enough that stripping them is part of the
//! contract; anything that still fails to parse is surfaced as an
//! unstructured general-question reply rather than an error.

use async_trait::async_trait;
use serde::Deserialize;

use member_assist_config::prompts;
use member_assist_core::{
    ClassifiedIntent, IntentClassifier, IntentLabel, Result, SlotHintProvider, SlotKind,
};

use crate::backend::ChatBackend;

/// Classifier and slot-hint provider backed by a chat LLM
pub struct LlmIntentClassifier<B: ChatBackend> {
    backend: B,
}

impl<B: ChatBackend> LlmIntentClassifier<B> {
    pub fn new(backend: B) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl<B: ChatBackend> IntentClassifier for LlmIntentClassifier<B> {
    async fn classify(&self, utterance: &str) -> Result<ClassifiedIntent> {
        let raw = self
            .backend
            .chat(&prompts::classifier_system_prompt(), utterance)
            .await
            .map_err(member_assist_core::Error::from)?;

        Ok(parse_classifier_output(&raw))
    }
}

#[async_trait]
impl<B: ChatBackend> SlotHintProvider for LlmIntentClassifier<B> {
    async fn slot_hint(&self, utterance: &str, kind: SlotKind) -> Result<String> {
        let raw = self
            .backend
            .chat(&prompts::slot_hint_system_prompt(kind), utterance)
            .await
            .map_err(member_assist_core::Error::from)?;

        Ok(strip_quotes(raw.trim()).to_string())
    }
}

#[derive(Debug, Deserialize)]
struct ClassifierJson {
    #[serde(default)]
    intent: String,
    #[serde(default)]
    response: String,
}

/// Parse the model's JSON contract, degrading to a general-question reply
pub fn parse_classifier_output(raw: &str) -> ClassifiedIntent {
    let stripped = strip_code_fences(raw.trim());

    match serde_json::from_str::<ClassifierJson>(stripped) {
        Ok(parsed) => {
            let reply = if parsed.response.is_empty() {
                stripped.to_string()
            } else {
                parsed.response
            };
            ClassifiedIntent::new(IntentLabel::parse(&parsed.intent), reply)
        }
        Err(e) => {
            tracing::debug!(error = %e, "Classifier output was not JSON, using raw text");
            ClassifiedIntent::fallback(stripped)
        }
    }
}

/// Strip a surrounding markdown code fence (```json ... ```)
fn strip_code_fences(text: &str) -> &str {
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    // Drop the language tag line, then the closing fence
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.trim_end().trim_end_matches("```").trim()
}

fn strip_quotes(text: &str) -> &str {
    text.trim_start_matches('"').trim_end_matches('"').trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_json_parses() {
        let out = parse_classifier_output(
            r#"{"intent": "update_email", "response": "Sure, what is your new email?"}"#,
        );
        assert_eq!(out.intent, IntentLabel::UpdateEmail);
        assert_eq!(out.reply, "Sure, what is your new email?");
    }

    #[test]
    fn test_fenced_json_parses() {
        let raw = "```json\n{\"intent\": \"adviser_appointment\", \"response\": \"Happy to set that up.\"}\n```";
        let out = parse_classifier_output(raw);
        assert_eq!(out.intent, IntentLabel::AdviserAppointment);
        assert_eq!(out.reply, "Happy to set that up.");
    }

    #[test]
    fn test_non_json_falls_back() {
        let out = parse_classifier_output("I'm afraid I can't answer that in JSON.");
        assert_eq!(out.intent, IntentLabel::GeneralQuestion);
        assert_eq!(out.reply, "I'm afraid I can't answer that in JSON.");
    }

    #[test]
    fn test_missing_intent_degrades_to_general_question() {
        let out = parse_classifier_output(r#"{"response": "Hello there"}"#);
        assert_eq!(out.intent, IntentLabel::GeneralQuestion);
        assert_eq!(out.reply, "Hello there");
    }

    #[test]
    fn test_unknown_intent_preserved() {
        let out = parse_classifier_output(r#"{"intent": "small_talk", "response": "Hi!"}"#);
        assert_eq!(out.intent, IntentLabel::Other("small_talk".to_string()));
    }
}
