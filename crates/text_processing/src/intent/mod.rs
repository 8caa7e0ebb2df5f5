//! Rule-based intent detection
//!
//! A keyword fallback for when the cloud classifier is not configured (or
//! as a cheap first pass). Order matters: more specific patterns first.

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;

use member_assist_core::{
    ClassifiedIntent, IntentClassifier, IntentLabel, Result, SlotHintProvider, SlotKind,
};

// Intent detection patterns (order matters - more specific first)
static INTENT_PATTERNS: Lazy<Vec<(Regex, IntentLabel)>> = Lazy::new(|| {
    vec![
        (
            Regex::new(r"(?i)(?:new job|chang(?:e|ed|ing) jobs?|start(?:ed|ing)? a new (?:job|role)|new employer|switch(?:ed|ing)? employers?|join(?:ed|ing)? a new company)").unwrap(),
            IntentLabel::ChoiceOfFundForm,
        ),
        (
            Regex::new(r"(?i)(?:update|change|new|modify)\s+(?:my\s+)?address").unwrap(),
            IntentLabel::UpdateAddress,
        ),
        (
            Regex::new(r"(?i)(?:update|change|new|modify)\s+(?:my\s+)?email").unwrap(),
            IntentLabel::UpdateEmail,
        ),
        (
            Regex::new(r"(?i)(?:(?:show|check|what(?:'s| is))\s+(?:my\s+)?balance|superannuation\s+balance|how much (?:super|money)\s+(?:do i have|is in))").unwrap(),
            IntentLabel::SuperannuationBalanceQuery,
        ),
        (
            Regex::new(r"(?i)(?:adviser|advisor|appointment|financial advice|better investment|optimi[sz]e.+(?:fund|super)|grow.+(?:fund|super))").unwrap(),
            IntentLabel::AdviserAppointment,
        ),
    ]
});

/// Detect an intent from keywords alone
pub fn detect_intent(utterance: &str) -> Option<IntentLabel> {
    INTENT_PATTERNS
        .iter()
        .find(|(pattern, _)| pattern.is_match(utterance))
        .map(|(_, label)| label.clone())
}

/// Keyword classifier used when no LLM is configured
///
/// Replies are canned; the hint provider passes the transcript through
/// unchanged and lets the extraction cascade do the work.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleBasedClassifier;

impl RuleBasedClassifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl IntentClassifier for RuleBasedClassifier {
    async fn classify(&self, utterance: &str) -> Result<ClassifiedIntent> {
        let intent = detect_intent(utterance).unwrap_or(IntentLabel::GeneralQuestion);
        let reply = match intent {
            IntentLabel::GeneralQuestion => {
                "You can ask about your balance, update your address or email, \
                 or book time with an adviser."
            }
            _ => "",
        };
        Ok(ClassifiedIntent::new(intent, reply))
    }
}

#[async_trait]
impl SlotHintProvider for RuleBasedClassifier {
    async fn slot_hint(&self, utterance: &str, _kind: SlotKind) -> Result<String> {
        Ok(utterance.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_intents() {
        assert_eq!(
            detect_intent("I want to update my address"),
            Some(IntentLabel::UpdateAddress)
        );
        assert_eq!(
            detect_intent("please change my email"),
            Some(IntentLabel::UpdateEmail)
        );
    }

    #[test]
    fn test_balance_intent() {
        assert_eq!(
            detect_intent("what's my balance?"),
            Some(IntentLabel::SuperannuationBalanceQuery)
        );
        assert_eq!(
            detect_intent("show balance"),
            Some(IntentLabel::SuperannuationBalanceQuery)
        );
    }

    #[test]
    fn test_job_change_beats_other_patterns() {
        // "new job" must win even when the utterance also mentions super
        assert_eq!(
            detect_intent("I'm starting a new job, what happens to my super fund"),
            Some(IntentLabel::ChoiceOfFundForm)
        );
    }

    #[test]
    fn test_unmatched_is_none() {
        assert_eq!(detect_intent("tell me a joke"), None);
    }

    #[tokio::test]
    async fn test_classifier_fallback_reply() {
        let classifier = RuleBasedClassifier::new();
        let out = classifier.classify("tell me a joke").await.unwrap();
        assert_eq!(out.intent, IntentLabel::GeneralQuestion);
        assert!(out.reply.contains("balance"));
    }
}
