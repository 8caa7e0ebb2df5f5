//! Intent labels returned by the classifier
//!
//! The classifier is an oracle: free-form utterance in, `{intent, reply}`
//! out. Labels the dialogue machine does not recognize fall through to the
//! classifier's own natural-language reply.

use serde::{Deserialize, Serialize};

/// Discrete intent assigned to a user utterance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentLabel {
    /// Asking about the superannuation fund balance
    SuperannuationBalanceQuery,
    /// Wants to update or change their address
    UpdateAddress,
    /// Wants to update or change their email
    UpdateEmail,
    /// Wants advice / better investment options / fund optimization
    AdviserAppointment,
    /// Mentioned changing jobs or moving to another employer
    ChoiceOfFundForm,
    /// Anything else the classifier answered directly
    GeneralQuestion,
    /// A label this service does not branch on
    #[serde(untagged)]
    Other(String),
}

impl IntentLabel {
    /// Parse a classifier label string
    pub fn parse(label: &str) -> Self {
        match label.trim() {
            "superannuation_balance_query" => IntentLabel::SuperannuationBalanceQuery,
            "update_address" => IntentLabel::UpdateAddress,
            "update_email" => IntentLabel::UpdateEmail,
            "adviser_appointment" => IntentLabel::AdviserAppointment,
            "choice_of_fund_form" => IntentLabel::ChoiceOfFundForm,
            "general_question" | "" => IntentLabel::GeneralQuestion,
            other => IntentLabel::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            IntentLabel::SuperannuationBalanceQuery => "superannuation_balance_query",
            IntentLabel::UpdateAddress => "update_address",
            IntentLabel::UpdateEmail => "update_email",
            IntentLabel::AdviserAppointment => "adviser_appointment",
            IntentLabel::ChoiceOfFundForm => "choice_of_fund_form",
            IntentLabel::GeneralQuestion => "general_question",
            IntentLabel::Other(s) => s.as_str(),
        }
    }
}

impl std::fmt::Display for IntentLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Classifier output: the label plus the natural-language reply
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassifiedIntent {
    pub intent: IntentLabel,
    /// The classifier's own reply, surfaced verbatim for unrecognized intents
    pub reply: String,
}

impl ClassifiedIntent {
    pub fn new(intent: IntentLabel, reply: impl Into<String>) -> Self {
        Self {
            intent,
            reply: reply.into(),
        }
    }

    /// Fallback used when the classifier output is not parseable JSON:
    /// the raw text becomes the reply and the label degrades to a
    /// general question.
    pub fn fallback(raw_reply: impl Into<String>) -> Self {
        Self {
            intent: IntentLabel::GeneralQuestion,
            reply: raw_reply.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_labels_parse() {
        assert_eq!(
            IntentLabel::parse("update_email"),
            IntentLabel::UpdateEmail
        );
        assert_eq!(
            IntentLabel::parse("superannuation_balance_query"),
            IntentLabel::SuperannuationBalanceQuery
        );
    }

    #[test]
    fn test_unknown_label_preserved() {
        let label = IntentLabel::parse("joke_request");
        assert_eq!(label, IntentLabel::Other("joke_request".to_string()));
        assert_eq!(label.as_str(), "joke_request");
    }

    #[test]
    fn test_empty_label_is_general_question() {
        assert_eq!(IntentLabel::parse(""), IntentLabel::GeneralQuestion);
    }

    #[test]
    fn test_fallback_keeps_raw_text() {
        let classified = ClassifiedIntent::fallback("plain text answer");
        assert_eq!(classified.intent, IntentLabel::GeneralQuestion);
        assert_eq!(classified.reply, "plain text answer");
    }
}
