//! Conversation state for the dialogue machine
//!
//! The conversation is a single tagged union: exactly one state is active at
//! a time, it is mutated only by the dialogue machine, and it is never
//! persisted. Replaces the scattered step counters and booleans the UI
//! prototype kept in component fields.

use serde::{Deserialize, Serialize};

/// A slot the dialogue collects from the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotKind {
    /// Postal address, free-form, not locally validated
    Address,
    /// Email address, reconstructed from spoken text when needed
    Email,
}

impl SlotKind {
    /// Spoken name used in prompts ("What is your new {kind}?")
    pub fn display_name(&self) -> &'static str {
        match self {
            SlotKind::Address => "address",
            SlotKind::Email => "email address",
        }
    }

    /// Wire name used by the slot-fill API
    pub fn as_str(&self) -> &'static str {
        match self {
            SlotKind::Address => "address",
            SlotKind::Email => "email",
        }
    }

    /// Parse a wire name ("address" / "email")
    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "address" => Some(SlotKind::Address),
            "email" => Some(SlotKind::Email),
            _ => None,
        }
    }
}

impl std::fmt::Display for SlotKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A value accepted from the user but not yet applied to the record
///
/// Created when slot extraction succeeds, destroyed on a successful OTP
/// match (applied) or on flow cancellation. Invariant: never applied to the
/// customer record without a matching OTP comparison first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingUpdate {
    /// Which slot the value belongs to
    pub slot_kind: SlotKind,
    /// The extracted, normalized value
    pub candidate_value: String,
    /// The 6-digit code the user must read back
    pub otp_code: String,
    /// Failed verification attempts so far
    #[serde(default)]
    pub attempts: u32,
}

impl PendingUpdate {
    pub fn new(
        slot_kind: SlotKind,
        candidate_value: impl Into<String>,
        otp_code: impl Into<String>,
    ) -> Self {
        Self {
            slot_kind,
            candidate_value: candidate_value.into(),
            otp_code: otp_code.into(),
            attempts: 0,
        }
    }
}

/// A bookable adviser time slot
///
/// The set is fixed; a selected slot is immutable once confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdviserSlot {
    Monday10am,
    Tuesday2pm,
    Friday11am,
}

impl AdviserSlot {
    /// All bookable slots, in the order they are offered
    pub const ALL: [AdviserSlot; 3] = [
        AdviserSlot::Monday10am,
        AdviserSlot::Tuesday2pm,
        AdviserSlot::Friday11am,
    ];

    /// Human-readable label offered to the user
    pub fn label(&self) -> &'static str {
        match self {
            AdviserSlot::Monday10am => "Monday 10am",
            AdviserSlot::Tuesday2pm => "Tuesday 2pm",
            AdviserSlot::Friday11am => "Friday 11am",
        }
    }

    /// Match a free-form utterance against this slot (day or time substring)
    pub fn matches_utterance(&self, utterance: &str) -> bool {
        let lower = utterance.to_lowercase();
        let (day, time) = match self {
            AdviserSlot::Monday10am => ("monday", "10"),
            AdviserSlot::Tuesday2pm => ("tuesday", "2pm"),
            AdviserSlot::Friday11am => ("friday", "11"),
        };
        lower.contains(day) || lower.contains(time)
    }

    /// Find the first slot the utterance refers to
    pub fn from_utterance(utterance: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|s| s.matches_utterance(utterance))
    }
}

impl std::fmt::Display for AdviserSlot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Conversation state across turns
///
/// Lifecycle: created as `Idle` at session start, reset to `Idle` on
/// completion of any flow or explicit cancellation. At most one sub-flow
/// (OTP wait, adviser scheduling, fund offer) is active at a time; the
/// tagged union makes that structural.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ConversationState {
    /// No flow active; utterances route through the intent classifier
    #[default]
    Idle,
    /// Waiting for the user to speak the new slot value
    AwaitingNewValue { kind: SlotKind },
    /// Value accepted; waiting for the one-time code to be read back
    AwaitingOtp { pending: PendingUpdate },
    /// Offered an adviser appointment; waiting for yes/no
    AdviserConfirm,
    /// User accepted; waiting for a slot choice
    AdviserPickSlot,
    /// Appointment locked in
    AdviserConfirmed { slot: AdviserSlot },
    /// Offered the choice-of-fund form; waiting for yes/no
    FundOffer,
    /// Form accepted and sent
    FundConfirmed,
}

impl ConversationState {
    /// Whether any sub-flow is active (anything but `Idle`)
    pub fn in_sub_flow(&self) -> bool {
        !matches!(self, ConversationState::Idle)
    }

    /// Whether this is a completed flow waiting to collapse back to idle
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ConversationState::AdviserConfirmed { .. } | ConversationState::FundConfirmed
        )
    }

    /// Short name for logs and session listings
    pub fn name(&self) -> &'static str {
        match self {
            ConversationState::Idle => "idle",
            ConversationState::AwaitingNewValue { .. } => "awaiting_new_value",
            ConversationState::AwaitingOtp { .. } => "awaiting_otp",
            ConversationState::AdviserConfirm => "adviser_confirm",
            ConversationState::AdviserPickSlot => "adviser_pick_slot",
            ConversationState::AdviserConfirmed { .. } => "adviser_confirmed",
            ConversationState::FundOffer => "fund_offer",
            ConversationState::FundConfirmed => "fund_confirmed",
        }
    }
}

impl std::fmt::Display for ConversationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_kind_roundtrip() {
        assert_eq!(SlotKind::from_str("email"), Some(SlotKind::Email));
        assert_eq!(SlotKind::from_str(" Address "), Some(SlotKind::Address));
        assert_eq!(SlotKind::from_str("phone"), None);
        assert_eq!(SlotKind::Email.as_str(), "email");
    }

    #[test]
    fn test_adviser_slot_matching() {
        assert_eq!(
            AdviserSlot::from_utterance("Monday works for me"),
            Some(AdviserSlot::Monday10am)
        );
        assert_eq!(
            AdviserSlot::from_utterance("let's do 2pm"),
            Some(AdviserSlot::Tuesday2pm)
        );
        assert_eq!(
            AdviserSlot::from_utterance("friday please"),
            Some(AdviserSlot::Friday11am)
        );
        assert_eq!(AdviserSlot::from_utterance("next year sometime"), None);
    }

    #[test]
    fn test_default_state_is_idle() {
        let state = ConversationState::default();
        assert_eq!(state, ConversationState::Idle);
        assert!(!state.in_sub_flow());
    }

    #[test]
    fn test_state_names() {
        let state = ConversationState::AwaitingNewValue { kind: SlotKind::Email };
        assert_eq!(state.name(), "awaiting_new_value");
        assert!(state.in_sub_flow());
    }
}
