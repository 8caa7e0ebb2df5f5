//! Side effects produced by the dialogue machine
//!
//! The reducer never performs I/O; it returns an ordered effect list that
//! the driver executes (speak the prompt, apply the record patch, tell the
//! client what to render).

use serde::{Deserialize, Serialize};

use crate::customer::RecordPatch;
use crate::state::AdviserSlot;

/// UI card or widget the client should render
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DisplayDirective {
    /// Superannuation balance card
    Balance,
    /// Personal details card (shown after a verified update)
    PersonalDetails,
    /// One-time code entry keypad
    OtpChallenge,
    /// Adviser time-slot picker
    SlotPicker { slots: Vec<String> },
    /// Confirmed appointment summary
    AppointmentSummary {
        slot: AdviserSlot,
        adviser_name: String,
    },
    /// Pre-filled choice-of-fund form
    FundForm,
}

/// One ordered side effect
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Effect {
    /// Prompt to speak (and show) to the user
    Speak { text: String },
    /// Merge the patch into the customer record
    UpdateRecord { patch: RecordPatch },
    /// Render directive for the client
    Display { directive: DisplayDirective },
}

impl Effect {
    /// Create a speak effect
    pub fn speak(text: impl Into<String>) -> Self {
        Effect::Speak { text: text.into() }
    }

    /// Create a record-update effect
    pub fn update(patch: RecordPatch) -> Self {
        Effect::UpdateRecord { patch }
    }

    /// Create a display effect
    pub fn display(directive: DisplayDirective) -> Self {
        Effect::Display { directive }
    }

    /// The spoken text, if this is a speak effect
    pub fn spoken_text(&self) -> Option<&str> {
        match self {
            Effect::Speak { text } => Some(text),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speak_constructor() {
        let effect = Effect::speak("Hello!");
        assert_eq!(effect.spoken_text(), Some("Hello!"));
    }

    #[test]
    fn test_effect_serialization() {
        let effect = Effect::display(DisplayDirective::Balance);
        let json = serde_json::to_string(&effect).unwrap();
        assert!(json.contains("\"display\""));
        assert!(json.contains("\"balance\""));
    }
}
