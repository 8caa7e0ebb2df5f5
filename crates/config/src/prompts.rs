//! Prompt templates for the cloud LLM
//!
//! The classifier is instructed to answer in JSON with `intent` and
//! `response` fields; the slot-hint prompts ask for the bare value only.

/// System prompt for intent classification
pub fn classifier_system_prompt() -> String {
    "You are a helpful assistant for Colonial First State. For every user \
     message, respond in JSON with two fields:\n\
     - intent: a short string describing the user's intent (e.g., \
     'superannuation_balance_query', 'update_address', 'update_email', \
     'adviser_appointment', 'choice_of_fund_form', 'general_question', etc.)\n\
     - response: your natural language reply to the user.\n\n\
     Intent rules:\n\
     - If the user asks about their superannuation fund balance, set intent \
     to 'superannuation_balance_query'.\n\
     - If the user wants to update or change their address, set intent to \
     'update_address'.\n\
     - If the user wants to update or change their email, set intent to \
     'update_email'.\n\
     - If the user wants to optimize, grow, or get advice about their fund, \
     or asks about better investment options, set intent to \
     'adviser_appointment'.\n\
     - If the user mentions changing jobs, starting a new job, or moving to \
     another employer, set intent to 'choice_of_fund_form'.\n\n\
     For 'adviser_appointment' intent:\n\
     - Guide the user through setting up an appointment with a CFS Adviser.\n\
     - First, confirm if they want to proceed.\n\
     - If yes, offer a few available time slots (e.g., 'Monday 10am', \
     'Tuesday 2pm', 'Friday 11am').\n\
     - Once a slot is chosen, confirm the appointment and provide a summary.\n\n\
     For 'choice_of_fund_form' intent:\n\
     - ONLY trigger this intent if the user mentions changing jobs, starting \
     a new job, or moving to another employer.\n\
     - Proactively offer to pre-fill a Choice of Fund form for the user to \
     submit to their new employer.\n\n\
     Use natural, conversational language. Always respond in JSON with \
     'intent' and 'response'."
        .to_string()
}

/// System prompt for extracting a slot value from a transcript
pub fn slot_hint_system_prompt(slot: member_assist_core::SlotKind) -> String {
    match slot {
        member_assist_core::SlotKind::Address => {
            "Extract only the address from the following user message. \
             Return only the address as plain text, nothing else."
                .to_string()
        }
        member_assist_core::SlotKind::Email => {
            "Extract only the email address from the following user message. \
             If the email is spoken (e.g., 'john dot doe at gmail dot com'), \
             convert it to a valid email address (e.g., 'john.doe@gmail.com'). \
             Return only the email address as plain text, nothing else."
                .to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use member_assist_core::SlotKind;

    #[test]
    fn test_classifier_prompt_mentions_all_intents() {
        let prompt = classifier_system_prompt();
        for label in [
            "superannuation_balance_query",
            "update_address",
            "update_email",
            "adviser_appointment",
            "choice_of_fund_form",
        ] {
            assert!(prompt.contains(label), "missing {label}");
        }
    }

    #[test]
    fn test_email_prompt_shows_spoken_form() {
        let prompt = slot_hint_system_prompt(SlotKind::Email);
        assert!(prompt.contains("john dot doe at gmail dot com"));
    }
}
