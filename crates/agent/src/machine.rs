//! The dialogue state machine
//!
//! A synchronous reducer over [`DialogueEvent`]s. The driver picks the
//! event kind from the current state (sub-flow priority: a non-idle state
//! never routes through the intent classifier), feeds it in, and executes
//! the returned effects. The machine itself performs no I/O.

use tracing::debug;

use member_assist_core::{
    AdviserSlot, ConversationState, DisplayDirective, Effect, IntentLabel, PendingUpdate,
    RecordPatch, SlotKind,
};
use member_assist_config::AgentConfig;
use member_assist_text_processing::{
    is_affirmative, is_negative, mentions_job_change, SlotExtractor,
};

use crate::otp;

/// Events fed to the reducer
#[derive(Debug, Clone)]
pub enum DialogueEvent {
    /// An idle-state utterance with its classification
    Classified {
        utterance: String,
        intent: IntentLabel,
        reply: String,
    },
    /// The answer to a "what is your new {slot}?" prompt, with the LLM hint
    SlotInput { transcript: String, hint: String },
    /// Any other in-flow utterance (OTP entry, yes/no, slot choice)
    Utterance { text: String },
}

impl DialogueEvent {
    fn text(&self) -> &str {
        match self {
            DialogueEvent::Classified { utterance, .. } => utterance,
            DialogueEvent::SlotInput { transcript, .. } => transcript,
            DialogueEvent::Utterance { text } => text,
        }
    }
}

/// Machine knobs derived from [`AgentConfig`]
#[derive(Debug, Clone)]
pub struct MachineConfig {
    /// Failed OTP entries allowed before cancelling; 0 disables the bound
    pub otp_max_attempts: u32,
    /// Adviser named in appointment summaries
    pub adviser_name: String,
    /// Log generated codes at debug level (demo only, no delivery channel)
    pub reveal_otp_in_logs: bool,
}

impl From<&AgentConfig> for MachineConfig {
    fn from(config: &AgentConfig) -> Self {
        Self {
            otp_max_attempts: config.otp_max_attempts,
            adviser_name: config.adviser_name.clone(),
            reveal_otp_in_logs: config.reveal_otp_in_logs,
        }
    }
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self::from(&AgentConfig::default())
    }
}

/// The multi-turn dialogue state machine
pub struct DialogueMachine {
    state: ConversationState,
    config: MachineConfig,
    extractor: SlotExtractor,
    /// Job-change heard mid-flow; the driver turns this into a delayed
    /// fund offer once the machine is idle again
    fund_offer_armed: bool,
}

impl DialogueMachine {
    pub fn new(config: MachineConfig) -> Self {
        Self {
            state: ConversationState::Idle,
            config,
            extractor: SlotExtractor::new(),
            fund_offer_armed: false,
        }
    }

    /// Current conversation state
    pub fn state(&self) -> &ConversationState {
        &self.state
    }

    /// Whether a job-change mention is waiting to become a fund offer
    pub fn fund_offer_armed(&self) -> bool {
        self.fund_offer_armed
    }

    /// Collapse a completed flow back to idle
    ///
    /// `AdviserConfirmed`/`FundConfirmed` stay observable for one turn
    /// (session listings show them) and resolve to `Idle` the next time
    /// the driver routes an utterance.
    pub fn resolve_completed(&mut self) {
        if matches!(
            self.state,
            ConversationState::AdviserConfirmed { .. } | ConversationState::FundConfirmed
        ) {
            self.state = ConversationState::Idle;
        }
    }

    /// Reset everything (explicit cancellation or session restart)
    pub fn reset(&mut self) {
        self.state = ConversationState::Idle;
        self.fund_offer_armed = false;
    }

    /// Process one event and return the ordered side effects
    pub fn handle(&mut self, event: DialogueEvent) -> Vec<Effect> {
        // A job/employer change heard mid-flow arms the deferred offer.
        // Hearing it while idle routes through the classifier instead.
        if self.state.in_sub_flow() && mentions_job_change(event.text()) {
            debug!("Job change mentioned mid-flow, arming deferred fund offer");
            self.fund_offer_armed = true;
        }

        let effects = match (self.state.clone(), event) {
            (ConversationState::Idle, DialogueEvent::Classified { intent, reply, .. }) => {
                self.handle_classified(intent, reply)
            }
            (
                ConversationState::AwaitingNewValue { kind },
                DialogueEvent::SlotInput { transcript, hint },
            ) => self.handle_slot_input(kind, &transcript, &hint),
            (ConversationState::AwaitingOtp { pending }, DialogueEvent::Utterance { text }) => {
                self.handle_otp_entry(pending, &text)
            }
            (ConversationState::AdviserConfirm, DialogueEvent::Utterance { text }) => {
                self.handle_adviser_confirm(&text)
            }
            (ConversationState::AdviserPickSlot, DialogueEvent::Utterance { text }) => {
                self.handle_adviser_pick(&text)
            }
            (ConversationState::FundOffer, DialogueEvent::Utterance { text }) => {
                self.handle_fund_offer(&text)
            }
            (state, _event) => {
                debug!(state = %state, "Event does not apply to current state, ignoring");
                Vec::new()
            }
        };

        // Starting (or finishing inside) any flow supersedes a pending
        // deferred offer; it only survives a flow it was armed during.
        if matches!(self.state, ConversationState::FundOffer | ConversationState::FundConfirmed) {
            self.fund_offer_armed = false;
        }

        effects
    }

    /// Enter the fund offer via the deferred trigger
    ///
    /// Returns `None` when the machine is no longer idle (the arm was
    /// superseded by another flow).
    pub fn begin_deferred_fund_offer(&mut self) -> Option<Vec<Effect>> {
        if !matches!(self.state, ConversationState::Idle) || !self.fund_offer_armed {
            return None;
        }
        self.fund_offer_armed = false;
        self.state = ConversationState::FundOffer;
        Some(vec![Effect::speak(FUND_OFFER_PROMPT)])
    }

    // ====== Idle: branch on the classified intent ======

    fn handle_classified(&mut self, intent: IntentLabel, reply: String) -> Vec<Effect> {
        match intent {
            IntentLabel::UpdateAddress => self.enter_slot_flow(SlotKind::Address),
            IntentLabel::UpdateEmail => self.enter_slot_flow(SlotKind::Email),
            IntentLabel::SuperannuationBalanceQuery => {
                let prompt = if reply.trim().is_empty() {
                    BALANCE_PROMPT.to_string()
                } else {
                    reply
                };
                vec![
                    Effect::speak(prompt),
                    Effect::display(DisplayDirective::Balance),
                ]
            }
            IntentLabel::AdviserAppointment => {
                self.fund_offer_armed = false;
                self.state = ConversationState::AdviserConfirm;
                vec![Effect::speak(ADVISER_CONFIRM_PROMPT)]
            }
            IntentLabel::ChoiceOfFundForm => {
                self.state = ConversationState::FundOffer;
                vec![Effect::speak(FUND_OFFER_PROMPT)]
            }
            IntentLabel::GeneralQuestion | IntentLabel::Other(_) => {
                let prompt = if reply.trim().is_empty() {
                    UNRECOGNIZED_PROMPT.to_string()
                } else {
                    reply
                };
                vec![Effect::speak(prompt)]
            }
        }
    }

    fn enter_slot_flow(&mut self, kind: SlotKind) -> Vec<Effect> {
        self.fund_offer_armed = false;
        self.state = ConversationState::AwaitingNewValue { kind };
        vec![Effect::speak(format!(
            "Sure, I can update your {}. What is your new {}?",
            kind.display_name(),
            kind.display_name()
        ))]
    }

    // ====== AwaitingNewValue: extract, then challenge ======

    fn handle_slot_input(&mut self, kind: SlotKind, transcript: &str, hint: &str) -> Vec<Effect> {
        if is_negative(transcript) && !is_affirmative(transcript) {
            return self.cancel_flow();
        }

        match self.extractor.extract(kind, transcript, hint) {
            Ok(value) => {
                let code = otp::generate();
                if self.config.reveal_otp_in_logs {
                    debug!(code = %code, "Generated verification code");
                }
                self.state = ConversationState::AwaitingOtp {
                    pending: PendingUpdate::new(kind, value, code),
                };
                vec![
                    Effect::speak(format!(
                        "Thanks. To verify it's you, I've sent a 6-digit code to your \
                         registered mobile. Please read out the code to confirm your new {}.",
                        kind.display_name()
                    )),
                    Effect::display(DisplayDirective::OtpChallenge),
                ]
            }
            Err(err) => {
                debug!(slot = %kind, error = %err, "Slot extraction failed, re-prompting");
                vec![Effect::speak(err.guidance(kind))]
            }
        }
    }

    // ====== AwaitingOtp: strip, compare, apply or retry ======

    fn handle_otp_entry(&mut self, mut pending: PendingUpdate, text: &str) -> Vec<Effect> {
        let has_digits = text.chars().any(|c| c.is_ascii_digit());
        if !has_digits && is_negative(text) {
            return self.cancel_flow();
        }

        if otp::verify(text, &pending.otp_code) {
            let patch = match pending.slot_kind {
                SlotKind::Address => RecordPatch::address(pending.candidate_value.clone()),
                SlotKind::Email => RecordPatch::email(pending.candidate_value.clone()),
            };
            self.state = ConversationState::Idle;
            return vec![
                Effect::update(patch),
                Effect::speak(format!(
                    "Thank you, that matches. I've updated your {} to {}. \
                     Here are your personal details.",
                    pending.slot_kind.display_name(),
                    pending.candidate_value
                )),
                Effect::display(DisplayDirective::PersonalDetails),
            ];
        }

        pending.attempts += 1;
        let max = self.config.otp_max_attempts;
        if max > 0 && pending.attempts >= max {
            debug!(attempts = pending.attempts, "OTP attempts exhausted, cancelling update");
            self.state = ConversationState::Idle;
            return vec![Effect::speak(
                "That code doesn't match, and you've reached the maximum number of \
                 attempts. I've cancelled the update for now, but you can start again \
                 whenever you're ready.",
            )];
        }

        self.state = ConversationState::AwaitingOtp { pending };
        vec![Effect::speak(
            "That code doesn't look right. Please try reading out the 6 digits again.",
        )]
    }

    // ====== Adviser scheduling sub-flow ======

    fn handle_adviser_confirm(&mut self, text: &str) -> Vec<Effect> {
        if is_negative(text) {
            return self.decline_flow("No problem. Let me know if you'd like advice another time.");
        }
        if is_affirmative(text) {
            self.state = ConversationState::AdviserPickSlot;
            let slots: Vec<String> = AdviserSlot::ALL.iter().map(|s| s.label().to_string()).collect();
            return vec![
                Effect::speak(format!(
                    "Great. I have these times available with a CFS Adviser: {}. \
                     Which one works best for you?",
                    slots.join(", ")
                )),
                Effect::display(DisplayDirective::SlotPicker { slots }),
            ];
        }
        vec![Effect::speak(
            "Just to confirm, would you like me to book an appointment with a \
             CFS Adviser? Please say yes or no.",
        )]
    }

    fn handle_adviser_pick(&mut self, text: &str) -> Vec<Effect> {
        if is_negative(text) && AdviserSlot::from_utterance(text).is_none() {
            return self.decline_flow("No problem, I won't book anything for now.");
        }

        match AdviserSlot::from_utterance(text) {
            Some(slot) => {
                self.state = ConversationState::AdviserConfirmed { slot };
                vec![
                    Effect::speak(format!(
                        "You're all set. Your appointment with {} is confirmed for {}. \
                         You'll receive a calendar invite shortly.",
                        self.config.adviser_name,
                        slot.label()
                    )),
                    Effect::display(DisplayDirective::AppointmentSummary {
                        slot,
                        adviser_name: self.config.adviser_name.clone(),
                    }),
                ]
            }
            None => {
                let slots: Vec<String> =
                    AdviserSlot::ALL.iter().map(|s| s.label().to_string()).collect();
                vec![Effect::speak(format!(
                    "Sorry, I didn't catch a time that's available. The options are {}.",
                    slots.join(", ")
                ))]
            }
        }
    }

    // ====== Choice-of-fund offer sub-flow ======

    fn handle_fund_offer(&mut self, text: &str) -> Vec<Effect> {
        if is_negative(text) {
            return self.decline_flow(
                "No worries. If you change your mind, just ask about the Choice of Fund form.",
            );
        }
        if is_affirmative(text) {
            self.state = ConversationState::FundConfirmed;
            return vec![
                Effect::speak(
                    "Here is your pre-filled Choice of Fund form. A copy has been \
                     sent to your email to pass on to your new employer.",
                ),
                Effect::display(DisplayDirective::FundForm),
            ];
        }
        vec![Effect::speak(
            "Would you like me to pre-fill the Choice of Fund form for your new \
             employer? Please say yes or no.",
        )]
    }

    // ====== Shared transitions ======

    fn cancel_flow(&mut self) -> Vec<Effect> {
        debug!(state = %self.state, "Flow cancelled by user");
        self.state = ConversationState::Idle;
        vec![Effect::speak(
            "Okay, I've cancelled that. Is there anything else I can help you with?",
        )]
    }

    fn decline_flow(&mut self, ack: &str) -> Vec<Effect> {
        self.state = ConversationState::Idle;
        vec![Effect::speak(ack)]
    }
}

const BALANCE_PROMPT: &str = "Here is your current superannuation balance.";

const ADVISER_CONFIRM_PROMPT: &str = "I can set up an appointment with a CFS Adviser to \
     talk through your options. Would you like to proceed?";

const FUND_OFFER_PROMPT: &str = "Since you're moving to a new employer, I can pre-fill a \
     Choice of Fund form for you to give them, so your super keeps coming to your \
     current fund. Would you like me to do that?";

const UNRECOGNIZED_PROMPT: &str = "I'm sorry, I didn't quite catch that. You can ask about \
     your balance, update your address or email, or book time with an adviser.";
