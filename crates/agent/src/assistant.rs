//! The assistant driver
//!
//! Wraps the dialogue machine with everything that suspends or touches
//! shared state: the intent classifier, the slot-hint provider, the record
//! store, and the appointment log. Each utterance is handled to completion
//! before the next (the session layer serializes callers), and the
//! classifier/hint calls are the only suspension points.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use member_assist_config::AgentConfig;
use member_assist_core::{
    ClassifiedIntent, ConversationState, DisplayDirective, Effect, IntentClassifier, RecordStore,
    Result, SlotHintProvider,
};
use member_assist_persistence::AppointmentLog;

use crate::machine::{DialogueEvent, DialogueMachine, MachineConfig};

/// Spoken when the classifier itself is unreachable
const CLASSIFIER_DOWN_PROMPT: &str = "I'm sorry, I'm having a little trouble right now. \
     Could you please say that again?";

/// Drives the dialogue machine for one conversation
pub struct Assistant {
    machine: DialogueMachine,
    classifier: Arc<dyn IntentClassifier>,
    hints: Arc<dyn SlotHintProvider>,
    store: Arc<dyn RecordStore>,
    appointments: Arc<AppointmentLog>,
    adviser_name: String,
    fund_offer_delay: Duration,
    /// When the armed fund offer becomes due; superseded when a flow starts
    fund_offer_due_at: Option<Instant>,
}

impl Assistant {
    pub fn new(
        config: &AgentConfig,
        classifier: Arc<dyn IntentClassifier>,
        hints: Arc<dyn SlotHintProvider>,
        store: Arc<dyn RecordStore>,
        appointments: Arc<AppointmentLog>,
    ) -> Self {
        Self {
            machine: DialogueMachine::new(MachineConfig::from(config)),
            classifier,
            hints,
            store,
            appointments,
            adviser_name: config.adviser_name.clone(),
            fund_offer_delay: Duration::from_millis(config.fund_offer_delay_ms),
            fund_offer_due_at: None,
        }
    }

    /// Current conversation state (for session listings)
    pub fn state(&self) -> &ConversationState {
        self.machine.state()
    }

    /// Handle one utterance to completion and return the ordered effects
    pub async fn handle_utterance(&mut self, text: &str) -> Result<Vec<Effect>> {
        self.machine.resolve_completed();

        let event = self.build_event(text).await;
        let effects = self.machine.handle(event);
        self.execute(&effects);
        self.update_deferred_offer();

        Ok(effects)
    }

    /// Fire the deferred fund offer if its delay has elapsed
    ///
    /// Called by the session layer after each exchange (and from its poll
    /// endpoint); returns the offer effects at most once.
    pub fn take_due_fund_offer(&mut self) -> Option<Vec<Effect>> {
        let due_at = self.fund_offer_due_at?;
        if Instant::now() < due_at {
            return None;
        }
        self.fund_offer_due_at = None;
        self.machine.resolve_completed();
        self.machine.begin_deferred_fund_offer()
    }

    /// Seconds until the deferred offer is due, if one is armed
    pub fn fund_offer_due_in(&self) -> Option<Duration> {
        self.fund_offer_due_at
            .map(|due| due.saturating_duration_since(Instant::now()))
    }

    /// Sub-flow priority: a non-idle machine handles the utterance locally;
    /// only an idle machine consults the classifier.
    async fn build_event(&self, text: &str) -> DialogueEvent {
        match self.machine.state() {
            ConversationState::AwaitingNewValue { kind } => {
                let hint = match self.hints.slot_hint(text, *kind).await {
                    Ok(hint) => hint,
                    Err(e) => {
                        warn!(error = %e, "Slot hint call failed, extracting from transcript only");
                        String::new()
                    }
                };
                DialogueEvent::SlotInput {
                    transcript: text.to_string(),
                    hint,
                }
            }
            state if state.in_sub_flow() => DialogueEvent::Utterance {
                text: text.to_string(),
            },
            _ => {
                let classified = match self.classifier.classify(text).await {
                    Ok(classified) => classified,
                    Err(e) => {
                        warn!(error = %e, "Classifier call failed, degrading to apology");
                        ClassifiedIntent::fallback(CLASSIFIER_DOWN_PROMPT)
                    }
                };
                debug!(intent = %classified.intent, "Utterance classified");
                DialogueEvent::Classified {
                    utterance: text.to_string(),
                    intent: classified.intent,
                    reply: classified.reply,
                }
            }
        }
    }

    /// Apply record updates and log confirmed bookings
    fn execute(&self, effects: &[Effect]) {
        for effect in effects {
            match effect {
                Effect::UpdateRecord { patch } => {
                    self.store.update(patch);
                }
                Effect::Display {
                    directive: DisplayDirective::AppointmentSummary { slot, .. },
                } => {
                    self.appointments.book(*slot, self.adviser_name.clone());
                }
                _ => {}
            }
        }
    }

    /// Arm, keep, or supersede the deferred fund-offer timer
    fn update_deferred_offer(&mut self) {
        let state = self.machine.state();
        if state.in_sub_flow() && !state.is_terminal() {
            // A live flow supersedes the scheduled offer
            self.fund_offer_due_at = None;
        } else if self.machine.fund_offer_armed() && self.fund_offer_due_at.is_none() {
            debug!(delay_ms = self.fund_offer_delay.as_millis() as u64,
                   "Scheduling deferred fund offer");
            self.fund_offer_due_at = Some(Instant::now() + self.fund_offer_delay);
        } else if !self.machine.fund_offer_armed() {
            self.fund_offer_due_at = None;
        }
    }
}
