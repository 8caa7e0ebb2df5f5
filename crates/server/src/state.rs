//! Application state
//!
//! Shared state across all handlers. The classifier/hint pair is the cloud
//! LLM when credentials are configured, and the keyword fallback otherwise,
//! so the demo works end to end without any secrets.

use std::sync::Arc;

use parking_lot::RwLock;

use member_assist_agent::Assistant;
use member_assist_config::Settings;
use member_assist_core::{IntentClassifier, SlotHintProvider};
use member_assist_llm::{AzureOpenAiBackend, AzureOpenAiConfig, LlmIntentClassifier};
use member_assist_persistence::{AppointmentLog, CustomerStore};
use member_assist_text_processing::RuleBasedClassifier;

use crate::session::SessionManager;
use crate::speech::CloudSpeechClient;
use crate::ServerError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    /// Configuration (RwLock so a reload endpoint could swap it later)
    pub config: Arc<RwLock<Settings>>,
    /// Session manager
    pub sessions: Arc<SessionManager>,
    /// The singleton customer record
    pub customers: Arc<CustomerStore>,
    /// Confirmed adviser bookings
    pub appointments: Arc<AppointmentLog>,
    /// Intent classifier (cloud LLM or keyword fallback)
    pub classifier: Arc<dyn IntentClassifier>,
    /// Slot-hint provider (same backend as the classifier)
    pub hints: Arc<dyn SlotHintProvider>,
    /// Cloud speech proxy
    pub speech: Arc<CloudSpeechClient>,
}

impl AppState {
    /// Build state from settings, degrading to the keyword classifier when
    /// the LLM is not configured
    pub fn new(config: Settings) -> Result<Self, ServerError> {
        let (classifier, hints) = build_language_backends(&config);

        let speech = CloudSpeechClient::new(config.speech.clone())
            .map_err(|e| ServerError::Internal(e.to_string()))?;
        let max_sessions = config.server.max_sessions;

        Ok(Self {
            config: Arc::new(RwLock::new(config)),
            sessions: Arc::new(SessionManager::new(max_sessions)),
            customers: Arc::new(CustomerStore::new()),
            appointments: Arc::new(AppointmentLog::new()),
            classifier,
            hints,
            speech: Arc::new(speech),
        })
    }

    /// Build a fresh assistant wired to the shared stores
    pub fn new_assistant(&self) -> Assistant {
        let config = self.config.read();
        Assistant::new(
            &config.agent,
            self.classifier.clone(),
            self.hints.clone(),
            self.customers.clone(),
            self.appointments.clone(),
        )
    }
}

fn build_language_backends(
    config: &Settings,
) -> (Arc<dyn IntentClassifier>, Arc<dyn SlotHintProvider>) {
    match AzureOpenAiConfig::from_settings(&config.llm)
        .and_then(AzureOpenAiBackend::new)
        .map(LlmIntentClassifier::new)
    {
        Ok(llm) => {
            tracing::info!(deployment = %config.llm.deployment, "Using cloud LLM classifier");
            let llm = Arc::new(llm);
            let classifier: Arc<dyn IntentClassifier> = llm.clone();
            let hints: Arc<dyn SlotHintProvider> = llm;
            (classifier, hints)
        }
        Err(e) => {
            tracing::warn!(
                error = %e,
                "Cloud LLM not configured, falling back to keyword classifier"
            );
            let rules = Arc::new(RuleBasedClassifier::new());
            let classifier: Arc<dyn IntentClassifier> = rules.clone();
            let hints: Arc<dyn SlotHintProvider> = rules;
            (classifier, hints)
        }
    }
}
