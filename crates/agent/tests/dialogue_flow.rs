//! Integration tests for the dialogue driver
//!
//! Drive the assistant end to end with a scripted classifier and verify the
//! record store only changes when the OTP flow completes.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use member_assist_agent::Assistant;
use member_assist_config::AgentConfig;
use member_assist_core::{
    ClassifiedIntent, ConversationState, DisplayDirective, Effect, IntentClassifier, IntentLabel,
    Result, RecordStore, SlotHintProvider, SlotKind,
};
use member_assist_persistence::{AppointmentLog, CustomerStore};

/// Classifier that maps fixed utterances to fixed intents
struct ScriptedClassifier;

#[async_trait]
impl IntentClassifier for ScriptedClassifier {
    async fn classify(&self, utterance: &str) -> Result<ClassifiedIntent> {
        let lower = utterance.to_lowercase();
        let intent = if lower.contains("email") {
            IntentLabel::UpdateEmail
        } else if lower.contains("address") {
            IntentLabel::UpdateAddress
        } else if lower.contains("balance") {
            IntentLabel::SuperannuationBalanceQuery
        } else if lower.contains("adviser") {
            IntentLabel::AdviserAppointment
        } else if lower.contains("new job") {
            IntentLabel::ChoiceOfFundForm
        } else {
            IntentLabel::GeneralQuestion
        };
        Ok(ClassifiedIntent::new(intent, "How can I help?"))
    }
}

/// Hint provider that echoes the transcript (extraction cascade does the work)
struct EchoHints;

#[async_trait]
impl SlotHintProvider for EchoHints {
    async fn slot_hint(&self, utterance: &str, _kind: SlotKind) -> Result<String> {
        Ok(utterance.to_string())
    }
}

/// Classifier that always fails at the transport layer
struct BrokenClassifier;

#[async_trait]
impl IntentClassifier for BrokenClassifier {
    async fn classify(&self, _utterance: &str) -> Result<ClassifiedIntent> {
        Err(member_assist_core::Error::Llm("connection refused".to_string()))
    }
}

fn build_assistant(store: Arc<CustomerStore>) -> Assistant {
    build_assistant_with_config(store, AgentConfig::default())
}

fn build_assistant_with_config(store: Arc<CustomerStore>, config: AgentConfig) -> Assistant {
    Assistant::new(
        &config,
        Arc::new(ScriptedClassifier),
        Arc::new(EchoHints),
        store,
        Arc::new(AppointmentLog::new()),
    )
}

fn otp_from_state(assistant: &Assistant) -> String {
    match assistant.state() {
        ConversationState::AwaitingOtp { pending } => pending.otp_code.clone(),
        other => panic!("expected AwaitingOtp, got {other}"),
    }
}

#[tokio::test]
async fn test_email_update_round_trip() {
    let store = Arc::new(CustomerStore::new());
    let mut assistant = build_assistant(store.clone());

    let effects = assistant
        .handle_utterance("I'd like to change my email")
        .await
        .unwrap();
    assert!(effects[0].spoken_text().unwrap().contains("new email"));
    assert_eq!(store.get().email, "john.doe@example.com");

    assistant
        .handle_utterance("jane dot smith at outlook dot com")
        .await
        .unwrap();
    let code = otp_from_state(&assistant);
    assert_eq!(store.get().email, "john.doe@example.com");

    let effects = assistant.handle_utterance(&code).await.unwrap();
    assert_eq!(assistant.state(), &ConversationState::Idle);
    assert_eq!(store.get().email, "jane.smith@outlook.com");
    assert!(effects.iter().any(|e| matches!(
        e,
        Effect::Display { directive: DisplayDirective::PersonalDetails }
    )));
}

#[tokio::test]
async fn test_record_untouched_without_otp_match() {
    let store = Arc::new(CustomerStore::new());
    let mut assistant = build_assistant(store.clone());

    assistant.handle_utterance("update my address please").await.unwrap();
    assistant.handle_utterance("1 Short Lane, Perth").await.unwrap();
    let before = store.get();

    // Three wrong codes exhaust the default attempt limit
    let code = otp_from_state(&assistant);
    let wrong = if code == "999999" { "999998" } else { "999999" };
    for _ in 0..3 {
        assistant.handle_utterance(wrong).await.unwrap();
    }

    assert_eq!(assistant.state(), &ConversationState::Idle);
    assert_eq!(store.get(), before);
}

#[tokio::test]
async fn test_adviser_booking_is_logged() {
    let store = Arc::new(CustomerStore::new());
    let appointments = Arc::new(AppointmentLog::new());
    let mut assistant = Assistant::new(
        &AgentConfig::default(),
        Arc::new(ScriptedClassifier),
        Arc::new(EchoHints),
        store,
        appointments.clone(),
    );

    assistant.handle_utterance("book me an adviser").await.unwrap();
    assistant.handle_utterance("yes please").await.unwrap();
    assistant.handle_utterance("Monday morning works").await.unwrap();

    assert_eq!(appointments.len(), 1);
    assert_eq!(
        appointments.list()[0].slot,
        member_assist_core::AdviserSlot::Monday10am
    );
}

#[tokio::test]
async fn test_classifier_outage_degrades_to_apology() {
    let store = Arc::new(CustomerStore::new());
    let mut assistant = Assistant::new(
        &AgentConfig::default(),
        Arc::new(BrokenClassifier),
        Arc::new(EchoHints),
        store.clone(),
        Arc::new(AppointmentLog::new()),
    );

    let effects = assistant.handle_utterance("what's my balance").await.unwrap();

    assert_eq!(assistant.state(), &ConversationState::Idle);
    assert!(effects[0].spoken_text().unwrap().contains("trouble"));
    assert_eq!(store.get(), member_assist_core::CustomerRecord::demo());
}

#[tokio::test]
async fn test_deferred_fund_offer_fires_after_delay() {
    let store = Arc::new(CustomerStore::new());
    let config = AgentConfig {
        fund_offer_delay_ms: 20,
        ..Default::default()
    };
    let mut assistant = build_assistant_with_config(store, config);

    assistant.handle_utterance("book me an adviser").await.unwrap();
    assistant
        .handle_utterance("yes, I'm starting a new job soon by the way")
        .await
        .unwrap();
    assistant.handle_utterance("Friday").await.unwrap();

    // Not due yet
    assert!(assistant.take_due_fund_offer().is_none());
    assert!(assistant.fund_offer_due_in().is_some());

    tokio::time::sleep(Duration::from_millis(30)).await;
    let effects = assistant.take_due_fund_offer().expect("offer should be due");
    assert_eq!(assistant.state(), &ConversationState::FundOffer);
    assert!(effects[0].spoken_text().unwrap().contains("Choice of Fund"));

    // Fires at most once
    assert!(assistant.take_due_fund_offer().is_none());
}

#[tokio::test]
async fn test_deferred_offer_superseded_by_new_flow() {
    let store = Arc::new(CustomerStore::new());
    let config = AgentConfig {
        fund_offer_delay_ms: 10_000,
        ..Default::default()
    };
    let mut assistant = build_assistant_with_config(store, config);

    assistant.handle_utterance("book me an adviser").await.unwrap();
    assistant
        .handle_utterance("yes, I just changed jobs actually")
        .await
        .unwrap();
    assistant.handle_utterance("Tuesday").await.unwrap();
    assert!(assistant.fund_offer_due_in().is_some());

    // Starting another flow before the offer is due supersedes it
    assistant.handle_utterance("I need to update my email").await.unwrap();
    assert!(assistant.fund_offer_due_in().is_none());
    assert!(assistant.take_due_fund_offer().is_none());
}
