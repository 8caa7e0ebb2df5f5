//! HTTP endpoints
//!
//! REST API for the member assistant. Route set mirrors the demo UI's
//! needs: sessions, chat, direct slot-fill, the customer record, and a
//! speech proxy.

use axum::{
    extract::{Json, Path, State},
    http::{HeaderValue, Method},
    response::IntoResponse,
    routing::{delete, get, post, put},
    Router,
};
use base64::Engine;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use member_assist_core::{
    CustomerRecord, Effect, RecordPatch, RecordStore, SlotKind, SpeechRecognizer,
    SpeechSynthesizer,
};
use member_assist_text_processing::SlotExtractor;

use crate::state::AppState;
use crate::ServerError;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let config = state.config.read();
    let cors_layer = build_cors_layer(&config.server.cors_origins, config.server.cors_enabled);
    drop(config);

    Router::new()
        // Session endpoints
        .route("/api/sessions", post(create_session))
        .route("/api/sessions", get(list_sessions))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id", delete(delete_session))
        // Dialogue
        .route("/api/chat/:session_id", post(chat))
        .route("/api/chat/:session_id/poll", get(poll))
        // Slot extraction helper
        .route("/api/slotfill", post(slotfill))
        // Customer record
        .route("/api/customer", get(get_customer))
        .route("/api/customer", put(put_customer))
        // Speech proxy
        .route("/api/speech", post(speech))
        // Health
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins
///
/// - disabled: permissive (development only)
/// - no origins configured: localhost:3000 for safety
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Invalid CORS origin, skipping");
                None
            }
        })
        .collect();

    if parsed.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().expect("static origin"))
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers(Any);
    }

    CorsLayer::new()
        .allow_origin(parsed)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers(Any)
}

// ====== Sessions ======

#[derive(Debug, Serialize)]
struct CreateSessionResponse {
    session_id: String,
}

async fn create_session(
    State(state): State<AppState>,
) -> Result<Json<CreateSessionResponse>, ServerError> {
    let session = state.sessions.create(state.new_assistant())?;
    Ok(Json(CreateSessionResponse {
        session_id: session.id.clone(),
    }))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, ServerError> {
    let session = state.sessions.get(&id).ok_or(ServerError::SessionNotFound)?;
    let assistant = session.assistant.lock().await;

    Ok(Json(serde_json::json!({
        "session_id": session.id,
        "state": assistant.state().name(),
        "idle_seconds": session.idle_seconds(),
    })))
}

async fn delete_session(State(state): State<AppState>, Path(id): Path<String>) -> impl IntoResponse {
    if state.sessions.remove(&id) {
        axum::http::StatusCode::NO_CONTENT
    } else {
        axum::http::StatusCode::NOT_FOUND
    }
}

async fn list_sessions(State(state): State<AppState>) -> Json<serde_json::Value> {
    let sessions = state.sessions.list_ids();
    Json(serde_json::json!({
        "sessions": sessions,
        "count": sessions.len(),
    }))
}

// ====== Chat ======

#[derive(Debug, Deserialize)]
struct ChatRequest {
    message: String,
}

#[derive(Debug, Serialize)]
struct ChatResponse {
    session_id: String,
    /// Concatenated spoken prompts, for clients that only render text
    reply: String,
    state: String,
    effects: Vec<Effect>,
}

/// Handle one utterance
///
/// Runs the assistant to completion, then drains a due deferred fund offer
/// into the same response so clients see it without a second request.
async fn chat(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, ServerError> {
    if request.message.trim().is_empty() {
        return Err(ServerError::BadRequest("message is required".to_string()));
    }

    let session = state
        .sessions
        .get(&session_id)
        .ok_or(ServerError::SessionNotFound)?;
    session.touch();

    let mut assistant = session.assistant.lock().await;
    let mut effects = assistant
        .handle_utterance(&request.message)
        .await
        .map_err(ServerError::from)?;

    if let Some(deferred) = assistant.take_due_fund_offer() {
        effects.extend(deferred);
    }

    let reply = spoken_reply(&effects);
    let state_name = assistant.state().name().to_string();
    drop(assistant);

    Ok(Json(ChatResponse {
        session_id,
        reply,
        state: state_name,
        effects,
    }))
}

#[derive(Debug, Serialize)]
struct PollResponse {
    session_id: String,
    reply: String,
    state: String,
    effects: Vec<Effect>,
}

/// Poll for deferred effects (the delayed fund offer)
async fn poll(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<PollResponse>, ServerError> {
    let session = state
        .sessions
        .get(&session_id)
        .ok_or(ServerError::SessionNotFound)?;

    let mut assistant = session.assistant.lock().await;
    let effects = assistant.take_due_fund_offer().unwrap_or_default();
    let reply = spoken_reply(&effects);
    let state_name = assistant.state().name().to_string();
    drop(assistant);

    Ok(Json(PollResponse {
        session_id,
        reply,
        state: state_name,
        effects,
    }))
}

fn spoken_reply(effects: &[Effect]) -> String {
    effects
        .iter()
        .filter_map(Effect::spoken_text)
        .collect::<Vec<_>>()
        .join(" ")
}

// ====== Slot extraction helper ======

#[derive(Debug, Deserialize)]
struct SlotFillRequest {
    message: String,
    #[serde(rename = "slotType")]
    slot_type: String,
}

#[derive(Debug, Serialize)]
struct SlotFillResponse {
    value: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

/// Direct slot extraction: LLM hint plus the local cascade
async fn slotfill(
    State(state): State<AppState>,
    Json(request): Json<SlotFillRequest>,
) -> Result<Json<SlotFillResponse>, ServerError> {
    if request.message.trim().is_empty() {
        return Err(ServerError::BadRequest("message is required".to_string()));
    }
    let kind = SlotKind::from_str(&request.slot_type).ok_or_else(|| {
        ServerError::BadRequest("Invalid slotType. Must be \"address\" or \"email\".".to_string())
    })?;

    let hint = match state.hints.slot_hint(&request.message, kind).await {
        Ok(hint) => hint,
        Err(e) => {
            tracing::warn!(error = %e, "Slot hint call failed, extracting locally");
            String::new()
        }
    };

    match SlotExtractor::new().extract(kind, &request.message, &hint) {
        Ok(value) => Ok(Json(SlotFillResponse { value, error: None })),
        Err(err) => Ok(Json(SlotFillResponse {
            value: String::new(),
            error: Some(err.guidance(kind).to_string()),
        })),
    }
}

// ====== Customer record ======

async fn get_customer(State(state): State<AppState>) -> Json<CustomerRecord> {
    Json(state.customers.get())
}

#[derive(Debug, Serialize)]
struct PutCustomerResponse {
    message: String,
    data: CustomerRecord,
}

async fn put_customer(
    State(state): State<AppState>,
    Json(patch): Json<RecordPatch>,
) -> Json<PutCustomerResponse> {
    let data = state.customers.update(&patch);
    Json(PutCustomerResponse {
        message: "Customer information updated successfully".to_string(),
        data,
    })
}

// ====== Speech proxy ======

#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum SpeechRequest {
    /// Text in, base64 MP3 out
    Synthesize { data: String },
    /// Base64 audio in, transcript out
    Recognize { data: String },
}

async fn speech(
    State(state): State<AppState>,
    Json(request): Json<SpeechRequest>,
) -> Result<Json<serde_json::Value>, ServerError> {
    match request {
        SpeechRequest::Synthesize { data } => {
            let text = data.trim();
            if text.is_empty() {
                return Err(ServerError::BadRequest("text is required".to_string()));
            }
            let audio = state.speech.synthesize(text).await.map_err(ServerError::from)?;
            let encoded = base64::engine::general_purpose::STANDARD.encode(audio);
            Ok(Json(serde_json::json!({ "audio_content": encoded })))
        }
        SpeechRequest::Recognize { data } => {
            let audio = base64::engine::general_purpose::STANDARD
                .decode(data.as_bytes())
                .map_err(|e| ServerError::BadRequest(format!("invalid base64 audio: {}", e)))?;
            let transcript = state
                .speech
                .recognize(&audio)
                .await
                .map_err(ServerError::from)?;
            Ok(Json(serde_json::json!({ "transcript": transcript })))
        }
    }
}

// ====== Health ======

async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn readiness_check(State(state): State<AppState>) -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ready",
        "sessions": state.sessions.len(),
    }))
}
