//! HTTP server for the member assistant
//!
//! Exposes the dialogue over a small REST surface: session management,
//! chat, direct slot-fill, the customer record, and a cloud speech proxy.

pub mod http;
pub mod session;
pub mod speech;
pub mod state;

pub use http::create_router;
pub use state::AppState;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Server-level errors, mapped to JSON error responses
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Session not found")]
    SessionNotFound,

    #[error("Session limit reached")]
    SessionLimit,

    #[error("Invalid request: {0}")]
    BadRequest(String),

    #[error("Speech service error: {0}")]
    Speech(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::SessionNotFound => StatusCode::NOT_FOUND,
            ServerError::SessionLimit => StatusCode::TOO_MANY_REQUESTS,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Speech(_) => StatusCode::BAD_GATEWAY,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

impl From<member_assist_core::Error> for ServerError {
    fn from(err: member_assist_core::Error) -> Self {
        match err {
            member_assist_core::Error::Speech(msg) => ServerError::Speech(msg),
            member_assist_core::Error::InvalidInput(msg) => ServerError::BadRequest(msg),
            other => ServerError::Internal(other.to_string()),
        }
    }
}
