//! Chat HTTP handler.
//!
//! `POST /chat` creates or continues a conversation: looks the session
//! up in the registry (creating it on first contact) and delegates the
//! exchange to the conversation core.

use axum::Json;
use axum::extract::State;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::http::error::AppError;
use crate::state::AppState;

/// Upper bound on a single chat message, in characters.
pub const MAX_MESSAGE_CHARS: usize = 5000;

/// Request body for `POST /chat`.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Session id for conversation continuity; generated when absent.
    #[serde(default)]
    pub session_id: Option<String>,
    /// Model override, honored only when the session is first created.
    #[serde(default)]
    pub model_id: Option<String>,
}

/// Response body for `POST /chat`.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub model: String,
    pub region: String,
    pub timestamp: String,
}

/// Reject empty and oversized messages before they reach the core.
pub fn validate_message(message: &str) -> Result<(), AppError> {
    if message.trim().is_empty() {
        return Err(AppError::Validation(
            "message must not be empty".to_string(),
        ));
    }
    if message.chars().count() > MAX_MESSAGE_CHARS {
        return Err(AppError::Validation(format!(
            "message exceeds {MAX_MESSAGE_CHARS} characters"
        )));
    }
    Ok(())
}

/// POST /chat - Send a message and get the assistant's reply.
pub async fn chat(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    validate_message(&request.message)?;

    let session = state
        .registry
        .get_or_create(request.session_id.as_deref(), request.model_id.as_deref());

    let response = session.respond(&request.message).await?;

    Ok(Json(ChatResponse {
        response,
        session_id: session.session_id().to_string(),
        model: session.model_id().to_string(),
        region: session.region().to_string(),
        timestamp: Utc::now().to_rfc3339(),
    }))
}
