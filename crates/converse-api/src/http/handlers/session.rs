//! Session and history HTTP handlers.
//!
//! Endpoints:
//! - GET    /history/{id}  - Durable history for any session id
//! - GET    /session/{id}  - Summary of a live session
//! - GET    /sessions      - List live session ids
//! - DELETE /session/{id}  - Drop a live session (durable history kept)

use axum::Json;
use axum::extract::{Path, State};
use serde::Serialize;

use converse_types::session::SessionSummary;

use crate::http::error::AppError;
use crate::state::AppState;

/// One durable history record as returned by `GET /history/{id}`.
#[derive(Debug, Serialize)]
pub struct HistoryItem {
    pub timestamp: String,
    pub role: String,
    pub content: String,
    pub message_id: String,
}

/// GET /history/{id} - Fetch persisted turns for a session.
///
/// Works for sessions with no live instance in this process, and
/// returns an empty list both for unknown ids and when the store is
/// unreachable -- durable history is a best-effort view, never a 500.
pub async fn get_history(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<Vec<HistoryItem>> {
    let turns = state.registry.history(&session_id).await;

    let items = turns
        .into_iter()
        .map(|t| HistoryItem {
            timestamp: t.timestamp.to_rfc3339(),
            role: t.role.to_string(),
            content: t.content,
            message_id: t.id.to_string(),
        })
        .collect();

    Json(items)
}

/// GET /session/{id} - Summary of a live session.
pub async fn get_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<SessionSummary>, AppError> {
    let session = state.registry.get(&session_id).ok_or_else(|| {
        AppError::NotFound(format!("Session {session_id} not found in active sessions"))
    })?;

    Ok(Json(session.summary().await))
}

/// GET /sessions - Ids of all live sessions.
pub async fn list_sessions(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.registry.list())
}

/// DELETE /session/{id} - Drop a live session from memory.
///
/// Never touches durable history; `GET /history/{id}` keeps working
/// after removal.
pub async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    if state.registry.remove(&session_id) {
        Ok(Json(serde_json::json!({
            "message": format!("Session {session_id} deleted"),
            "status": "success",
        })))
    } else {
        Err(AppError::NotFound(format!(
            "Session {session_id} not found"
        )))
    }
}
