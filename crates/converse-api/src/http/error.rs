//! Application error type mapping to HTTP status codes.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

use converse_types::inference::InferenceError;

/// Application-level error that maps to HTTP responses.
///
/// Inference failures surface to the caller as failed responses -- they
/// are never rendered as assistant content -- but they have already been
/// contained by the conversation core, so the session and its transcript
/// remain consistent afterwards.
#[derive(Debug)]
pub enum AppError {
    /// Unknown session id on lookup.
    NotFound(String),
    /// Malformed request at the boundary.
    Validation(String),
    /// The inference backend failed.
    Inference(InferenceError),
    /// Generic internal error.
    Internal(String),
}

impl From<InferenceError> for AppError {
    fn from(e: InferenceError) -> Self {
        AppError::Inference(e)
    }
}

impl AppError {
    /// HTTP status this error renders as (shared with the function
    /// entry point).
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Inference(InferenceError::RateLimited { .. }) => {
                StatusCode::TOO_MANY_REQUESTS
            }
            AppError::Inference(InferenceError::Overloaded(_)) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Inference(InferenceError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            AppError::Inference(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for the response body.
    pub fn code(&self) -> &'static str {
        match self {
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Inference(_) => "INFERENCE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Human-readable message for the response body.
    pub fn message(&self) -> String {
        match self {
            AppError::NotFound(msg) => msg.clone(),
            AppError::Validation(msg) => msg.clone(),
            AppError::Inference(err) => err.to_string(),
            AppError::Internal(msg) => msg.clone(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({
            "error": {
                "code": self.code(),
                "message": self.message(),
            }
        });

        (
            self.status(),
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body.to_string(),
        )
            .into_response()
    }
}
