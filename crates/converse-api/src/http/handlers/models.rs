//! Model catalog HTTP handler.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use converse_core::inference::InferenceClient;
use converse_types::inference::ModelInfo;

use crate::http::error::AppError;
use crate::state::AppState;

/// Response body for `GET /models`.
#[derive(Debug, Serialize)]
pub struct ModelListResponse {
    pub models: Vec<ModelInfo>,
    pub count: usize,
    pub current_default: String,
}

/// GET /models - List the foundation models the backend can serve.
///
/// When the backend's catalog endpoint is unreachable, the client falls
/// back to a built-in list rather than failing the request.
pub async fn list_models(
    State(state): State<AppState>,
) -> Result<Json<ModelListResponse>, AppError> {
    let models = state.registry.inference().list_models().await?;

    Ok(Json(ModelListResponse {
        count: models.len(),
        current_default: state.registry.default_model().to_string(),
        models,
    }))
}
