//! InferenceClient trait definition.
//!
//! This is the abstraction over the external text-generation backend.
//! Uses native async fn in traits (RPITIT, Rust 2024 edition).
//! Implementations live in converse-infra (e.g., `BedrockClient`).

use converse_types::inference::{
    CompletionRequest, CompletionResponse, InferenceError, ModelInfo,
};

/// Trait for inference backends (AWS Bedrock, etc.).
///
/// The backend's latency and availability are outside this system's
/// control; callers must treat every `generate` call as fallible.
/// Retry policy, if any, belongs inside the implementation -- the
/// conversation core never retries.
pub trait InferenceClient: Send + Sync {
    /// Human-readable backend name (e.g., "bedrock").
    fn name(&self) -> &str;

    /// Region or endpoint locator the backend is bound to.
    fn region(&self) -> &str;

    /// Send a completion request and receive the full response.
    ///
    /// The model to invoke comes from the request, so sessions pinned
    /// to different models can share one client.
    fn generate(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, InferenceError>> + Send;

    /// List the models the backend can serve.
    fn list_models(
        &self,
    ) -> impl std::future::Future<Output = Result<Vec<ModelInfo>, InferenceError>> + Send;
}
