//! Serverless request/response function entry point.
//!
//! Carries the same semantics as `POST /chat`, shaped for a function
//! runtime: one JSON event in, one JSON response out. The event body may
//! arrive as a JSON object or as an embedded JSON-encoded string,
//! depending on how the gateway proxies the request. Wiring this into a
//! specific function runtime is deployment concern left to the caller;
//! the `invoke` CLI command drives it from stdin.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use converse_core::history::HistoryStore;
use converse_core::inference::InferenceClient;
use converse_core::registry::SessionRegistry;

use crate::http::error::AppError;
use crate::http::handlers::chat::{ChatRequest, validate_message};

/// Inbound function event.
#[derive(Debug, Default, Deserialize)]
pub struct FunctionEvent {
    /// Request body: a JSON object, or a JSON-encoded string of one.
    #[serde(default)]
    pub body: Option<Value>,
}

/// Outbound function response in proxy-integration shape.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FunctionResponse {
    pub status_code: u16,
    pub headers: HashMap<String, String>,
    pub body: String,
}

impl FunctionResponse {
    fn new(status_code: u16, body: Value) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Content-Type".to_string(), "application/json".to_string());
        headers.insert("Access-Control-Allow-Origin".to_string(), "*".to_string());
        Self {
            status_code,
            headers,
            body: body.to_string(),
        }
    }
}

/// Extract a chat request from the event body, whichever encoding the
/// gateway used.
fn parse_chat_request(event: &FunctionEvent) -> Option<ChatRequest> {
    match &event.body {
        Some(Value::String(s)) => serde_json::from_str(s).ok(),
        Some(value @ Value::Object(_)) => serde_json::from_value(value.clone()).ok(),
        _ => None,
    }
}

fn usage_hint() -> Value {
    json!({
        "message": "Your message here",
        "session_id": "optional-session-id",
        "model_id": "optional-model-id",
    })
}

/// Handle one function event with `POST /chat` semantics.
pub async fn handle<I, H>(
    registry: &SessionRegistry<I, H>,
    event: FunctionEvent,
) -> FunctionResponse
where
    I: InferenceClient,
    H: HistoryStore,
{
    let Some(request) = parse_chat_request(&event) else {
        return FunctionResponse::new(
            400,
            json!({"error": "Message is required", "usage": usage_hint()}),
        );
    };

    if let Err(err) = validate_message(&request.message) {
        return FunctionResponse::new(
            err.status().as_u16(),
            json!({"error": err.message(), "usage": usage_hint()}),
        );
    }

    let session = registry.get_or_create(request.session_id.as_deref(), request.model_id.as_deref());

    match session.respond(&request.message).await {
        Ok(response) => FunctionResponse::new(
            200,
            json!({
                "response": response,
                "session_id": session.session_id(),
                "model": session.model_id(),
                "region": session.region(),
            }),
        ),
        Err(err) => {
            let err = AppError::from(err);
            FunctionResponse::new(err.status().as_u16(), json!({"error": err.message()}))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use converse_core::registry::SessionDefaults;
    use converse_core::session::GenerationParams;
    use converse_types::error::StorageError;
    use converse_types::inference::{
        CompletionRequest, CompletionResponse, InferenceError, ModelInfo, StopReason, Usage,
    };
    use converse_types::turn::Turn;

    struct EchoClient {
        fail: bool,
    }

    impl InferenceClient for EchoClient {
        fn name(&self) -> &str {
            "echo"
        }

        fn region(&self) -> &str {
            "us-east-1"
        }

        async fn generate(
            &self,
            request: &CompletionRequest,
        ) -> Result<CompletionResponse, InferenceError> {
            if self.fail {
                return Err(InferenceError::Provider {
                    message: "backend down".to_string(),
                });
            }
            let last = request
                .messages
                .last()
                .map(|m| m.content.clone())
                .unwrap_or_default();
            Ok(CompletionResponse {
                id: "resp".to_string(),
                content: format!("echo: {last}"),
                model: request.model.clone(),
                stop_reason: StopReason::EndTurn,
                usage: Usage::default(),
            })
        }

        async fn list_models(&self) -> Result<Vec<ModelInfo>, InferenceError> {
            Ok(Vec::new())
        }
    }

    struct NullStore;

    impl HistoryStore for NullStore {
        async fn append(&self, _session_id: &str, _turn: &Turn) -> Result<(), StorageError> {
            Ok(())
        }

        async fn query(&self, _session_id: &str) -> Result<Vec<Turn>, StorageError> {
            Ok(Vec::new())
        }
    }

    fn registry(fail: bool) -> SessionRegistry<EchoClient, NullStore> {
        SessionRegistry::new(
            Arc::new(EchoClient { fail }),
            Arc::new(NullStore),
            SessionDefaults {
                model_id: "claude-sonnet-4-20250514".to_string(),
                params: GenerationParams::default(),
            },
        )
    }

    fn event(body: Value) -> FunctionEvent {
        FunctionEvent { body: Some(body) }
    }

    #[tokio::test]
    async fn test_object_body_succeeds() {
        let registry = registry(false);
        let response = handle(&registry, event(json!({"message": "hi"}))).await;

        assert_eq!(response.status_code, 200);
        assert_eq!(
            response.headers.get("Access-Control-Allow-Origin").unwrap(),
            "*"
        );
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["response"], "echo: hi");
        assert_eq!(body["model"], "claude-sonnet-4-20250514");
        assert!(body["session_id"].as_str().is_some_and(|s| !s.is_empty()));
    }

    #[tokio::test]
    async fn test_string_body_succeeds() {
        let registry = registry(false);
        let raw = json!({"message": "hi", "session_id": "s1"}).to_string();
        let response = handle(&registry, event(Value::String(raw))).await;

        assert_eq!(response.status_code, 200);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert_eq!(body["session_id"], "s1");
    }

    #[tokio::test]
    async fn test_missing_message_is_400_with_usage() {
        let registry = registry(false);
        for event_body in [None, Some(json!({})), Some(json!({"session_id": "s1"}))] {
            let response = handle(&registry, FunctionEvent { body: event_body }).await;
            assert_eq!(response.status_code, 400);
            let body: Value = serde_json::from_str(&response.body).unwrap();
            assert_eq!(body["error"], "Message is required");
            assert!(body["usage"].is_object());
        }
    }

    #[tokio::test]
    async fn test_blank_message_is_400() {
        let registry = registry(false);
        let response = handle(&registry, event(json!({"message": "   "}))).await;
        assert_eq!(response.status_code, 400);
    }

    #[tokio::test]
    async fn test_inference_failure_is_502() {
        let registry = registry(true);
        let response = handle(&registry, event(json!({"message": "hi"}))).await;

        assert_eq!(response.status_code, 502);
        let body: Value = serde_json::from_str(&response.body).unwrap();
        assert!(body["error"].as_str().unwrap().contains("backend down"));
    }

    #[tokio::test]
    async fn test_session_continuity_across_events() {
        let registry = registry(false);
        handle(&registry, event(json!({"message": "one", "session_id": "s1"}))).await;
        handle(&registry, event(json!({"message": "two", "session_id": "s1"}))).await;

        let session = registry.get("s1").unwrap();
        let summary = session.summary().await;
        assert_eq!(summary.user_turns, 2);
        assert_eq!(summary.assistant_turns, 2);
    }

    #[test]
    fn test_response_serializes_in_proxy_shape() {
        let response = FunctionResponse::new(200, json!({"ok": true}));
        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["statusCode"], 200);
        assert!(value["headers"].is_object());
        assert!(value["body"].is_string());
    }
}
