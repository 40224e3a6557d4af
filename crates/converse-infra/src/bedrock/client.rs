//! BedrockClient -- concrete [`InferenceClient`] implementation for AWS
//! Bedrock.
//!
//! Sends requests to the Bedrock Runtime API using Bearer token
//! authentication. One client serves every session; the model comes from
//! each request, mapped to a cross-region inference profile id when not
//! already fully qualified.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never
//! logged or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use converse_core::inference::InferenceClient;
use converse_types::inference::{
    CompletionRequest, CompletionResponse, InferenceError, ModelInfo, StopReason, Usage,
};

use super::types::{
    BedrockContentBlock, BedrockMessage, BedrockRequest, BedrockResponse,
    ListFoundationModelsResponse,
};

/// AWS Bedrock inference client.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing HTTP request headers. It never appears in Debug output.
pub struct BedrockClient {
    client: reqwest::Client,
    api_key: SecretString,
    region: String,
}

impl BedrockClient {
    /// The Messages API version Bedrock expects.
    const API_VERSION: &'static str = "bedrock-2023-05-31";

    /// Prefix used to identify Bedrock API keys.
    const KEY_PREFIX: &'static str = "bedrock-api-key-";

    /// Create a new Bedrock client.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Bedrock bearer token wrapped in SecretString. If the
    ///   key starts with `bedrock-api-key-`, the prefix is stripped and
    ///   the remainder is used as the Bearer token. The token is a
    ///   base64-encoded presigned URL containing SigV4 params.
    /// * `region` - AWS region (e.g., "us-east-1"). If the token's
    ///   embedded credential scope specifies a different region, that
    ///   region is used instead.
    pub fn new(api_key: SecretString, region: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .expect("failed to create reqwest client");

        // Strip the bedrock-api-key- prefix so only the base64 token is
        // used as the Bearer token in HTTP requests.
        let raw_key = api_key.expose_secret().to_string();
        let token_part = raw_key.strip_prefix(Self::KEY_PREFIX).unwrap_or(&raw_key);
        let effective_region = Self::detect_region_from_token(token_part).unwrap_or(region);

        Self {
            client,
            api_key: SecretString::from(token_part.to_string()),
            region: effective_region,
        }
    }

    /// Try to extract the AWS region from a base64-encoded presigned URL
    /// token.
    ///
    /// The token decodes to a URL like:
    /// `bedrock.amazonaws.com/?...&X-Amz-Credential=AKIA.../20260212/us-east-1/bedrock/aws4_request&...`
    ///
    /// Returns `Some(region)` if found, `None` otherwise.
    fn detect_region_from_token(token: &str) -> Option<String> {
        use base64::Engine;
        let decoded = base64::engine::general_purpose::STANDARD
            .decode(token)
            .ok()?;
        let text = String::from_utf8(decoded).ok()?;

        // Look for X-Amz-Credential=.../<date>/<region>/bedrock/aws4_request
        let cred_start = text.find("X-Amz-Credential=")?;
        let cred_value = &text[cred_start + "X-Amz-Credential=".len()..];
        // Format: <access-key>/<date>/<region>/<service>/aws4_request
        let parts: Vec<&str> = cred_value.split('/').collect();
        if parts.len() >= 3 {
            let region = parts[2].split('&').next().unwrap_or(parts[2]);
            tracing::info!(region = %region, "Detected region from Bedrock bearer token");
            Some(region.to_string())
        } else {
            None
        }
    }

    /// Convert a bare model name to a Bedrock cross-region inference
    /// profile id.
    ///
    /// Profiles use a region shorthand prefix (e.g., `eu.`, `us.`) before
    /// the model id; the shorthand is the first dash-separated segment of
    /// the full region. A model that already contains a `.` (e.g.,
    /// `us.amazon.nova-pro-v1:0` or `anthropic.claude-...`) is returned
    /// as-is.
    ///
    /// # Examples
    ///
    /// ```text
    /// ("claude-sonnet-4-20250514", "eu-west-1") → "eu.anthropic.claude-sonnet-4-20250514-v1:0"
    /// ("claude-sonnet-4-20250514", "us-east-1") → "us.anthropic.claude-sonnet-4-20250514-v1:0"
    /// ("us.amazon.nova-pro-v1:0", _)            → unchanged
    /// ```
    pub fn to_bedrock_model_id(model: &str, region: &str) -> String {
        if model.contains('.') {
            model.to_string()
        } else {
            // Extract region shorthand: "eu-west-1" → "eu", "us-east-1" → "us"
            let region_prefix = region.split('-').next().unwrap_or("us");
            format!("{region_prefix}.anthropic.{model}-v1:0")
        }
    }

    /// Build the Bedrock Runtime invoke URL for a model.
    fn invoke_url(&self, model_id: &str) -> String {
        format!(
            "https://bedrock-runtime.{}.amazonaws.com/model/{}/invoke",
            self.region, model_id
        )
    }

    /// Build the Bedrock control-plane foundation-models URL.
    fn models_url(&self) -> String {
        format!("https://bedrock.{}.amazonaws.com/foundation-models", self.region)
    }

    /// Convert a provider-agnostic [`CompletionRequest`] into a
    /// [`BedrockRequest`] body.
    fn to_bedrock_request(request: &CompletionRequest) -> BedrockRequest {
        let messages = request
            .messages
            .iter()
            .map(|m| BedrockMessage {
                role: m.role.to_string(),
                content: m.content.clone(),
            })
            .collect();

        BedrockRequest {
            anthropic_version: Self::API_VERSION.to_string(),
            max_tokens: request.max_tokens,
            messages,
            system: request.system.clone(),
            temperature: request.temperature,
        }
    }

    /// Built-in catalog returned when the control-plane listing fails.
    fn fallback_models() -> Vec<ModelInfo> {
        vec![
            ModelInfo {
                id: "us.amazon.nova-pro-v1:0".to_string(),
                name: "Amazon Nova Pro".to_string(),
                provider: "Amazon".to_string(),
            },
            ModelInfo {
                id: "us.amazon.nova-lite-v1:0".to_string(),
                name: "Amazon Nova Lite".to_string(),
                provider: "Amazon".to_string(),
            },
            ModelInfo {
                id: "us.amazon.nova-micro-v1:0".to_string(),
                name: "Amazon Nova Micro".to_string(),
                provider: "Amazon".to_string(),
            },
        ]
    }
}

// BedrockClient intentionally does NOT derive Debug to prevent
// accidental exposure of internal state.

impl InferenceClient for BedrockClient {
    fn name(&self) -> &str {
        "bedrock"
    }

    fn region(&self) -> &str {
        &self.region
    }

    async fn generate(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, InferenceError> {
        let body = Self::to_bedrock_request(request);
        let model_id = Self::to_bedrock_model_id(&request.model, &self.region);
        let url = self.invoke_url(&model_id);

        tracing::debug!(url = %url, model_id = %model_id, region = %self.region, "Bedrock invoke request");

        let response = self
            .client
            .post(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| InferenceError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            tracing::warn!(status = %status, body = %error_body, url = %url, "Bedrock API error response");
            return Err(match status.as_u16() {
                401 | 403 => InferenceError::AuthenticationFailed,
                429 => InferenceError::RateLimited {
                    retry_after_ms: None,
                },
                529 => InferenceError::Overloaded(error_body),
                400 => InferenceError::InvalidRequest(error_body),
                s if s >= 500 => InferenceError::Provider {
                    message: format!("Bedrock server error HTTP {status}: {error_body}"),
                },
                _ => InferenceError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let bedrock_resp: BedrockResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Deserialization(format!("failed to parse response: {e}")))?;

        let content = bedrock_resp
            .content
            .iter()
            .filter_map(|block| match block {
                BedrockContentBlock::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("");

        let stop_reason = match bedrock_resp.stop_reason.as_deref() {
            Some("max_tokens") => StopReason::MaxTokens,
            Some("stop_sequence") => StopReason::StopSequence,
            _ => StopReason::EndTurn,
        };

        Ok(CompletionResponse {
            id: bedrock_resp.id,
            content,
            model: bedrock_resp.model,
            stop_reason,
            usage: Usage {
                input_tokens: bedrock_resp.usage.input_tokens,
                output_tokens: bedrock_resp.usage.output_tokens,
            },
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, InferenceError> {
        let url = self.models_url();

        let result = self
            .client
            .get(&url)
            .header(
                "Authorization",
                format!("Bearer {}", self.api_key.expose_secret()),
            )
            .send()
            .await;

        let response = match result {
            Ok(r) if r.status().is_success() => r,
            Ok(r) => {
                tracing::warn!(status = %r.status(), "Bedrock model listing rejected; using fallback catalog");
                return Ok(Self::fallback_models());
            }
            Err(e) => {
                tracing::warn!(error = %e, "Bedrock model listing unreachable; using fallback catalog");
                return Ok(Self::fallback_models());
            }
        };

        let listing: ListFoundationModelsResponse = response
            .json()
            .await
            .map_err(|e| InferenceError::Deserialization(format!("failed to parse model list: {e}")))?;

        // Only models that can generate text are usable for chat.
        let mut models: Vec<ModelInfo> = listing
            .model_summaries
            .into_iter()
            .filter(|m| m.output_modalities.iter().any(|modality| modality == "TEXT"))
            .map(|m| ModelInfo {
                id: m.model_id,
                name: m.model_name,
                provider: m.provider_name,
            })
            .collect();

        models.sort_by(|a, b| (&a.provider, &a.name).cmp(&(&b.provider, &b.name)));
        Ok(models)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> BedrockClient {
        BedrockClient::new(
            SecretString::from("bedrock-api-key-test-not-real"),
            "us-east-1".to_string(),
        )
    }

    #[test]
    fn test_client_name_and_region() {
        let client = make_client();
        assert_eq!(client.name(), "bedrock");
        assert_eq!(client.region(), "us-east-1");
    }

    #[test]
    fn test_model_id_mapping_us_region() {
        assert_eq!(
            BedrockClient::to_bedrock_model_id("claude-sonnet-4-20250514", "us-east-1"),
            "us.anthropic.claude-sonnet-4-20250514-v1:0"
        );
    }

    #[test]
    fn test_model_id_mapping_eu_region() {
        assert_eq!(
            BedrockClient::to_bedrock_model_id("claude-sonnet-4-20250514", "eu-west-1"),
            "eu.anthropic.claude-sonnet-4-20250514-v1:0"
        );
    }

    #[test]
    fn test_model_id_mapping_already_qualified() {
        let id = "us.amazon.nova-pro-v1:0";
        assert_eq!(BedrockClient::to_bedrock_model_id(id, "eu-west-1"), id);

        let id = "anthropic.claude-sonnet-4-20250514-v1:0";
        assert_eq!(BedrockClient::to_bedrock_model_id(id, "us-east-1"), id);
    }

    #[test]
    fn test_invoke_url_construction() {
        let client = make_client();
        assert_eq!(
            client.invoke_url("us.anthropic.claude-sonnet-4-20250514-v1:0"),
            "https://bedrock-runtime.us-east-1.amazonaws.com/model/us.anthropic.claude-sonnet-4-20250514-v1:0/invoke"
        );
    }

    #[test]
    fn test_models_url_construction() {
        let client = make_client();
        assert_eq!(
            client.models_url(),
            "https://bedrock.us-east-1.amazonaws.com/foundation-models"
        );
    }

    #[test]
    fn test_to_bedrock_request() {
        use converse_types::inference::ChatMessage;
        use converse_types::turn::TurnRole;

        let request = CompletionRequest {
            model: "claude-sonnet-4-20250514".to_string(),
            messages: vec![ChatMessage {
                role: TurnRole::User,
                content: "Hello".to_string(),
            }],
            system: Some("Be helpful".to_string()),
            max_tokens: 2048,
            temperature: Some(0.7),
        };

        let body = BedrockClient::to_bedrock_request(&request);
        assert_eq!(body.anthropic_version, "bedrock-2023-05-31");
        assert_eq!(body.max_tokens, 2048);
        assert_eq!(body.messages.len(), 1);
        assert_eq!(body.messages[0].role, "user");
        assert_eq!(body.system.as_deref(), Some("Be helpful"));
    }

    #[test]
    fn test_key_prefix_stripped() {
        let client = BedrockClient::new(
            SecretString::from("bedrock-api-key-abc123"),
            "us-east-1".to_string(),
        );
        assert_eq!(client.api_key.expose_secret(), "abc123");
    }

    #[test]
    fn test_region_detected_from_token() {
        use base64::Engine;
        let presigned = "bedrock.amazonaws.com/?X-Amz-Credential=AKIATEST/20260212/eu-west-1/bedrock/aws4_request&X-Amz-Signature=abc";
        let token = base64::engine::general_purpose::STANDARD.encode(presigned);

        let client = BedrockClient::new(SecretString::from(token), "us-east-1".to_string());
        // The token's credential scope wins over the constructor region.
        assert_eq!(client.region(), "eu-west-1");
    }

    #[test]
    fn test_fallback_models_are_text_models() {
        let models = BedrockClient::fallback_models();
        assert_eq!(models.len(), 3);
        assert!(models.iter().all(|m| m.provider == "Amazon"));
        assert!(models.iter().all(|m| m.id.contains("nova")));
    }
}
