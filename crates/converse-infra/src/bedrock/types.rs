//! AWS Bedrock request/response wire types.
//!
//! Bedrock's invoke endpoint uses the Messages API JSON format with two
//! quirks: the `model` field is omitted from the request body (it goes
//! in the URL path) and an `anthropic_version` field is required.
//! These are Bedrock-specific HTTP structures, NOT the provider-agnostic
//! completion types from converse-types.

use serde::{Deserialize, Serialize};

/// Request body for Bedrock `invoke`.
#[derive(Debug, Clone, Serialize)]
pub struct BedrockRequest {
    pub anthropic_version: String,
    pub max_tokens: u32,
    pub messages: Vec<BedrockMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

/// A single message in a Bedrock conversation.
#[derive(Debug, Clone, Serialize)]
pub struct BedrockMessage {
    pub role: String,
    pub content: String,
}

/// Non-streaming response body from Bedrock `invoke`.
#[derive(Debug, Clone, Deserialize)]
pub struct BedrockResponse {
    pub id: String,
    pub model: String,
    pub content: Vec<BedrockContentBlock>,
    pub stop_reason: Option<String>,
    #[serde(default)]
    pub usage: BedrockUsage,
}

/// A content block in a Bedrock response.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum BedrockContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "tool_use")]
    ToolUse {
        id: String,
        name: String,
        input: serde_json::Value,
    },
}

/// Token usage reported by Bedrock.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BedrockUsage {
    #[serde(default)]
    pub input_tokens: u32,
    #[serde(default)]
    pub output_tokens: u32,
}

/// Response body from the Bedrock control-plane `foundation-models` list.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFoundationModelsResponse {
    #[serde(default)]
    pub model_summaries: Vec<FoundationModelSummary>,
}

/// One entry of the foundation-model catalog.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FoundationModelSummary {
    pub model_id: String,
    #[serde(default)]
    pub model_name: String,
    #[serde(default)]
    pub provider_name: String,
    #[serde(default)]
    pub output_modalities: Vec<String>,
}
