//! Environment-driven configuration for Converse.
//!
//! Reads the same environment variables the service has always used
//! (`AWS_REGION`, `BEDROCK_MODEL_ID`, `BEDROCK_API_KEY`) and falls back
//! to sensible defaults when a variable is absent.

use std::path::PathBuf;

use secrecy::SecretString;

/// Default AWS region when `AWS_REGION` is unset.
const DEFAULT_REGION: &str = "us-east-1";

/// Default model when `BEDROCK_MODEL_ID` is unset.
///
/// A bare Claude model name; the Bedrock client maps it to a
/// cross-region inference profile id. Fully-qualified ids (e.g.
/// `us.amazon.nova-pro-v1:0`) are also accepted and pass through
/// unchanged.
const DEFAULT_MODEL_ID: &str = "claude-sonnet-4-20250514";

/// Maximum tokens generated per reply.
const DEFAULT_MAX_TOKENS: u32 = 2048;

/// Sampling temperature for replies.
const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Resolved application configuration.
pub struct AppConfig {
    pub region: String,
    pub model_id: String,
    /// Bedrock bearer token. `None` means the service cannot reach the
    /// backend; surfaced as a startup error by the application layer.
    pub api_key: Option<SecretString>,
    pub data_dir: PathBuf,
    pub max_tokens: u32,
    pub temperature: f64,
}

impl AppConfig {
    /// Resolve configuration from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Self {
        let region = get("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string());
        let model_id = get("BEDROCK_MODEL_ID").unwrap_or_else(|| DEFAULT_MODEL_ID.to_string());
        let api_key = get("BEDROCK_API_KEY").map(SecretString::from);
        let data_dir = match get("CONVERSE_DATA_DIR") {
            Some(dir) => PathBuf::from(dir),
            None => dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".converse"),
        };

        Self {
            region,
            model_id,
            api_key,
            data_dir,
            max_tokens: DEFAULT_MAX_TOKENS,
            temperature: DEFAULT_TEMPERATURE,
        }
    }

    /// SQLite URL for the history database inside the data directory.
    pub fn database_url(&self) -> String {
        format!(
            "sqlite://{}?mode=rwc",
            self.data_dir.join("converse.db").display()
        )
    }
}
