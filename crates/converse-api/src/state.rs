//! Application state wiring the conversation core to the concrete
//! infrastructure.
//!
//! The core is generic over its collaborator traits; AppState pins those
//! generics to the shipped implementations (Bedrock + SQLite) and is the
//! single owner of the session registry -- handlers receive it by
//! reference through axum state, never through a process-wide global.

use std::sync::Arc;

use anyhow::Context;

use converse_core::registry::{SessionDefaults, SessionRegistry};
use converse_core::session::GenerationParams;
use converse_infra::bedrock::BedrockClient;
use converse_infra::config::AppConfig;
use converse_infra::sqlite::{DatabasePool, SqliteHistoryStore};

/// Concrete type alias for the registry generics pinned to infra
/// implementations.
pub type ConcreteRegistry = SessionRegistry<BedrockClient, SqliteHistoryStore>;

/// Shared application state holding the session registry.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<ConcreteRegistry>,
}

impl AppState {
    /// Initialize the application state: resolve config, connect to the
    /// history database, construct the Bedrock client, wire the registry.
    pub async fn init() -> anyhow::Result<Self> {
        let mut config = AppConfig::from_env();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&config.data_dir).await?;

        let pool = DatabasePool::new(&config.database_url()).await?;
        let history = Arc::new(SqliteHistoryStore::new(pool));

        let api_key = config
            .api_key
            .take()
            .context("BEDROCK_API_KEY is not set")?;
        let inference = Arc::new(BedrockClient::new(api_key, config.region.clone()));

        let registry = SessionRegistry::new(
            inference,
            history,
            SessionDefaults {
                model_id: config.model_id.clone(),
                params: GenerationParams {
                    max_tokens: config.max_tokens,
                    temperature: Some(config.temperature),
                },
            },
        );

        Ok(Self {
            registry: Arc::new(registry),
        })
    }
}
