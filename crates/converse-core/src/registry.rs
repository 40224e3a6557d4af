//! Process-wide mapping from session ids to live conversation sessions.
//!
//! The registry is the single authority for "is this session currently
//! active in this process". It is an explicitly owned object (held in
//! the application state and shared by `Arc`), never an ambient global.
//!
//! There is deliberately no eviction, TTL, or capacity bound: every
//! created session lives until explicitly removed or the process ends.
//! That is a known scalability gap preserved from the reference
//! behavior; see DESIGN.md before "fixing" it.

use std::sync::Arc;

use dashmap::DashMap;
use tracing::{info, warn};
use uuid::Uuid;

use converse_types::turn::Turn;

use crate::history::HistoryStore;
use crate::inference::InferenceClient;
use crate::session::{ConversationSession, GenerationParams};

/// Creation-time defaults for new sessions.
#[derive(Debug, Clone)]
pub struct SessionDefaults {
    /// Model bound to sessions that do not request an override.
    pub model_id: String,
    /// Generation parameters applied to every session.
    pub params: GenerationParams,
}

/// Maps external session identifiers to live [`ConversationSession`]s.
///
/// A session id maps to at most one live session at a time. Creation and
/// removal are atomic with respect to concurrent calls on the same id
/// (DashMap entry semantics), so two racing `get_or_create` calls for
/// one id observe the same instance.
pub struct SessionRegistry<I, H> {
    sessions: DashMap<String, Arc<ConversationSession<I, H>>>,
    inference: Arc<I>,
    history: Arc<H>,
    defaults: SessionDefaults,
}

impl<I: InferenceClient, H: HistoryStore> SessionRegistry<I, H> {
    /// Create an empty registry sharing one inference client and one
    /// history store across all sessions.
    pub fn new(inference: Arc<I>, history: Arc<H>, defaults: SessionDefaults) -> Self {
        Self {
            sessions: DashMap::new(),
            inference,
            history,
            defaults,
        }
    }

    /// Default model new sessions are bound to.
    pub fn default_model(&self) -> &str {
        &self.defaults.model_id
    }

    /// Region of the shared inference backend.
    pub fn region(&self) -> &str {
        self.inference.region()
    }

    /// Shared inference client (for catalog queries at the boundary).
    pub fn inference(&self) -> &I {
        &self.inference
    }

    /// Return the live session for `session_id`, creating it if absent.
    ///
    /// A missing id gets a generated UUID v7. For an id that is already
    /// registered, the existing instance is returned and `model_id` is
    /// ignored -- the model is fixed at creation time for a session.
    pub fn get_or_create(
        &self,
        session_id: Option<&str>,
        model_id: Option<&str>,
    ) -> Arc<ConversationSession<I, H>> {
        let id = match session_id {
            Some(id) => id.to_string(),
            None => Uuid::now_v7().to_string(),
        };

        let entry = self.sessions.entry(id.clone()).or_insert_with(|| {
            let model = model_id
                .unwrap_or(&self.defaults.model_id)
                .to_string();
            info!(session_id = %id, model = %model, "creating session");
            Arc::new(ConversationSession::new(
                id.clone(),
                model,
                self.defaults.params.clone(),
                Arc::clone(&self.inference),
                Arc::clone(&self.history),
            ))
        });

        Arc::clone(entry.value())
    }

    /// Look up a live session without creating one.
    pub fn get(&self, session_id: &str) -> Option<Arc<ConversationSession<I, H>>> {
        self.sessions
            .get(session_id)
            .map(|entry| Arc::clone(entry.value()))
    }

    /// Ids of all currently live sessions.
    pub fn list(&self) -> Vec<String> {
        self.sessions
            .iter()
            .map(|entry| entry.key().clone())
            .collect()
    }

    /// Unregister a session, dropping its in-memory transcript.
    ///
    /// Durable history is untouched. Returns whether a session was
    /// actually present; removing an unknown id is not an error.
    pub fn remove(&self, session_id: &str) -> bool {
        let removed = self.sessions.remove(session_id).is_some();
        if removed {
            info!(session_id, "session removed");
        }
        removed
    }

    /// Durable history for `session_id`, live or not.
    ///
    /// Store errors are logged and swallowed; the result is then empty.
    pub async fn history(&self, session_id: &str) -> Vec<Turn> {
        match self.history.query(session_id).await {
            Ok(turns) => turns,
            Err(err) => {
                warn!(session_id, error = %err, "could not retrieve history");
                Vec::new()
            }
        }
    }
}
