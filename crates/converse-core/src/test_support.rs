//! Scripted collaborator doubles shared by the session and registry tests.

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU32, Ordering};

use converse_types::error::StorageError;
use converse_types::inference::{
    CompletionRequest, CompletionResponse, InferenceError, ModelInfo, StopReason, Usage,
};
use converse_types::turn::Turn;

use crate::history::HistoryStore;
use crate::inference::InferenceClient;

enum Script {
    Echo,
    Fail,
    FailFirst,
}

/// Inference double that echoes the last user message, fails always, or
/// fails only on its first call. Records the most recent request.
pub(crate) struct ScriptedInference {
    script: Script,
    calls: AtomicU32,
    last: Mutex<Option<CompletionRequest>>,
}

impl ScriptedInference {
    pub(crate) fn echoing() -> Self {
        Self::with_script(Script::Echo)
    }

    pub(crate) fn failing() -> Self {
        Self::with_script(Script::Fail)
    }

    pub(crate) fn failing_first() -> Self {
        Self::with_script(Script::FailFirst)
    }

    fn with_script(script: Script) -> Self {
        Self {
            script,
            calls: AtomicU32::new(0),
            last: Mutex::new(None),
        }
    }

    /// The most recent request passed to `generate`.
    pub(crate) fn last_request(&self) -> Option<CompletionRequest> {
        self.last.lock().unwrap().clone()
    }
}

impl InferenceClient for ScriptedInference {
    fn name(&self) -> &str {
        "scripted"
    }

    fn region(&self) -> &str {
        "us-east-1"
    }

    async fn generate(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, InferenceError> {
        *self.last.lock().unwrap() = Some(request.clone());
        let call = self.calls.fetch_add(1, Ordering::SeqCst);

        let fail = match self.script {
            Script::Echo => false,
            Script::Fail => true,
            Script::FailFirst => call == 0,
        };
        if fail {
            return Err(InferenceError::Provider {
                message: "scripted failure".to_string(),
            });
        }

        let last_user = request
            .messages
            .last()
            .map(|m| m.content.clone())
            .unwrap_or_default();

        Ok(CompletionResponse {
            id: format!("resp-{call}"),
            content: format!("echo: {last_user}"),
            model: request.model.clone(),
            stop_reason: StopReason::EndTurn,
            usage: Usage::default(),
        })
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>, InferenceError> {
        Ok(vec![ModelInfo {
            id: "scripted-model".to_string(),
            name: "Scripted".to_string(),
            provider: "test".to_string(),
        }])
    }
}

/// In-memory history store keyed by session id, in append order.
#[derive(Default)]
pub(crate) struct RecordingStore {
    turns: Mutex<HashMap<String, Vec<Turn>>>,
}

impl RecordingStore {
    /// All turns appended under `session_id`, in append order.
    pub(crate) fn turns(&self, session_id: &str) -> Vec<Turn> {
        self.turns
            .lock()
            .unwrap()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Pre-load a turn, as if persisted by an earlier process.
    pub(crate) fn seed(&self, session_id: &str, turn: Turn) {
        self.turns
            .lock()
            .unwrap()
            .entry(session_id.to_string())
            .or_default()
            .push(turn);
    }
}

impl HistoryStore for RecordingStore {
    async fn append(&self, session_id: &str, turn: &Turn) -> Result<(), StorageError> {
        self.turns
            .lock()
            .unwrap()
            .entry(session_id.to_string())
            .or_default()
            .push(turn.clone());
        Ok(())
    }

    async fn query(&self, session_id: &str) -> Result<Vec<Turn>, StorageError> {
        Ok(self.turns(session_id))
    }
}

/// History store that is always unreachable.
pub(crate) struct FailingStore;

impl HistoryStore for FailingStore {
    async fn append(&self, _session_id: &str, _turn: &Turn) -> Result<(), StorageError> {
        Err(StorageError::Connection("store unreachable".to_string()))
    }

    async fn query(&self, _session_id: &str) -> Result<Vec<Turn>, StorageError> {
        Err(StorageError::Connection("store unreachable".to_string()))
    }
}
