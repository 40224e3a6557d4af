//! One live conversation session: transcript ownership and the
//! respond/history/summary operations.
//!
//! A [`ConversationSession`] owns the in-memory transcript for exactly one
//! session id, applies each exchange to both the transcript and the
//! durable [`HistoryStore`], and delegates generation to the
//! [`InferenceClient`]. Persistence is best-effort: a store failure is
//! logged and the conversation continues without durability.

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::warn;

use converse_types::inference::{
    ChatMessage, CompletionRequest, InferenceError,
};
use converse_types::session::SessionSummary;
use converse_types::turn::{Turn, TurnRole};

use crate::history::HistoryStore;
use crate::inference::InferenceClient;

/// Instruction turn seeded at the head of every transcript.
///
/// Never persisted to the history store; only user and assistant turns
/// are durable.
pub const SYSTEM_PROMPT: &str =
    "You are a helpful AI assistant powered by AWS. Be concise and friendly.";

/// Generation parameters applied to every completion request a session
/// sends.
#[derive(Debug, Clone)]
pub struct GenerationParams {
    pub max_tokens: u32,
    pub temperature: Option<f64>,
}

impl Default for GenerationParams {
    fn default() -> Self {
        Self {
            max_tokens: 2048,
            temperature: Some(0.7),
        }
    }
}

/// A single live conversation, bound to one session id and one model.
///
/// The transcript is guarded by an async mutex held across both
/// collaborator calls inside [`respond`](Self::respond), so concurrent
/// responds on the same session are processed strictly in arrival order
/// and can never interleave their appends. Different sessions have
/// independent locks and progress concurrently.
pub struct ConversationSession<I, H> {
    session_id: String,
    model_id: String,
    params: GenerationParams,
    inference: Arc<I>,
    history: Arc<H>,
    transcript: Mutex<Vec<Turn>>,
}

impl<I: InferenceClient, H: HistoryStore> ConversationSession<I, H> {
    /// Create a session with a fresh transcript seeded with the system
    /// instruction turn.
    ///
    /// The store may already hold turns for `session_id` from an earlier
    /// incarnation; they are deliberately NOT replayed into the new
    /// transcript. `history()` will still surface them.
    pub fn new(
        session_id: String,
        model_id: String,
        params: GenerationParams,
        inference: Arc<I>,
        history: Arc<H>,
    ) -> Self {
        Self {
            session_id,
            model_id,
            params,
            inference,
            history,
            transcript: Mutex::new(vec![Turn::system(SYSTEM_PROMPT)]),
        }
    }

    /// The opaque identifier of this session.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The model this session was created with. Fixed for its lifetime.
    pub fn model_id(&self) -> &str {
        &self.model_id
    }

    /// Region of the inference backend this session talks to.
    pub fn region(&self) -> &str {
        self.inference.region()
    }

    /// Produce an assistant reply for `user_input`, recording both sides
    /// of the exchange.
    ///
    /// On success the transcript gains exactly one user turn and one
    /// assistant turn, both persisted best-effort. On inference failure
    /// the user turn remains (in transcript and store), no assistant
    /// turn is recorded anywhere, and the session stays usable -- the
    /// error never corrupts the transcript or terminates the session.
    ///
    /// Input validation is the caller's responsibility; empty input is
    /// passed through to the backend unchanged.
    pub async fn respond(&self, user_input: &str) -> Result<String, InferenceError> {
        // Held across both awaits: serializes responds per session.
        let mut transcript = self.transcript.lock().await;

        let user_turn = Turn::user(user_input);
        transcript.push(user_turn.clone());
        self.persist(&user_turn).await;

        let request = self.build_request(&transcript);
        let response = self.inference.generate(&request).await?;

        let assistant_turn = Turn::assistant(response.content);
        transcript.push(assistant_turn.clone());
        self.persist(&assistant_turn).await;

        Ok(assistant_turn.content)
    }

    /// Fetch the durable history for `session_id` -- which may be a
    /// different session than this one, including one with no live
    /// `ConversationSession` at all.
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

    /// Summarize this session from the in-memory transcript. No I/O.
    pub async fn summary(&self) -> SessionSummary {
        let transcript = self.transcript.lock().await;
        let user_turns = transcript
            .iter()
            .filter(|t| t.role == TurnRole::User)
            .count() as u32;
        let assistant_turns = transcript
            .iter()
            .filter(|t| t.role == TurnRole::Assistant)
            .count() as u32;

        SessionSummary {
            session_id: self.session_id.clone(),
            model_id: self.model_id.clone(),
            region: self.inference.region().to_string(),
            user_turns,
            assistant_turns,
        }
    }

    /// Snapshot of the in-memory transcript, system turn included.
    pub async fn transcript(&self) -> Vec<Turn> {
        self.transcript.lock().await.clone()
    }

    /// Best-effort append to the durable store. Failure is logged; the
    /// conversation continues without persistence.
    async fn persist(&self, turn: &Turn) {
        if let Err(err) = self.history.append(&self.session_id, turn).await {
            warn!(
                session_id = %self.session_id,
                role = %turn.role,
                error = %err,
                "could not persist turn; conversation continues without durability"
            );
        }
    }

    /// Map the transcript onto a completion request: the system turn
    /// becomes the `system` field, everything else becomes messages.
    fn build_request(&self, transcript: &[Turn]) -> CompletionRequest {
        let system = transcript
            .iter()
            .find(|t| t.role == TurnRole::System)
            .map(|t| t.content.clone());

        let messages = transcript
            .iter()
            .filter(|t| t.role != TurnRole::System)
            .map(|t| ChatMessage {
                role: t.role,
                content: t.content.clone(),
            })
            .collect();

        CompletionRequest {
            model: self.model_id.clone(),
            messages,
            system,
            max_tokens: self.params.max_tokens,
            temperature: self.params.temperature,
        }
    }
}
