//! Session summary types for Converse.

use serde::{Deserialize, Serialize};

/// A point-in-time summary of one live conversation session.
///
/// Counts are taken from the in-memory transcript only; the system
/// instruction turn is not counted. No I/O is involved in producing one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub model_id: String,
    pub region: String,
    pub user_turns: u32,
    pub assistant_turns: u32,
}
