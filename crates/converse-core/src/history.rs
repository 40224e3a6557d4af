//! HistoryStore trait definition.
//!
//! The abstraction over the external durable keyed store that records
//! conversation turns: partition key = session id, sort key = timestamp.
//! Follows the same RPITIT pattern as [`crate::inference::InferenceClient`].
//! Implementations live in converse-infra (e.g., `SqliteHistoryStore`).

use converse_types::error::StorageError;
use converse_types::turn::Turn;

/// Repository trait for durable conversation history.
///
/// The conversation core treats both operations as best-effort: append
/// failures never abort a reply, and query failures surface as an empty
/// history. Neither participates in any transaction with inference.
pub trait HistoryStore: Send + Sync {
    /// Append one turn to the durable history for a session.
    fn append(
        &self,
        session_id: &str,
        turn: &Turn,
    ) -> impl std::future::Future<Output = Result<(), StorageError>> + Send;

    /// Fetch all turns recorded for a session, ordered by timestamp ASC.
    ///
    /// An unknown session id yields an empty list, not an error.
    fn query(
        &self,
        session_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, StorageError>> + Send;
}
