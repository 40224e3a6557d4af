use thiserror::Error;

/// Errors from durable-store operations (used by the `HistoryStore`
/// trait definition in converse-core).
///
/// Storage is best-effort for the conversation core: these errors are
/// logged and recovered there, never allowed to abort a reply.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("store connection error: {0}")]
    Connection(String),

    #[error("query error: {0}")]
    Query(String),
}
