//! SQLite history store implementation.
//!
//! Implements `HistoryStore` from `converse-core` using sqlx with split
//! read/write pools. One row per persisted turn, partitioned by session
//! id and sorted by timestamp -- the same shape as the managed keyed
//! store this port models.

use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use converse_core::history::HistoryStore;
use converse_types::error::StorageError;
use converse_types::turn::{Turn, TurnRole};

use super::pool::DatabasePool;

/// SQLite-backed implementation of `HistoryStore`.
pub struct SqliteHistoryStore {
    pool: DatabasePool,
}

impl SqliteHistoryStore {
    /// Create a new store backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Internal row type
// ---------------------------------------------------------------------------

struct TurnRow {
    id: String,
    role: String,
    content: String,
    timestamp: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            timestamp: row.try_get("timestamp")?,
        })
    }

    fn into_turn(self) -> Result<Turn, StorageError> {
        Ok(Turn {
            id: parse_uuid(&self.id)?,
            role: parse_role(&self.role)?,
            content: self.content,
            timestamp: parse_datetime(&self.timestamp)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_uuid(s: &str) -> Result<Uuid, StorageError> {
    s.parse::<Uuid>()
        .map_err(|e| StorageError::Query(format!("invalid UUID: {e}")))
}

fn parse_role(s: &str) -> Result<TurnRole, StorageError> {
    s.parse::<TurnRole>().map_err(StorageError::Query)
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, StorageError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| StorageError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// HistoryStore impl
// ---------------------------------------------------------------------------

impl HistoryStore for SqliteHistoryStore {
    async fn append(&self, session_id: &str, turn: &Turn) -> Result<(), StorageError> {
        sqlx::query(
            r#"INSERT INTO conversation_turns (id, session_id, role, content, timestamp)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(turn.id.to_string())
        .bind(session_id)
        .bind(turn.role.to_string())
        .bind(&turn.content)
        .bind(format_datetime(&turn.timestamp))
        .execute(&self.pool.writer)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        Ok(())
    }

    async fn query(&self, session_id: &str) -> Result<Vec<Turn>, StorageError> {
        let rows = sqlx::query(
            r#"SELECT id, role, content, timestamp FROM conversation_turns
               WHERE session_id = ?
               ORDER BY timestamp ASC, id ASC"#,
        )
        .bind(session_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| StorageError::Query(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let r = TurnRow::from_row(row).map_err(|e| StorageError::Query(e.to_string()))?;
            turns.push(r.into_turn()?);
        }
        Ok(turns)
    }
}
