//! Conversation turn types for Converse.
//!
//! A [`Turn`] is one message exchanged in a conversation, tagged with its
//! speaker role. Turns are immutable once created; transcripts and the
//! durable history are append-only sequences of them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Role of the speaker of a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    System,
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::System => write!(f, "system"),
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "system" => Ok(TurnRole::System),
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// A single message within a conversation.
///
/// Immutable once created. The `id` is a UUID v7, so ids created later
/// sort after ids created earlier; `timestamp` carries the wall-clock
/// instant used as the sort key in the durable store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub role: TurnRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Turn {
    /// Create a turn with the given role, stamped now.
    pub fn new(role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    /// Create a system-instruction turn.
    pub fn system(content: impl Into<String>) -> Self {
        Self::new(TurnRole::System, content)
    }

    /// Create a user turn.
    pub fn user(content: impl Into<String>) -> Self {
        Self::new(TurnRole::User, content)
    }

    /// Create an assistant turn.
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(TurnRole::Assistant, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_role_roundtrip() {
        for role in [TurnRole::System, TurnRole::User, TurnRole::Assistant] {
            let s = role.to_string();
            let parsed: TurnRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_turn_role_serde() {
        let role = TurnRole::Assistant;
        let json = serde_json::to_string(&role).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: TurnRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TurnRole::Assistant);
    }

    #[test]
    fn test_turn_role_invalid() {
        assert!("moderator".parse::<TurnRole>().is_err());
    }

    #[test]
    fn test_turn_constructors() {
        let turn = Turn::user("hello");
        assert_eq!(turn.role, TurnRole::User);
        assert_eq!(turn.content, "hello");

        assert_eq!(Turn::system("be brief").role, TurnRole::System);
        assert_eq!(Turn::assistant("hi").role, TurnRole::Assistant);
    }

    #[test]
    fn test_turn_ids_are_time_ordered() {
        // UUID v7 ids sort in creation order.
        let a = Turn::user("first");
        let b = Turn::user("second");
        assert!(a.id < b.id);
        assert!(a.timestamp <= b.timestamp);
    }

    #[test]
    fn test_turn_serialize() {
        let turn = Turn::user("What is AWS Lambda?");
        let json = serde_json::to_string(&turn).unwrap();
        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("What is AWS Lambda?"));
    }
}
