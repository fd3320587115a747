//! Conversation and turn types for Quill.
//!
//! A `Conversation` is one chat thread owned by a single caller. It owns an
//! ordered sequence of `Turn`s, appended by the orchestrator and never edited
//! or reordered afterwards.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use std::fmt;
use std::str::FromStr;

/// Role of a turn within a conversation.
///
/// Maps to the CHECK constraint in the SQLite schema:
/// `CHECK (role IN ('user', 'assistant'))`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnRole {
    User,
    Assistant,
}

impl fmt::Display for TurnRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TurnRole::User => write!(f, "user"),
            TurnRole::Assistant => write!(f, "assistant"),
        }
    }
}

impl FromStr for TurnRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "user" => Ok(TurnRole::User),
            "assistant" => Ok(TurnRole::Assistant),
            other => Err(format!("invalid turn role: '{other}'")),
        }
    }
}

/// A single conversation thread owned by one caller.
///
/// Identity is the composite `(owner_id, id)`. The title is set exactly once,
/// derived from the first user turn; until then it is `None`. Conversations
/// are only ever soft-deleted (`is_active = false`), never physically removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Conversation {
    pub id: Uuid,
    pub owner_id: String,
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub message_count: u32,
    pub is_active: bool,
}

impl Conversation {
    /// Create a fresh, empty, active conversation for an owner.
    ///
    /// The id is a freshly generated UUID v7 (time-sortable).
    pub fn new(owner_id: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::now_v7(),
            owner_id: owner_id.into(),
            title: None,
            created_at: now,
            updated_at: now,
            message_count: 0,
            is_active: true,
        }
    }
}

/// One immutable turn within a conversation.
///
/// The id is a UUID v7, so ids sort in append order. Timestamps are
/// server-assigned at append time, never supplied by the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: Uuid,
    pub conversation_id: Uuid,
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Turn {
    /// Create a turn with a fresh id and the current server time.
    pub fn new(conversation_id: Uuid, role: TurnRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::now_v7(),
            conversation_id,
            role,
            content: content.into(),
            created_at: Utc::now(),
        }
    }
}

/// Preview of the most recent turn, embedded in conversation listings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurnPreview {
    pub role: TurnRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Listing entry for one conversation.
///
/// `title` falls back to a default for conversations that have not yet
/// received their first user turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    pub id: Uuid,
    pub title: String,
    pub message_count: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_turn: Option<TurnPreview>,
}

/// Default title for conversations before the first user turn names them.
pub const DEFAULT_TITLE: &str = "New Conversation";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_turn_role_roundtrip() {
        for role in [TurnRole::User, TurnRole::Assistant] {
            let s = role.to_string();
            let parsed: TurnRole = s.parse().unwrap();
            assert_eq!(role, parsed);
        }
    }

    #[test]
    fn test_turn_role_serde() {
        let json = serde_json::to_string(&TurnRole::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
        let parsed: TurnRole = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, TurnRole::Assistant);
    }

    #[test]
    fn test_new_conversation_defaults() {
        let conv = Conversation::new("owner-1");
        assert_eq!(conv.owner_id, "owner-1");
        assert!(conv.title.is_none());
        assert!(conv.is_active);
        assert_eq!(conv.message_count, 0);
        assert_eq!(conv.created_at, conv.updated_at);
    }

    #[test]
    fn test_turn_ids_sort_in_append_order() {
        let conv = Conversation::new("owner-1");
        let a = Turn::new(conv.id, TurnRole::User, "first");
        let b = Turn::new(conv.id, TurnRole::Assistant, "second");
        // UUID v7 ids are time-sortable.
        assert!(a.id < b.id);
    }

    #[test]
    fn test_conversation_serialize() {
        let conv = Conversation::new("owner-1");
        let json = serde_json::to_string(&conv).unwrap();
        assert!(json.contains("\"is_active\":true"));
    }
}
