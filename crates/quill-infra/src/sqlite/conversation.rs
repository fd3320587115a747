//! SQLite conversation repository implementation.
//!
//! Implements `ConversationRepository` from `quill-core` using sqlx with
//! split read/write pools: raw queries, private Row structs, and a single
//! transaction per turn append. The writer pool has one connection, so
//! appends to the same conversation are serialized and never lose a turn.

use quill_core::chat::repository::ConversationRepository;
use quill_types::chat::{Conversation, ConversationSummary, Turn, TurnPreview, TurnRole};
use quill_types::error::RepositoryError;
use chrono::{DateTime, Utc};
use sqlx::Row;
use uuid::Uuid;

use super::pool::DatabasePool;

/// SQLite-backed implementation of `ConversationRepository`.
pub struct SqliteConversationRepository {
    pool: DatabasePool,
}

impl SqliteConversationRepository {
    /// Create a new repository backed by the given database pool.
    pub fn new(pool: DatabasePool) -> Self {
        Self { pool }
    }
}

// ---------------------------------------------------------------------------
// Private Row types for SQLite-to-domain mapping
// ---------------------------------------------------------------------------

/// Internal row type for mapping SQLite rows to domain Conversation.
struct ConversationRow {
    id: String,
    owner_id: String,
    title: Option<String>,
    created_at: String,
    updated_at: String,
    message_count: i64,
    is_active: i64,
}

impl ConversationRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            owner_id: row.try_get("owner_id")?,
            title: row.try_get("title")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
            message_count: row.try_get("message_count")?,
            is_active: row.try_get("is_active")?,
        })
    }

    fn into_conversation(self) -> Result<Conversation, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;
        let created_at = parse_datetime(&self.created_at)?;
        let updated_at = parse_datetime(&self.updated_at)?;

        Ok(Conversation {
            id,
            owner_id: self.owner_id,
            title: self.title,
            created_at,
            updated_at,
            message_count: self.message_count as u32,
            is_active: self.is_active != 0,
        })
    }
}

/// Internal row type for mapping SQLite rows to domain Turn.
struct TurnRow {
    id: String,
    conversation_id: String,
    role: String,
    content: String,
    created_at: String,
}

impl TurnRow {
    fn from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        Ok(Self {
            id: row.try_get("id")?,
            conversation_id: row.try_get("conversation_id")?,
            role: row.try_get("role")?,
            content: row.try_get("content")?,
            created_at: row.try_get("created_at")?,
        })
    }

    fn into_turn(self) -> Result<Turn, RepositoryError> {
        let id = Uuid::parse_str(&self.id)
            .map_err(|e| RepositoryError::Query(format!("invalid turn id: {e}")))?;
        let conversation_id = Uuid::parse_str(&self.conversation_id)
            .map_err(|e| RepositoryError::Query(format!("invalid conversation_id: {e}")))?;
        let role: TurnRole = self
            .role
            .parse()
            .map_err(|e: String| RepositoryError::Query(e))?;
        let created_at = parse_datetime(&self.created_at)?;

        Ok(Turn {
            id,
            conversation_id,
            role,
            content: self.content,
            created_at,
        })
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, RepositoryError> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| RepositoryError::Query(format!("invalid datetime: {e}")))
}

fn format_datetime(dt: &DateTime<Utc>) -> String {
    dt.to_rfc3339()
}

// ---------------------------------------------------------------------------
// ConversationRepository implementation
// ---------------------------------------------------------------------------

impl ConversationRepository for SqliteConversationRepository {
    async fn create(&self, conversation: &Conversation) -> Result<Conversation, RepositoryError> {
        sqlx::query(
            r#"INSERT INTO conversations (id, owner_id, title, created_at, updated_at, message_count, is_active)
               VALUES (?, ?, ?, ?, ?, ?, ?)"#,
        )
        .bind(conversation.id.to_string())
        .bind(&conversation.owner_id)
        .bind(&conversation.title)
        .bind(format_datetime(&conversation.created_at))
        .bind(format_datetime(&conversation.updated_at))
        .bind(conversation.message_count as i64)
        .bind(conversation.is_active as i64)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(conversation.clone())
    }

    async fn find_active(
        &self,
        owner_id: &str,
        id: &Uuid,
    ) -> Result<Option<Conversation>, RepositoryError> {
        let row = sqlx::query(
            "SELECT * FROM conversations WHERE id = ? AND owner_id = ? AND is_active = 1",
        )
        .bind(id.to_string())
        .bind(owner_id)
        .fetch_optional(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        match row {
            Some(row) => {
                let conv_row = ConversationRow::from_row(&row)
                    .map_err(|e| RepositoryError::Query(e.to_string()))?;
                Ok(Some(conv_row.into_conversation()?))
            }
            None => Ok(None),
        }
    }

    async fn append_turn(
        &self,
        owner_id: &str,
        turn: &Turn,
        derived_title: Option<&str>,
    ) -> Result<(), RepositoryError> {
        let mut tx = self
            .pool
            .writer
            .begin()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let result = sqlx::query(
            r#"UPDATE conversations
               SET updated_at = ?, message_count = message_count + 1
               WHERE id = ? AND owner_id = ? AND is_active = 1"#,
        )
        .bind(format_datetime(&turn.created_at))
        .bind(turn.conversation_id.to_string())
        .bind(owner_id)
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if result.rows_affected() == 0 {
            // Rolls back on drop.
            return Err(RepositoryError::NotFound);
        }

        sqlx::query(
            r#"INSERT INTO turns (id, conversation_id, role, content, created_at)
               VALUES (?, ?, ?, ?, ?)"#,
        )
        .bind(turn.id.to_string())
        .bind(turn.conversation_id.to_string())
        .bind(turn.role.to_string())
        .bind(&turn.content)
        .bind(format_datetime(&turn.created_at))
        .execute(&mut *tx)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        if let Some(title) = derived_title {
            // message_count was already incremented above, so "= 1" means
            // this turn is the conversation's first. Combined with the
            // title IS NULL guard, the title is set exactly once.
            sqlx::query(
                r#"UPDATE conversations
                   SET title = ?
                   WHERE id = ? AND title IS NULL AND message_count = 1"#,
            )
            .bind(title)
            .bind(turn.conversation_id.to_string())
            .execute(&mut *tx)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;
        }

        tx.commit()
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(())
    }

    async fn history(
        &self,
        conversation_id: &Uuid,
        limit: u32,
    ) -> Result<Vec<Turn>, RepositoryError> {
        // Fetch the newest `limit` turns, then flip back to chronological.
        let rows = sqlx::query(
            "SELECT * FROM turns WHERE conversation_id = ? ORDER BY id DESC LIMIT ?",
        )
        .bind(conversation_id.to_string())
        .bind(limit as i64)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut turns = Vec::with_capacity(rows.len());
        for row in &rows {
            let turn_row =
                TurnRow::from_row(row).map_err(|e| RepositoryError::Query(e.to_string()))?;
            turns.push(turn_row.into_turn()?);
        }
        turns.reverse();

        Ok(turns)
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
    ) -> Result<Vec<ConversationSummary>, RepositoryError> {
        let rows = sqlx::query(
            r#"SELECT c.id, c.title, c.message_count, c.created_at, c.updated_at,
                      t.role AS last_role, t.content AS last_content, t.created_at AS last_created_at
               FROM conversations c
               LEFT JOIN turns t ON t.id = (
                   SELECT id FROM turns WHERE conversation_id = c.id ORDER BY id DESC LIMIT 1
               )
               WHERE c.owner_id = ? AND c.is_active = 1
               ORDER BY c.updated_at DESC"#,
        )
        .bind(owner_id)
        .fetch_all(&self.pool.reader)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let mut summaries = Vec::with_capacity(rows.len());
        for row in &rows {
            summaries.push(summary_from_row(row)?);
        }

        Ok(summaries)
    }

    async fn soft_delete(&self, owner_id: &str, id: &Uuid) -> Result<bool, RepositoryError> {
        let result = sqlx::query(
            r#"UPDATE conversations
               SET is_active = 0, updated_at = ?
               WHERE id = ? AND owner_id = ? AND is_active = 1"#,
        )
        .bind(format_datetime(&Utc::now()))
        .bind(id.to_string())
        .bind(owner_id)
        .execute(&self.pool.writer)
        .await
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_conversations(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM conversations WHERE is_active = 1")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }

    async fn count_messages(&self) -> Result<u64, RepositoryError> {
        let row = sqlx::query("SELECT COUNT(*) as cnt FROM turns")
            .fetch_one(&self.pool.reader)
            .await
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        let count: i64 = row
            .try_get("cnt")
            .map_err(|e| RepositoryError::Query(e.to_string()))?;

        Ok(count as u64)
    }
}

fn summary_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<ConversationSummary, RepositoryError> {
    let id: String = row
        .try_get("id")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let id = Uuid::parse_str(&id)
        .map_err(|e| RepositoryError::Query(format!("invalid conversation id: {e}")))?;
    let title: Option<String> = row
        .try_get("title")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let message_count: i64 = row
        .try_get("message_count")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let created_at: String = row
        .try_get("created_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let updated_at: String = row
        .try_get("updated_at")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;

    let last_role: Option<String> = row
        .try_get("last_role")
        .map_err(|e| RepositoryError::Query(e.to_string()))?;
    let last_turn = match last_role {
        Some(role) => {
            let content: String = row
                .try_get("last_content")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            let turn_created_at: String = row
                .try_get("last_created_at")
                .map_err(|e| RepositoryError::Query(e.to_string()))?;
            Some(TurnPreview {
                role: role
                    .parse()
                    .map_err(|e: String| RepositoryError::Query(e))?,
                content,
                created_at: parse_datetime(&turn_created_at)?,
            })
        }
        None => None,
    };

    Ok(ConversationSummary {
        id,
        title: title.unwrap_or_else(|| quill_types::chat::DEFAULT_TITLE.to_string()),
        message_count: message_count as u32,
        created_at: parse_datetime(&created_at)?,
        updated_at: parse_datetime(&updated_at)?,
        last_turn,
    })
}
