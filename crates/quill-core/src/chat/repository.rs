//! ConversationRepository trait definition.
//!
//! Persistence operations for conversations and their turns. Implementations
//! live in quill-infra (e.g., `SqliteConversationRepository`) and must provide
//! atomic append semantics: two near-simultaneous appends to the same
//! conversation may never lose a turn or interleave partial updates.

use quill_types::chat::{Conversation, ConversationSummary, Turn};
use quill_types::error::RepositoryError;
use uuid::Uuid;

/// Repository trait for conversation and turn persistence.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
pub trait ConversationRepository: Send + Sync {
    /// Create a new conversation row.
    fn create(
        &self,
        conversation: &Conversation,
    ) -> impl std::future::Future<Output = Result<Conversation, RepositoryError>> + Send;

    /// Find an active conversation by `(owner_id, id)`.
    ///
    /// Soft-deleted conversations are treated as absent.
    fn find_active(
        &self,
        owner_id: &str,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<Conversation>, RepositoryError>> + Send;

    /// Append a turn to a conversation in a single atomic write.
    ///
    /// Inserts the turn, bumps `updated_at`, increments `message_count`, and
    /// -- when `derived_title` is given -- sets the title iff this was the
    /// conversation's first turn and no title exists yet. Returns
    /// `RepositoryError::NotFound` when the conversation does not exist.
    fn append_turn(
        &self,
        owner_id: &str,
        turn: &Turn,
        derived_title: Option<&str>,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Return the last `limit` turns in chronological order.
    fn history(
        &self,
        conversation_id: &Uuid,
        limit: u32,
    ) -> impl std::future::Future<Output = Result<Vec<Turn>, RepositoryError>> + Send;

    /// List active conversations for an owner, most recently updated first.
    ///
    /// Each summary carries a preview of the most recent turn.
    fn list_for_owner(
        &self,
        owner_id: &str,
    ) -> impl std::future::Future<Output = Result<Vec<ConversationSummary>, RepositoryError>> + Send;

    /// Soft-delete a conversation (`is_active = false`).
    ///
    /// Returns whether a matching active conversation existed.
    fn soft_delete(
        &self,
        owner_id: &str,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<bool, RepositoryError>> + Send;

    /// Count active conversations across all owners.
    fn count_conversations(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;

    /// Count turns across all conversations.
    fn count_messages(
        &self,
    ) -> impl std::future::Future<Output = Result<u64, RepositoryError>> + Send;
}
