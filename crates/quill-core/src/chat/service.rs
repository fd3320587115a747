//! Chat orchestrator.
//!
//! `ChatService` coordinates one exchange end to end: resolve the
//! conversation, persist the user turn, assemble the prompt from stored
//! history, invoke the generation backend, persist the assistant turn, and
//! record daily usage. Generic over the repository and generator traits so
//! the core never depends on quill-infra.

use std::time::Instant;

use tracing::{info, warn};
use uuid::Uuid;

use quill_types::chat::{Conversation, ConversationSummary, Turn, TurnRole};
use quill_types::error::ChatError;
use quill_types::usage::ExchangeSample;

use crate::chat::context::build_prompt;
use crate::chat::repository::ConversationRepository;
use crate::chat::title::derive_title;
use crate::llm::generator::TextGenerator;
use crate::usage::recorder::UsageRecorder;
use crate::usage::repository::UsageRepository;

/// Turns fetched for context assembly (includes the just-appended user turn).
const CONTEXT_HISTORY_TURNS: u32 = 10;

/// Default history page size for explicit history retrieval.
pub const DEFAULT_HISTORY_LIMIT: u32 = 20;

/// Result of one successful exchange.
#[derive(Debug, Clone)]
pub struct ChatReply {
    pub response_text: String,
    pub session_id: Uuid,
    pub response_time_ms: u64,
}

/// Orchestrates conversation lifecycle, prompt assembly, and generation.
pub struct ChatService<C, U, G>
where
    C: ConversationRepository,
    U: UsageRepository,
    G: TextGenerator,
{
    conversations: C,
    usage: UsageRecorder<U>,
    generator: G,
    default_history_limit: u32,
}

impl<C, U, G> ChatService<C, U, G>
where
    C: ConversationRepository,
    U: UsageRepository + 'static,
    G: TextGenerator,
{
    pub fn new(conversations: C, usage: UsageRecorder<U>, generator: G) -> Self {
        Self {
            conversations,
            usage,
            generator,
            default_history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Override the history page size used when the caller gives no limit.
    pub fn with_history_limit(mut self, limit: u32) -> Self {
        self.default_history_limit = limit;
        self
    }

    /// Access the conversation repository.
    pub fn conversations(&self) -> &C {
        &self.conversations
    }

    /// Access the usage recorder.
    pub fn usage(&self) -> &UsageRecorder<U> {
        &self.usage
    }

    /// Handle one inbound message.
    ///
    /// Resolves (or creates) the conversation, appends the user turn, builds
    /// the prompt from history excluding that turn, calls the backend,
    /// appends the assistant turn, and records usage. A generation failure
    /// is recorded (1 message, 1 error) and then surfaced; no retries.
    #[tracing::instrument(name = "handle_message", skip(self, message), fields(owner_id = %owner_id))]
    pub async fn handle_message(
        &self,
        owner_id: &str,
        message: &str,
        session_id: Option<Uuid>,
    ) -> Result<ChatReply, ChatError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(ChatError::InvalidInput(
                "message must be a non-empty string".to_string(),
            ));
        }

        let conversation = self.resolve(owner_id, session_id).await?;

        // Title is derived from the first user turn only; the repository
        // applies it under the same guard atomically.
        let derived_title = (conversation.message_count == 0 && conversation.title.is_none())
            .then(|| derive_title(message));

        let user_turn = Turn::new(conversation.id, TurnRole::User, message);
        self.conversations
            .append_turn(owner_id, &user_turn, derived_title.as_deref())
            .await?;

        let mut history = self
            .conversations
            .history(&conversation.id, CONTEXT_HISTORY_TURNS)
            .await?;
        // The just-appended user turn is the last entry; the prompt renders
        // it as "User: <message>" instead.
        if history.last().is_some_and(|t| t.id == user_turn.id) {
            history.pop();
        }

        let prompt = build_prompt(&history, message);

        let started = Instant::now();
        match self.generator.generate(&prompt).await {
            Ok(response_text) => {
                let response_time_ms = started.elapsed().as_millis() as u64;

                let assistant_turn =
                    Turn::new(conversation.id, TurnRole::Assistant, response_text.clone());
                if let Err(err) = self
                    .conversations
                    .append_turn(owner_id, &assistant_turn, None)
                    .await
                {
                    // Generation already succeeded; the caller still gets the
                    // response even if the assistant turn could not be saved.
                    warn!(
                        conversation_id = %conversation.id,
                        error = %err,
                        "failed to persist assistant turn"
                    );
                }

                self.usage
                    .record(ExchangeSample {
                        message_count: 2,
                        response_time_ms,
                        had_error: false,
                    })
                    .await;

                info!(
                    conversation_id = %conversation.id,
                    response_time_ms,
                    "exchange completed"
                );

                Ok(ChatReply {
                    response_text,
                    session_id: conversation.id,
                    response_time_ms,
                })
            }
            Err(err) => {
                let response_time_ms = started.elapsed().as_millis() as u64;

                self.usage
                    .record(ExchangeSample {
                        message_count: 1,
                        response_time_ms,
                        had_error: true,
                    })
                    .await;

                warn!(
                    conversation_id = %conversation.id,
                    backend = self.generator.name(),
                    error = %err,
                    "generation failed"
                );

                Err(ChatError::Generation(err))
            }
        }
    }

    /// List active conversations for an owner, most recently updated first.
    pub async fn list_conversations(
        &self,
        owner_id: &str,
    ) -> Result<Vec<ConversationSummary>, ChatError> {
        Ok(self.conversations.list_for_owner(owner_id).await?)
    }

    /// Fetch the last `limit` turns of an existing conversation.
    ///
    /// Unlike `handle_message`, which silently starts a new conversation for
    /// an unknown id, an explicit history lookup of an absent or inactive
    /// conversation is a client error.
    pub async fn conversation_history(
        &self,
        owner_id: &str,
        conversation_id: &Uuid,
        limit: Option<u32>,
    ) -> Result<Vec<Turn>, ChatError> {
        let conversation = self
            .conversations
            .find_active(owner_id, conversation_id)
            .await?
            .ok_or(ChatError::SessionNotFound)?;

        let limit = limit.unwrap_or(self.default_history_limit);
        Ok(self.conversations.history(&conversation.id, limit).await?)
    }

    /// Soft-delete a conversation; false when no active match existed.
    pub async fn delete_conversation(
        &self,
        owner_id: &str,
        conversation_id: &Uuid,
    ) -> Result<bool, ChatError> {
        Ok(self
            .conversations
            .soft_delete(owner_id, conversation_id)
            .await?)
    }

    /// Return the session for `session_id` when it is active and owned by
    /// the caller; otherwise create a fresh one with a generated id.
    async fn resolve(
        &self,
        owner_id: &str,
        session_id: Option<Uuid>,
    ) -> Result<Conversation, ChatError> {
        if let Some(id) = session_id
            && let Some(existing) = self.conversations.find_active(owner_id, &id).await?
        {
            return Ok(existing);
        }

        let conversation = Conversation::new(owner_id);
        let created = self.conversations.create(&conversation).await?;
        info!(conversation_id = %created.id, "conversation created");
        Ok(created)
    }
}
