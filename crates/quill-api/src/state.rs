//! Application state wiring all services together.
//!
//! AppState holds the concrete service instances used by both the CLI and
//! the REST API. The core service is generic over repository/generator
//! traits, but AppState pins it to the concrete infra implementations. All
//! handles are explicitly constructed here -- no ambient singletons.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use secrecy::SecretString;

use quill_core::chat::service::ChatService;
use quill_core::usage::recorder::UsageRecorder;
use quill_infra::config::{load_global_config, resolve_data_dir};
use quill_infra::llm::gemini::GeminiGenerator;
use quill_infra::sqlite::conversation::SqliteConversationRepository;
use quill_infra::sqlite::pool::DatabasePool;
use quill_infra::sqlite::usage::SqliteUsageRepository;
use quill_types::config::GlobalConfig;

/// Concrete type alias for the service generics pinned to infra implementations.
pub type ConcreteChatService =
    ChatService<SqliteConversationRepository, SqliteUsageRepository, GeminiGenerator>;

/// Shared application state holding all services.
///
/// Used by both CLI commands and REST API handlers.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub config: GlobalConfig,
    pub data_dir: PathBuf,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to DB, wire services.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();

        // Ensure data directory exists
        tokio::fs::create_dir_all(&data_dir).await?;

        let config = load_global_config(&data_dir).await;

        // Initialize database
        let db_url = format!("sqlite://{}?mode=rwc", data_dir.join("quill.db").display());
        let db_pool = DatabasePool::new(&db_url).await?;

        // Generation backend credential comes from the environment, never
        // from config files on disk.
        let api_key = std::env::var("GEMINI_API_KEY")
            .map(SecretString::from)
            .context("GEMINI_API_KEY is not set")?;
        let generator = GeminiGenerator::new(api_key, config.model.clone())
            .map_err(|e| anyhow::anyhow!("failed to build generation client: {e}"))?;

        // Wire the chat service with its repositories
        let conversation_repo = SqliteConversationRepository::new(db_pool.clone());
        let usage_repo = SqliteUsageRepository::new(db_pool.clone());
        let chat_service = ChatService::new(
            conversation_repo,
            UsageRecorder::new(usage_repo),
            generator,
        )
        .with_history_limit(config.history_limit);

        Ok(Self {
            chat_service: Arc::new(chat_service),
            config,
            data_dir,
            db_pool,
        })
    }
}
