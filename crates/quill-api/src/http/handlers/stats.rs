//! Aggregate statistics handler.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use quill_core::chat::repository::ConversationRepository;
use quill_core::usage::repository::UsageRepository;
use quill_types::error::ChatError;
use quill_types::usage::DailyUsage;

use crate::http::error::AppError;
use crate::http::extractors::auth::Owner;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Aggregated statistics payload.
#[derive(Debug, Serialize)]
pub struct StatsResponse {
    /// Active conversations across all owners.
    pub total_conversations: u64,
    /// Turns stored across all conversations.
    pub total_messages: u64,
    /// Today's roll-up (UTC day). Zeroed when no exchange happened yet.
    pub today: TodayStats,
}

#[derive(Debug, Serialize)]
pub struct TodayStats {
    pub day: chrono::NaiveDate,
    pub total_messages: u64,
    pub error_count: u64,
    /// Mean generation latency in milliseconds; absent until the first
    /// successful exchange of the day.
    pub average_response_time_ms: Option<u64>,
}

impl From<DailyUsage> for TodayStats {
    fn from(usage: DailyUsage) -> Self {
        Self {
            day: usage.day,
            total_messages: usage.total_messages,
            error_count: usage.error_count,
            average_response_time_ms: usage.average_response_time_ms(),
        }
    }
}

/// GET /api/v1/stats - Aggregate counts plus today's usage roll-up.
pub async fn get_stats(
    State(state): State<AppState>,
    _owner: Owner,
) -> Result<Json<ApiResponse<StatsResponse>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let conversations = state.chat_service.conversations();
    let total_conversations = conversations
        .count_conversations()
        .await
        .map_err(|e| AppError::Chat(ChatError::Persistence(e)))?;
    let total_messages = conversations
        .count_messages()
        .await
        .map_err(|e| AppError::Chat(ChatError::Persistence(e)))?;

    let today = chrono::Utc::now().date_naive();
    let usage = state
        .chat_service
        .usage()
        .repo()
        .usage_for_day(today)
        .await
        .map_err(|e| AppError::Chat(ChatError::Persistence(e)))?
        .unwrap_or_else(|| DailyUsage::empty(today));

    let elapsed = start.elapsed().as_millis() as u64;
    let payload = StatsResponse {
        total_conversations,
        total_messages,
        today: usage.into(),
    };

    let resp = ApiResponse::success(payload, request_id, elapsed)
        .with_link("self", "/api/v1/stats");

    Ok(Json(resp))
}
