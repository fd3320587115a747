//! Session listing, history, and deletion handlers.

use std::time::Instant;

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use quill_types::chat::{ConversationSummary, Turn};
use quill_types::error::ChatError;

use crate::http::error::AppError;
use crate::http::extractors::auth::Owner;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Query parameters for history retrieval.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of most recent turns to return.
    pub limit: Option<u32>,
}

/// Response payload for a deletion.
#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub deleted: bool,
    pub session_id: Uuid,
}

fn parse_session_id(raw: &str) -> Result<Uuid, AppError> {
    raw.parse::<Uuid>()
        .map_err(|_| AppError::Validation(format!("invalid session id: {raw}")))
}

/// GET /api/v1/sessions - List the caller's active sessions.
pub async fn list_sessions(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
) -> Result<Json<ApiResponse<Vec<ConversationSummary>>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let sessions = state.chat_service.list_conversations(&owner_id).await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(sessions, request_id, elapsed)
        .with_link("self", "/api/v1/sessions");

    Ok(Json(resp))
}

/// GET /api/v1/sessions/{id}/messages - Fetch the most recent turns.
pub async fn session_history(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(id): Path<String>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<ApiResponse<Vec<Turn>>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session_id = parse_session_id(&id)?;
    let turns = state
        .chat_service
        .conversation_history(&owner_id, &session_id, query.limit)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(turns, request_id, elapsed)
        .with_link("self", &format!("/api/v1/sessions/{session_id}/messages"))
        .with_link("sessions", "/api/v1/sessions");

    Ok(Json(resp))
}

/// DELETE /api/v1/sessions/{id} - Soft-delete a session.
pub async fn delete_session(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<DeleteResponse>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session_id = parse_session_id(&id)?;
    let deleted = state
        .chat_service
        .delete_conversation(&owner_id, &session_id)
        .await?;
    if !deleted {
        return Err(AppError::Chat(ChatError::SessionNotFound));
    }
    let elapsed = start.elapsed().as_millis() as u64;

    let resp = ApiResponse::success(
        DeleteResponse {
            deleted: true,
            session_id,
        },
        request_id,
        elapsed,
    )
    .with_link("sessions", "/api/v1/sessions");

    Ok(Json(resp))
}
