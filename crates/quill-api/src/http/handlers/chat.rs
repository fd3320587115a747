//! Chat exchange handler.

use std::time::Instant;

use axum::Json;
use axum::extract::State;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::http::error::AppError;
use crate::http::extractors::auth::Owner;
use crate::http::response::ApiResponse;
use crate::state::AppState;

/// Request body for a chat exchange.
#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    /// The user's message.
    pub message: String,
    /// Existing session to continue; omit to start a new one. An unknown
    /// or foreign id silently starts a fresh session.
    #[serde(default)]
    pub session_id: Option<String>,
}

/// Response payload for a chat exchange.
#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub session_id: Uuid,
    pub response_time_ms: u64,
}

/// POST /api/v1/chat - Send a message and get a generated reply.
pub async fn send_message(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Json(body): Json<ChatRequest>,
) -> Result<Json<ApiResponse<ChatResponse>>, AppError> {
    let start = Instant::now();
    let request_id = uuid::Uuid::now_v7().to_string();

    let session_id = match &body.session_id {
        Some(raw) => Some(raw.parse::<Uuid>().map_err(|_| {
            AppError::Validation(format!("invalid session_id: {raw}"))
        })?),
        None => None,
    };

    let reply = state
        .chat_service
        .handle_message(&owner_id, &body.message, session_id)
        .await?;
    let elapsed = start.elapsed().as_millis() as u64;

    let session_id = reply.session_id;
    let payload = ChatResponse {
        response: reply.response_text,
        session_id,
        response_time_ms: reply.response_time_ms,
    };

    let resp = ApiResponse::success(payload, request_id, elapsed)
        .with_link("self", "/api/v1/chat")
        .with_link(
            "session",
            &format!("/api/v1/sessions/{session_id}/messages"),
        );

    Ok(Json(resp))
}
