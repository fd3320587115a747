//! Application error type mapping to HTTP status codes and envelope format.
//!
//! Generation failure kinds map to distinct caller-visible statuses:
//! credential 401, permission 403, quota 429, malformed request 400,
//! unknown 500.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use quill_types::error::{ChatError, GenerationError};

use crate::http::response::ApiResponse;

/// Application-level error that maps to HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// Errors from the chat orchestrator.
    Chat(ChatError),
    /// Authentication failure.
    Unauthorized(String),
    /// Validation error.
    Validation(String),
    /// Generic internal error.
    Internal(String),
}

impl From<ChatError> for AppError {
    fn from(e: ChatError) -> Self {
        AppError::Chat(e)
    }
}

impl AppError {
    fn parts(&self) -> (StatusCode, &'static str, String) {
        match self {
            AppError::Chat(ChatError::InvalidInput(msg)) => {
                (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
            }
            AppError::Chat(ChatError::SessionNotFound) => (
                StatusCode::NOT_FOUND,
                "SESSION_NOT_FOUND",
                "Session not found".to_string(),
            ),
            AppError::Chat(ChatError::Generation(err)) => {
                let (status, code) = match err {
                    GenerationError::InvalidCredential => {
                        (StatusCode::UNAUTHORIZED, "BACKEND_CREDENTIAL")
                    }
                    GenerationError::QuotaExceeded => {
                        (StatusCode::TOO_MANY_REQUESTS, "QUOTA_EXCEEDED")
                    }
                    GenerationError::PermissionDenied => {
                        (StatusCode::FORBIDDEN, "PERMISSION_DENIED")
                    }
                    GenerationError::InvalidArgument(_) => {
                        (StatusCode::BAD_REQUEST, "INVALID_REQUEST")
                    }
                    GenerationError::Unknown(_) => {
                        (StatusCode::INTERNAL_SERVER_ERROR, "GENERATION_ERROR")
                    }
                };
                (status, code, err.to_string())
            }
            AppError::Chat(ChatError::Persistence(err)) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "PERSISTENCE_ERROR",
                err.to_string(),
            ),
            AppError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg.clone())
            }
        }
    }

    /// Build the status and typed envelope for this error. The envelope is
    /// the same shape handlers use for success, with a fresh request id.
    fn envelope(&self) -> (StatusCode, ApiResponse<()>) {
        let (status, code, message) = self.parts();
        let request_id = uuid::Uuid::now_v7().to_string();
        (status, ApiResponse::error(code, &message, request_id, 0))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, envelope) = self.envelope();

        let body = serde_json::to_string(&envelope).unwrap_or_else(|_| {
            r#"{"errors":[{"code":"SERIALIZATION_ERROR","message":"Failed to serialize response"}]}"#.to_string()
        });

        (
            status,
            [(axum::http::header::CONTENT_TYPE, "application/json")],
            body,
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_types::error::RepositoryError;

    #[test]
    fn test_generation_kinds_map_to_distinct_statuses() {
        let cases = [
            (GenerationError::InvalidCredential, StatusCode::UNAUTHORIZED),
            (GenerationError::QuotaExceeded, StatusCode::TOO_MANY_REQUESTS),
            (GenerationError::PermissionDenied, StatusCode::FORBIDDEN),
            (
                GenerationError::InvalidArgument("bad".to_string()),
                StatusCode::BAD_REQUEST,
            ),
            (
                GenerationError::Unknown("boom".to_string()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            let (status, _, _) = AppError::Chat(ChatError::Generation(err)).parts();
            assert_eq!(status, expected);
        }
    }

    #[test]
    fn test_session_not_found_is_404() {
        let (status, code, _) = AppError::Chat(ChatError::SessionNotFound).parts();
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(code, "SESSION_NOT_FOUND");
    }

    #[test]
    fn test_error_envelope_matches_success_shape_with_request_id() {
        let (status, envelope) = AppError::Validation("bad input".to_string()).envelope();
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let json = serde_json::to_value(&envelope).unwrap();
        assert!(json.get("data").is_none());
        assert!(!json["meta"]["request_id"].as_str().unwrap().is_empty());
        assert!(!json["meta"]["timestamp"].as_str().unwrap().is_empty());
        assert_eq!(json["errors"][0]["code"], "VALIDATION_ERROR");
        assert_eq!(json["errors"][0]["message"], "bad input");
    }

    #[test]
    fn test_persistence_fault_is_500() {
        let err = AppError::Chat(ChatError::Persistence(RepositoryError::Connection));
        let (status, code, _) = err.parts();
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(code, "PERSISTENCE_ERROR");
    }
}
