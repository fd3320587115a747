use thiserror::Error;

/// Errors from the generation backend, classified at the provider boundary.
///
/// Classification happens on the HTTP status returned by the backend, not by
/// inspecting error message text.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("invalid backend credential")]
    InvalidCredential,

    #[error("backend quota exceeded")]
    QuotaExceeded,

    #[error("backend permission denied")]
    PermissionDenied,

    #[error("invalid request: {0}")]
    InvalidArgument(String),

    #[error("generation failed: {0}")]
    Unknown(String),
}

/// Errors from repository operations (used by trait definitions in quill-core).
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("database connection error")]
    Connection,

    #[error("query error: {0}")]
    Query(String),

    #[error("entity not found")]
    NotFound,

    #[error("conflict: {0}")]
    Conflict(String),
}

/// Errors surfaced by the chat orchestrator.
#[derive(Debug, Error)]
pub enum ChatError {
    /// Empty or malformed message, rejected before any side effect.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Explicit lookup of a conversation id that is absent or inactive.
    #[error("session not found")]
    SessionNotFound,

    /// The generation backend failed; always counted in daily aggregation.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Storage failure before a response could be produced.
    #[error("persistence fault: {0}")]
    Persistence(#[from] RepositoryError),
}
