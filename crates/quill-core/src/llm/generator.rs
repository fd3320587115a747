//! TextGenerator trait definition.
//!
//! This is the abstraction over the generative-text backend the relay
//! forwards prompts to. Implementations live in quill-infra (e.g.,
//! `GeminiGenerator`). Failures arrive already classified as
//! [`GenerationError`] variants; the core never inspects error text.

use quill_types::error::GenerationError;

/// Trait for generation backends.
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition). The upstream
/// HTTP client owns request timeouts, so `generate` never hangs the caller
/// indefinitely -- a timeout surfaces as an error.
pub trait TextGenerator: Send + Sync {
    /// Human-readable backend name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a prompt and receive the generated text.
    fn generate(
        &self,
        prompt: &str,
    ) -> impl std::future::Future<Output = Result<String, GenerationError>> + Send;
}
