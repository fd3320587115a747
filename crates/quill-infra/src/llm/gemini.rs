//! GeminiGenerator -- concrete [`TextGenerator`] implementation for the
//! Google Gemini `generateContent` REST API.
//!
//! Failures are classified into typed [`GenerationError`] variants from the
//! HTTP status code and the structured `status` field of the error envelope,
//! never from error message text.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use quill_core::llm::generator::TextGenerator;
use quill_types::error::GenerationError;

/// Google Gemini generation backend.
///
/// Implements [`TextGenerator`] for the `generateContent` endpoint.
///
/// # API Key Security
///
/// The API key is stored as a [`SecretString`] and is only exposed when
/// constructing the request header. It never appears in Debug output,
/// Display output, or tracing logs.
pub struct GeminiGenerator {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
    model: String,
}

impl GeminiGenerator {
    /// Create a new Gemini generator.
    ///
    /// # Arguments
    ///
    /// * `api_key` - Gemini API key wrapped in SecretString
    /// * `model` - Model identifier (e.g., "gemini-1.5-flash")
    pub fn new(api_key: SecretString, model: String) -> Result<Self, GenerationError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| GenerationError::Unknown(format!("failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key,
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            model,
        })
    }

    /// The model this generator targets.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    fn url(&self) -> String {
        format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        )
    }
}

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiContent {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Serialize, Deserialize)]
struct GeminiPart {
    text: String,
}

#[derive(Debug, Deserialize)]
struct GeminiResponse {
    #[serde(default)]
    candidates: Vec<GeminiCandidate>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: GeminiContent,
}

/// Error envelope returned by the API on non-2xx responses.
#[derive(Debug, Deserialize)]
struct GeminiErrorEnvelope {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    #[serde(default)]
    message: String,
    /// Canonical gRPC status name, e.g. "INVALID_ARGUMENT".
    #[serde(default)]
    status: String,
}

/// Classify a non-success response into a typed [`GenerationError`].
///
/// The status code decides the kind; for 400 the structured `status` field
/// of the envelope disambiguates a rejected key from a malformed request.
fn classify_error(http_status: u16, body: &str) -> GenerationError {
    let envelope: Option<GeminiErrorEnvelope> = serde_json::from_str(body).ok();
    let (grpc_status, message) = match &envelope {
        Some(env) => (env.error.status.as_str(), env.error.message.clone()),
        None => ("", body.to_string()),
    };

    match http_status {
        401 => GenerationError::InvalidCredential,
        403 => GenerationError::PermissionDenied,
        429 => GenerationError::QuotaExceeded,
        400 => match grpc_status {
            // Gemini reports a rejected API key as a 400 with this status.
            "UNAUTHENTICATED" => GenerationError::InvalidCredential,
            "PERMISSION_DENIED" => GenerationError::PermissionDenied,
            "RESOURCE_EXHAUSTED" => GenerationError::QuotaExceeded,
            _ => GenerationError::InvalidArgument(message),
        },
        _ => GenerationError::Unknown(format!("HTTP {http_status}: {message}")),
    }
}

// GeminiGenerator intentionally does NOT derive Debug to prevent
// accidental exposure of internal state.

impl TextGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, prompt: &str) -> Result<String, GenerationError> {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: prompt.to_string(),
                }],
            }],
        };

        let response = self
            .client
            .post(self.url())
            .header("x-goog-api-key", self.api_key.expose_secret())
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| GenerationError::Unknown(format!("HTTP request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(classify_error(status.as_u16(), &error_body));
        }

        let gemini_resp: GeminiResponse = response
            .json()
            .await
            .map_err(|e| GenerationError::Unknown(format!("failed to parse response: {e}")))?;

        let text = gemini_resp
            .candidates
            .first()
            .map(|c| {
                c.content
                    .parts
                    .iter()
                    .map(|p| p.text.as_str())
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.is_empty() {
            return Err(GenerationError::Unknown(
                "backend returned no candidates".to_string(),
            ));
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_credential_errors() {
        assert!(matches!(
            classify_error(401, "{}"),
            GenerationError::InvalidCredential
        ));
        let body = r#"{"error": {"message": "API key not valid", "status": "UNAUTHENTICATED"}}"#;
        assert!(matches!(
            classify_error(400, body),
            GenerationError::InvalidCredential
        ));
    }

    #[test]
    fn test_classify_quota() {
        assert!(matches!(
            classify_error(429, "{}"),
            GenerationError::QuotaExceeded
        ));
    }

    #[test]
    fn test_classify_permission() {
        assert!(matches!(
            classify_error(403, "{}"),
            GenerationError::PermissionDenied
        ));
    }

    #[test]
    fn test_classify_invalid_argument_carries_message() {
        let body = r#"{"error": {"message": "contents must not be empty", "status": "INVALID_ARGUMENT"}}"#;
        match classify_error(400, body) {
            GenerationError::InvalidArgument(msg) => {
                assert_eq!(msg, "contents must not be empty");
            }
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[test]
    fn test_classify_unknown_with_unparseable_body() {
        match classify_error(500, "upstream exploded") {
            GenerationError::Unknown(msg) => {
                assert!(msg.contains("500"));
                assert!(msg.contains("upstream exploded"));
            }
            other => panic!("expected Unknown, got {other:?}"),
        }
    }

    #[test]
    fn test_request_serialization_shape() {
        let body = GeminiRequest {
            contents: vec![GeminiContent {
                parts: vec![GeminiPart {
                    text: "hello".to_string(),
                }],
            }],
        };
        let json = serde_json::to_value(&body).unwrap();
        assert_eq!(json["contents"][0]["parts"][0]["text"], "hello");
    }

    #[test]
    fn test_response_text_extraction() {
        let json = r#"{"candidates": [{"content": {"parts": [{"text": "Hi"}, {"text": " there"}]}}]}"#;
        let resp: GeminiResponse = serde_json::from_str(json).unwrap();
        let text: String = resp.candidates[0]
            .content
            .parts
            .iter()
            .map(|p| p.text.as_str())
            .collect();
        assert_eq!(text, "Hi there");
    }

    #[test]
    fn test_url_includes_model() {
        let generator = GeminiGenerator::new(
            SecretString::from("test-key-not-real"),
            "gemini-1.5-flash".to_string(),
        )
        .unwrap();
        assert_eq!(
            generator.url(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }
}
