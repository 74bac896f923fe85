//! Provider trait for abstracting different LLM providers.

use std::time::Duration;

use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderValue};
use serde::{Deserialize, Serialize};

/// Default per-request timeout for provider HTTP clients.
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(120);

/// Unified usage information across providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Unified response type across providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderResponse {
    pub model: String,
    /// Generated text, `None` when the provider returned no text at all
    pub text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage: Option<ProviderUsage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

/// Provider error types
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[source] reqwest::Error),
    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("Invalid response format: {0}")]
    InvalidFormat(String),
}

impl From<reqwest::Error> for ProviderError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs may carry credentials; never keep them in the error
        Self::HttpError(err.without_url())
    }
}

impl ProviderError {
    /// Short machine-friendly name of the error variant, used as a log field.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::HttpError(err) if err.is_timeout() => "timeout",
            Self::HttpError(err) if err.is_connect() => "connect",
            Self::HttpError(_) => "http",
            Self::ApiError { .. } => "api",
            Self::Serialization(_) => "serialization",
            Self::InvalidFormat(_) => "invalid_format",
        }
    }

    /// Whether this is an expected, transient failure (network trouble,
    /// rate limiting, provider outage) rather than a misconfiguration or
    /// an unexpected payload.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError(err) => !err.is_builder() && !err.is_decode(),
            Self::ApiError { status, .. } => *status == 408 || *status == 429 || *status >= 500,
            Self::Serialization(_) | Self::InvalidFormat(_) => false,
        }
    }
}

/// Provider trait for different LLM backends
#[async_trait::async_trait]
pub trait Provider: Send + Sync {
    /// Provider name
    fn name(&self) -> &str;

    /// Current model
    fn model(&self) -> &str;

    /// Send a single-turn user message. Exactly one HTTP round-trip, no retry.
    async fn send_message(&self, content: &str) -> Result<ProviderResponse, ProviderError>;
}

/// Extract usable text from a response: `None` when missing or blank.
pub fn extract_text(response: &ProviderResponse) -> Option<String> {
    response
        .text
        .as_deref()
        .filter(|text| !text.trim().is_empty())
        .map(str::to_string)
}

/// Build the JSON HTTP client shared by the provider implementations.
pub(crate) fn build_http_client(timeout: Duration) -> reqwest::Client {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    reqwest::Client::builder()
        .default_headers(headers)
        .timeout(timeout)
        .build()
        .expect("Failed to build HTTP client")
}

/// First `max_chars` characters of a response body, for error messages.
pub(crate) fn body_preview(body: &str, max_chars: usize) -> &str {
    match body.char_indices().nth(max_chars) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}
