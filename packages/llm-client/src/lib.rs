//! Resilient client for an OpenAI-style Responses API.
//!
//! A minimal client with no domain-specific logic. Every caller in the
//! enrichment pipeline goes through [`LlmClient::generate`], which handles:
//!
//! - optional system prompt and web-search tool
//! - retry with exponential backoff and jitter on rate limits (HTTP 429
//!   only; any other non-2xx status is a hard failure)
//! - output-text extraction from the provider's structured envelope, where
//!   a successful response without textual content yields an empty string
//!
//! # Example
//!
//! ```rust,ignore
//! use llm_client::{LlmClient, TextRequest};
//!
//! let client = LlmClient::from_env()?;
//!
//! let text = client
//!     .generate(
//!         TextRequest::new("gpt-4o", "Summarize this page: ...")
//!             .with_temperature(0.3)
//!             .with_max_output_tokens(2048),
//!     )
//!     .await?;
//! ```

pub mod error;
pub mod types;

pub use error::{LlmError, Result};
pub use types::{TextRequest, TextResponse, Usage};

use rand::Rng;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

use types::{ResponsesEnvelope, ResponsesRequest};

/// Maximum retry attempts on a rate-limited response.
const MAX_RATE_LIMIT_RETRIES: u32 = 5;

/// Base delay for exponential backoff.
const BACKOFF_BASE_MS: u64 = 500;

/// Responses API client.
#[derive(Clone)]
pub struct LlmClient {
    http_client: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    /// Create a new client with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            http_client: Client::new(),
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    /// Create from environment variable `OPENAI_API_KEY`.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY")
            .map_err(|_| LlmError::Config("OPENAI_API_KEY not set".into()))?;
        Ok(Self::new(api_key))
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set a custom HTTP client.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http_client = client;
        self
    }

    /// Generate text for a request.
    ///
    /// Convenience over [`generate_full`](Self::generate_full) that discards
    /// the response id and usage.
    pub async fn generate(&self, request: TextRequest) -> Result<String> {
        Ok(self.generate_full(request).await?.text)
    }

    /// Generate text, returning the full response including the provider
    /// response id for multi-turn continuation.
    pub async fn generate_full(&self, request: TextRequest) -> Result<TextResponse> {
        self.send_with_retry(&request, None).await
    }

    /// Generate a follow-up turn threaded on a previous response id.
    ///
    /// Used by chat-style callers; the enrichment pipeline itself issues
    /// single-turn requests.
    pub async fn generate_with_previous_response(
        &self,
        request: TextRequest,
        previous_response_id: &str,
    ) -> Result<TextResponse> {
        self.send_with_retry(&request, Some(previous_response_id))
            .await
    }

    async fn send_with_retry(
        &self,
        request: &TextRequest,
        previous_response_id: Option<&str>,
    ) -> Result<TextResponse> {
        let body = ResponsesRequest::from_request(request, previous_response_id);
        let mut attempt: u32 = 0;

        loop {
            let start = std::time::Instant::now();

            let response = self
                .http_client
                .post(format!("{}/responses", self.base_url))
                .header("Authorization", format!("Bearer {}", self.api_key))
                .header("Content-Type", "application/json")
                .json(&body)
                .send()
                .await
                .map_err(|e| {
                    warn!(error = %e, "LLM request failed");
                    LlmError::Network(e.to_string())
                })?;

            let status = response.status();

            if status.as_u16() == 429 {
                attempt += 1;
                if attempt > MAX_RATE_LIMIT_RETRIES {
                    warn!(attempts = attempt, "Rate limit retries exhausted");
                    return Err(LlmError::RateLimited { attempts: attempt });
                }

                let delay = backoff_delay(attempt);
                warn!(
                    attempt = attempt,
                    delay_ms = delay.as_millis() as u64,
                    "Rate limited, backing off"
                );
                tokio::time::sleep(delay).await;
                continue;
            }

            if !status.is_success() {
                let error_text = response.text().await.unwrap_or_default();
                warn!(status = %status, error = %error_text, "LLM API error");
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: error_text,
                });
            }

            let envelope: ResponsesEnvelope = response
                .json()
                .await
                .map_err(|e| LlmError::Parse(e.to_string()))?;

            let text = envelope.output_text();

            debug!(
                model = %request.model,
                duration_ms = start.elapsed().as_millis() as u64,
                output_chars = text.len(),
                "LLM generation complete"
            );

            return Ok(TextResponse {
                text,
                response_id: envelope.id,
                usage: envelope.usage,
            });
        }
    }
}

/// Exponential backoff with jitter: `base * 2^(attempt-1)` plus up to half
/// the base in random jitter.
fn backoff_delay(attempt: u32) -> Duration {
    let exp = BACKOFF_BASE_MS.saturating_mul(1u64 << (attempt - 1).min(10));
    let jitter = rand::thread_rng().gen_range(0..=BACKOFF_BASE_MS / 2);
    Duration::from_millis(exp + jitter)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_builder() {
        let client = LlmClient::new("sk-test").with_base_url("https://custom.api.com");

        assert_eq!(client.api_key, "sk-test");
        assert_eq!(client.base_url, "https://custom.api.com");
    }

    #[test]
    fn test_backoff_grows_exponentially() {
        let first = backoff_delay(1);
        let fourth = backoff_delay(4);

        assert!(first.as_millis() >= BACKOFF_BASE_MS as u128);
        assert!(first.as_millis() <= (BACKOFF_BASE_MS + BACKOFF_BASE_MS / 2) as u128);
        assert!(fourth.as_millis() >= (BACKOFF_BASE_MS * 8) as u128);
    }
}
