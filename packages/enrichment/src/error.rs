//! Typed errors for the enrichment pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`) to keep the failure
//! taxonomy explicit: transport and parse failures are recovered locally by
//! the components that hit them; only authorization, not-found and
//! cancellation surface to callers.

use thiserror::Error;
use uuid::Uuid;

/// Errors that can occur during enrichment operations.
#[derive(Debug, Error)]
pub enum EnrichmentError {
    /// Crawl operation failed
    #[error("crawl failed: {0}")]
    Crawl(#[from] CrawlError),

    /// LLM provider call failed
    #[error("LLM error: {0}")]
    Llm(#[from] llm_client::LlmError),

    /// Batch caller does not own one or more target entities.
    ///
    /// Fatal for the whole batch: raised before any per-item work begins.
    #[error("caller {owner_id} does not own entity {entity_id}")]
    Unauthorized { owner_id: Uuid, entity_id: Uuid },

    /// Target entity does not exist
    #[error("entity not found: {entity_id}")]
    NotFound { entity_id: Uuid },

    /// Operation was cancelled
    #[error("operation cancelled")]
    Cancelled,

    /// JSON parsing error
    #[error("JSON parse error: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Storage operation failed
    #[error("storage error: {0}")]
    Storage(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Errors that can occur while fetching or crawling pages.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// HTTP request failed
    #[error("HTTP error fetching {url}: {message}")]
    Http { url: String, message: String },

    /// Non-success status code
    #[error("HTTP {status} fetching {url}")]
    Status { url: String, status: u16 },

    /// Invalid URL format
    #[error("invalid URL: {url}")]
    InvalidUrl { url: String },

    /// Page fetched but contained no usable text
    #[error("empty body: {url}")]
    EmptyBody { url: String },
}

/// Result type alias for enrichment operations.
pub type Result<T> = std::result::Result<T, EnrichmentError>;

/// Result type alias for crawl operations.
pub type CrawlResult<T> = std::result::Result<T, CrawlError>;
