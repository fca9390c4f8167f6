//! Pipeline configuration.
//!
//! All policy constants live here as overridable defaults rather than
//! hardcoded values scattered through the components. The defaults carry
//! the tuning the pipeline was built with (15-page crawl cap, 4-month
//! recency window, 3 concurrent enrichments).

/// Configuration for the enrichment pipeline.
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Maximum sub-pages fetched per site crawl (homepage not counted).
    pub crawl_page_cap: usize,

    /// How recent an external signal must be to count as a hook.
    pub recency_window_days: i64,

    /// Maximum items requested from the external discovery call.
    pub discovery_limit: usize,

    /// Pages per LLM call in the knowledge-extraction map step.
    pub extract_batch_size: usize,

    /// Concurrent fetches during discovery-item verification.
    pub verify_concurrency: usize,

    /// Character budget for raw site text in the contact prompt.
    pub site_text_budget: usize,

    /// Concurrent entities for enrichment batches.
    pub enrich_concurrency: usize,

    /// Concurrent entities for soft-data batches.
    pub soft_data_concurrency: usize,

    /// Concurrent entities for email-generation batches.
    pub email_concurrency: usize,

    /// User-agent header sent with every page fetch.
    pub user_agent: String,

    /// Model used for extraction and reconciliation calls.
    pub model: String,

    /// Model used for browsing-enabled discovery calls.
    pub browsing_model: String,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        Self {
            crawl_page_cap: 15,
            recency_window_days: 120,
            discovery_limit: 6,
            extract_batch_size: 5,
            verify_concurrency: 4,
            site_text_budget: 20_000,
            enrich_concurrency: 3,
            soft_data_concurrency: 5,
            email_concurrency: 5,
            user_agent: "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
                         AppleWebKit/537.36 (KHTML, like Gecko) \
                         Chrome/124.0.0.0 Safari/537.36"
                .to_string(),
            model: "gpt-4o".to_string(),
            browsing_model: "gpt-4o".to_string(),
        }
    }
}

impl EnrichmentConfig {
    /// Create a config with default tuning.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the crawl page cap.
    pub fn with_crawl_page_cap(mut self, cap: usize) -> Self {
        self.crawl_page_cap = cap;
        self
    }

    /// Set the recency window in days.
    pub fn with_recency_window_days(mut self, days: i64) -> Self {
        self.recency_window_days = days;
        self
    }

    /// Set the enrichment batch concurrency bound.
    pub fn with_enrich_concurrency(mut self, bound: usize) -> Self {
        self.enrich_concurrency = bound;
        self
    }

    /// Set the verification fan-out bound.
    pub fn with_verify_concurrency(mut self, bound: usize) -> Self {
        self.verify_concurrency = bound;
        self
    }
}

/// Immutable seller-side context injected into synthesis and contact
/// prompts.
///
/// Loaded once at process start and passed explicitly to every component
/// that needs it; there is no global, lazily-initialized state.
#[derive(Debug, Clone, Default)]
pub struct CompanyContext {
    /// Free-text description of the selling company: offering, positioning,
    /// methodology. Used so the LLM frames findings in terms the seller
    /// can act on.
    pub text: String,
}

impl CompanyContext {
    /// Create a context from text.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Whether any context was provided.
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}
