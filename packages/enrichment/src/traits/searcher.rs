//! Generic web search trait.
//!
//! Issues keyword queries against a lightweight public search surface.
//! Zero results is signal absence, not an error - contact discovery treats
//! an empty hit list exactly like a track that found nothing.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// One search hit.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchHit {
    /// Result title
    pub title: String,

    /// Result URL
    pub link: String,

    /// Short snippet shown with the result
    pub snippet: String,
}

impl SearchHit {
    /// Create a hit.
    pub fn new(
        title: impl Into<String>,
        link: impl Into<String>,
        snippet: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            link: link.into(),
            snippet: snippet.into(),
        }
    }

    /// Render the hit as one prompt line.
    pub fn to_prompt_line(&self) -> String {
        format!("- {} ({}): {}", self.title, self.link, self.snippet)
    }
}

/// Keyword search against a generic web search surface.
#[async_trait]
pub trait WebSearcher: Send + Sync {
    /// Search and return up to `max_results` hits. An empty list is a
    /// valid, non-error outcome.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;
}
