//! External discovery hits, pre-verification.

use serde::{Deserialize, Serialize};

/// One external-search hit before deep-crawl verification.
///
/// Either confirmed by re-fetching its URL (and upgraded to a full
/// [`KnowledgeSnippet`](super::KnowledgeSnippet) through extraction) or
/// kept as a lower-confidence fallback snippet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscoveryItem {
    /// URL of the discovered item, empty if the model gave none
    #[serde(default)]
    pub url: String,

    /// Approximate publication date as reported by the model
    #[serde(default)]
    pub date: String,

    /// Headline or title
    #[serde(default)]
    pub title: String,

    /// One-paragraph summary of the item
    #[serde(default)]
    pub summary: String,
}

impl DiscoveryItem {
    /// Whether this item carries a URL worth verifying.
    pub fn has_url(&self) -> bool {
        let url = self.url.trim();
        url.starts_with("http://") || url.starts_with("https://")
    }
}
