//! Fetched page content.

use serde::{Deserialize, Serialize};

/// One fetched, cleaned page.
///
/// Ephemeral: produced by a fetch, consumed immediately by extraction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebPageContent {
    /// Final URL of the page
    pub url: String,

    /// `<title>` text, empty if absent
    pub title: String,

    /// First `<h1>` text, empty if absent
    pub h1: String,

    /// Cleaned body text: no scripts, styles, chrome or footer boilerplate
    pub body_text: String,
}

impl WebPageContent {
    /// Create a page from its parts.
    pub fn new(url: impl Into<String>, body_text: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            title: String::new(),
            h1: String::new(),
            body_text: body_text.into(),
        }
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the first h1.
    pub fn with_h1(mut self, h1: impl Into<String>) -> Self {
        self.h1 = h1.into();
        self
    }

    /// Whether the page carries any usable text.
    pub fn has_text(&self) -> bool {
        !self.body_text.trim().is_empty()
    }
}
