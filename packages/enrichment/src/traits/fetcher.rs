//! Page fetcher trait.

use async_trait::async_trait;

use crate::error::{CrawlError, CrawlResult};
use crate::html;
use crate::types::WebPageContent;

/// Retrieves raw and cleaned page content for a URL.
///
/// The substrate every other component depends on. A failed fetch is a
/// typed [`CrawlError`](crate::error::CrawlError) which callers uniformly
/// treat as "this source contributed nothing" - no fetch failure escapes
/// a research track.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Fetch the raw HTML of a URL.
    async fn fetch_html(&self, url: &str) -> CrawlResult<String>;

    /// Fetch a URL and clean it into [`WebPageContent`].
    ///
    /// Errors with [`CrawlError::EmptyBody`] when cleaning leaves no
    /// usable text.
    async fn fetch_page(&self, url: &str) -> CrawlResult<WebPageContent> {
        let raw = self.fetch_html(url).await?;

        let mut page = WebPageContent::new(url, html::clean_body_text(&raw));
        if let Some(title) = html::extract_title(&raw) {
            page = page.with_title(title);
        }
        if let Some(h1) = html::extract_first_h1(&raw) {
            page = page.with_h1(h1);
        }

        if !page.has_text() {
            return Err(CrawlError::EmptyBody {
                url: url.to_string(),
            });
        }

        Ok(page)
    }
}
