//! HTTP source fetcher.

use async_trait::async_trait;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::EnrichmentConfig;
use crate::error::{CrawlError, CrawlResult};
use crate::traits::fetcher::PageFetcher;

/// Fetches pages over HTTP with a realistic browser user-agent.
///
/// Marketing sites routinely serve bot user-agents an empty shell, so the
/// configured agent string mimics a desktop browser.
pub struct HttpFetcher {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpFetcher {
    /// Create a fetcher using the configured user agent.
    pub fn new(config: &EnrichmentConfig) -> CrawlResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| CrawlError::Http {
                url: String::new(),
                message: format!("client build failed: {e}"),
            })?;

        Ok(Self {
            client,
            user_agent: config.user_agent.clone(),
        })
    }
}

#[async_trait]
impl PageFetcher for HttpFetcher {
    async fn fetch_html(&self, url: &str) -> CrawlResult<String> {
        debug!(url = %url, "fetching");

        let response = self
            .client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "fetch failed");
                CrawlError::Http {
                    url: url.to_string(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(url = %url, status = %status, "non-success status");
            return Err(CrawlError::Status {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        response.text().await.map_err(|e| CrawlError::Http {
            url: url.to_string(),
            message: e.to_string(),
        })
    }
}
