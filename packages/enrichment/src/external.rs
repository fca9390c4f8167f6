//! External intelligence - discovery and deep-crawl loop.
//!
//! Asks a browsing-enabled model for the newest items about the target,
//! then tries to confirm each discovered URL with a real fetch. Every
//! discovery item seeds a fallback snippet, so recall is never lost to a
//! dead link; confirmed pages go through the knowledge extractor for a
//! richer one.

use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{debug, info, warn};

use crate::config::EnrichmentConfig;
use crate::json;
use crate::knowledge::KnowledgeExtractor;
use crate::traits::fetcher::PageFetcher;
use crate::traits::llm::LanguageModel;
use crate::types::{DiscoveryItem, KnowledgeSnippet, PageType, WebPageContent};

/// Discovery-and-deep-crawl loop for one target.
pub struct ExternalIntelligence<'a, L: LanguageModel, F: PageFetcher> {
    llm: &'a L,
    fetcher: &'a F,
    config: &'a EnrichmentConfig,
}

impl<'a, L: LanguageModel, F: PageFetcher> ExternalIntelligence<'a, L, F> {
    /// Create the loop over a model and a fetcher.
    pub fn new(llm: &'a L, fetcher: &'a F, config: &'a EnrichmentConfig) -> Self {
        Self {
            llm,
            fetcher,
            config,
        }
    }

    /// Run the full loop: discover, verify, extract.
    ///
    /// Degrades to an empty list when discovery itself fails; single
    /// verification failures only lose the upgrade, not the seed snippet.
    pub async fn gather(&self, company_name: &str, domain: &str) -> Vec<KnowledgeSnippet> {
        let items = self.discover_recent(company_name, domain).await;
        if items.is_empty() {
            info!(company = %company_name, "no external discoveries");
            return Vec::new();
        }

        // Seed snippet per discovery item, confirmed or not.
        let mut snippets: Vec<KnowledgeSnippet> = items.iter().map(seed_snippet).collect();

        let confirmed = self.verify_items(&items).await;
        info!(
            company = %company_name,
            discovered = items.len(),
            confirmed = confirmed.len(),
            "external discovery verified"
        );

        if !confirmed.is_empty() {
            let extractor = KnowledgeExtractor::new(self.llm, self.config);
            let mut upgraded = extractor.extract_snippets(company_name, &confirmed).await;
            // Confirmed coverage reads as news downstream either way
            for snippet in &mut upgraded {
                if snippet.page_type == PageType::Other {
                    snippet.page_type = PageType::News;
                }
            }
            snippets.append(&mut upgraded);
        }

        snippets
    }

    /// One browsing-enabled call asking for the newest items about the
    /// target. Empty list on any failure.
    pub async fn discover_recent(&self, company_name: &str, domain: &str) -> Vec<DiscoveryItem> {
        let prompt = format!(
            "Search the web for the newest news, press releases, funding rounds, \
             hires, partnerships or events involving the company \"{company_name}\" \
             ({domain}). Only include items from the last {days} days.\n\
             Return a JSON array of at most {limit} objects, newest first, each with \
             exactly these keys: \"url\", \"date\" (approximate is fine, e.g. \
             \"2025-06\" or \"2025-06-12\"), \"title\", \"summary\" (one paragraph).\n\
             Respond with the JSON array only.",
            days = self.config.recency_window_days,
            limit = self.config.discovery_limit,
        );

        let response = match self
            .llm
            .generate(
                llm_client::TextRequest::new(&self.config.browsing_model, prompt)
                    .with_web_search()
                    .with_temperature(0.2)
                    .with_max_output_tokens(2_000),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(company = %company_name, error = %e, "discovery call failed");
                return Vec::new();
            }
        };

        let Some(payload) = json::extract_json_array(&response) else {
            warn!(company = %company_name, "no JSON array in discovery response");
            return Vec::new();
        };

        match serde_json::from_str::<Vec<DiscoveryItem>>(payload) {
            Ok(mut items) => {
                items.truncate(self.config.discovery_limit);
                items
            }
            Err(e) => {
                warn!(company = %company_name, error = %e, "discovery parse failed");
                Vec::new()
            }
        }
    }

    /// Attempt one fetch per discovered URL, bounded by
    /// `verify_concurrency`. Only pages with non-empty body text count.
    async fn verify_items(&self, items: &[DiscoveryItem]) -> Vec<WebPageContent> {
        let semaphore = Arc::new(Semaphore::new(self.config.verify_concurrency.max(1)));

        let futures = items.iter().filter(|item| item.has_url()).map(|item| {
            let semaphore = Arc::clone(&semaphore);
            let url = item.url.clone();
            async move {
                let _permit = semaphore.acquire().await.ok()?;
                match self.fetcher.fetch_page(&url).await {
                    Ok(page) if page.has_text() => Some(page),
                    Ok(_) => None,
                    Err(e) => {
                        debug!(url = %url, error = %e, "discovery URL unconfirmed");
                        None
                    }
                }
            }
        });

        futures::future::join_all(futures)
            .await
            .into_iter()
            .flatten()
            .collect()
    }
}

/// The low-confidence fallback snippet every discovery item contributes.
fn seed_snippet(item: &DiscoveryItem) -> KnowledgeSnippet {
    let mut summary = format!("AI SEARCH HIT: {}", item.summary);
    if !item.date.trim().is_empty() {
        summary.push_str(&format!(" (dated {})", item.date));
    }

    KnowledgeSnippet::new(item.url.clone(), summary)
        .with_title(item.title.clone())
        .with_page_type(PageType::News)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetcher, MockLanguageModel};

    const DISCOVERY_JSON: &str = r#"[
        {"url": "https://news.example/acme-funding", "date": "2025-07-01",
         "title": "Acme raises", "summary": "Acme raised a round."},
        {"url": "", "date": "2025-06",
         "title": "Acme event", "summary": "Acme hosted an event."}
    ]"#;

    #[tokio::test]
    async fn test_every_item_seeds_a_snippet() {
        let llm = MockLanguageModel::new().with_response("Search the web", DISCOVERY_JSON);
        // No pages registered: verification finds nothing
        let fetcher = MockFetcher::new();

        let config = EnrichmentConfig::default();
        let external = ExternalIntelligence::new(&llm, &fetcher, &config);

        let snippets = external.gather("Acme", "acme.se").await;

        assert_eq!(snippets.len(), 2);
        assert!(snippets[0].summary.starts_with("AI SEARCH HIT:"));
        assert_eq!(snippets[0].page_type, PageType::News);
        assert_eq!(snippets[1].source_url, "");
    }

    #[tokio::test]
    async fn test_confirmed_urls_get_upgraded() {
        let llm = MockLanguageModel::new()
            .with_response("Search the web", DISCOVERY_JSON)
            .with_response(
                "--- PAGE 1 ---",
                r#"[{"pageType": "News", "summary": "Funding round details.",
                     "caseStudies": [], "keyFacts": ["$10M round"]}]"#,
            );
        let fetcher = MockFetcher::new().with_page(
            "https://news.example/acme-funding",
            "<html><body><p>Acme raised $10M.</p></body></html>",
        );

        let config = EnrichmentConfig::new().with_verify_concurrency(2);
        let external = ExternalIntelligence::new(&llm, &fetcher, &config);

        let snippets = external.gather("Acme", "acme.se").await;

        // 2 seeds + 1 upgraded
        assert_eq!(snippets.len(), 3);
        let upgraded = &snippets[2];
        assert_eq!(upgraded.summary, "Funding round details.");
        assert_eq!(upgraded.key_facts, vec!["$10M round"]);
    }

    #[tokio::test]
    async fn test_discovery_failure_degrades_to_empty() {
        let llm = MockLanguageModel::new().with_response("Search the web", "no structured data");
        let fetcher = MockFetcher::new();

        let config = EnrichmentConfig::default();
        let external = ExternalIntelligence::new(&llm, &fetcher, &config);

        assert!(external.gather("Acme", "acme.se").await.is_empty());
    }
}
