//! Per-entity enrichment pipeline.
//!
//! The two single-entity entry points the rest of the backend calls:
//! [`EnrichmentPipeline::enrich_company`] and
//! [`EnrichmentPipeline::find_decision_makers`]. Internal-knowledge and
//! external-intelligence tracks run concurrently and are both awaited
//! before synthesis; each track degrades to nothing rather than failing
//! the run.

use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::config::{CompanyContext, EnrichmentConfig};
use crate::contacts::ContactDiscovery;
use crate::crawler::SiteCrawler;
use crate::error::{EnrichmentError, Result};
use crate::external::ExternalIntelligence;
use crate::knowledge::KnowledgeExtractor;
use crate::synthesis::Synthesizer;
use crate::traits::fetcher::PageFetcher;
use crate::traits::llm::LanguageModel;
use crate::traits::searcher::WebSearcher;
use crate::types::{CompanyEnrichmentResult, KnowledgeSnippet, ProspectCandidate};

/// The per-entity pipeline over its three collaborator seams.
pub struct EnrichmentPipeline<L, W, F> {
    llm: L,
    searcher: W,
    fetcher: F,
    config: EnrichmentConfig,
    context: CompanyContext,
}

impl<L, W, F> EnrichmentPipeline<L, W, F>
where
    L: LanguageModel,
    W: WebSearcher,
    F: PageFetcher,
{
    /// Assemble a pipeline.
    pub fn new(
        llm: L,
        searcher: W,
        fetcher: F,
        config: EnrichmentConfig,
        context: CompanyContext,
    ) -> Self {
        Self {
            llm,
            searcher,
            fetcher,
            config,
            context,
        }
    }

    /// The active configuration.
    pub fn config(&self) -> &EnrichmentConfig {
        &self.config
    }

    /// Enrich one company: crawl, extract, discover, synthesize.
    ///
    /// Always produces a structurally valid report on completion; the
    /// error cases are cancellation and nothing else.
    pub async fn enrich_company(
        &self,
        name: &str,
        domain: &str,
        cancel: CancellationToken,
    ) -> Result<CompanyEnrichmentResult> {
        if cancel.is_cancelled() {
            return Err(EnrichmentError::Cancelled);
        }

        tokio::select! {
            result = self.enrich_inner(name, domain) => Ok(result),
            _ = cancel.cancelled() => Err(EnrichmentError::Cancelled),
        }
    }

    async fn enrich_inner(&self, name: &str, domain: &str) -> CompanyEnrichmentResult {
        let (mut internal, mut external) =
            tokio::join!(self.internal_track(name, domain), self.external_track(name, domain));

        info!(
            company = %name,
            internal_snippets = internal.len(),
            external_snippets = external.len(),
            "research tracks joined"
        );

        let mut snippets = Vec::with_capacity(internal.len() + external.len());
        snippets.append(&mut internal);
        snippets.append(&mut external);

        Synthesizer::new(&self.llm, &self.config, &self.context)
            .synthesize(name, &snippets)
            .await
    }

    /// Internal track: site crawl into the knowledge extractor.
    async fn internal_track(&self, name: &str, domain: &str) -> Vec<KnowledgeSnippet> {
        let crawler = SiteCrawler::new(&self.fetcher, &self.config);
        let crawl = match crawler.scrape_site(domain).await {
            Ok(crawl) => crawl,
            Err(e) => {
                warn!(company = %name, error = %e, "internal track degraded");
                return Vec::new();
            }
        };

        let pages: Vec<_> = crawl.all_pages().into_iter().cloned().collect();
        KnowledgeExtractor::new(&self.llm, &self.config)
            .extract_snippets(name, &pages)
            .await
    }

    /// External track: discovery and deep-crawl loop.
    async fn external_track(&self, name: &str, domain: &str) -> Vec<KnowledgeSnippet> {
        ExternalIntelligence::new(&self.llm, &self.fetcher, &self.config)
            .gather(name, domain)
            .await
    }

    /// Find decision-makers at one company.
    pub async fn find_decision_makers(
        &self,
        name: &str,
        domain: &str,
        cancel: CancellationToken,
    ) -> Result<Vec<ProspectCandidate>> {
        if cancel.is_cancelled() {
            return Err(EnrichmentError::Cancelled);
        }

        let discovery = ContactDiscovery::new(
            &self.llm,
            &self.searcher,
            &self.fetcher,
            &self.config,
            &self.context,
        );

        tokio::select! {
            candidates = discovery.find_decision_makers(name, domain) => Ok(candidates),
            _ = cancel.cancelled() => Err(EnrichmentError::Cancelled),
        }
    }
}
