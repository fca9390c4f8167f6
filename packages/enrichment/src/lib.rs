//! Company enrichment pipeline.
//!
//! Turns a company name and domain into a structured sales-intelligence
//! report and a ranked decision-maker list. Two research tracks run
//! concurrently per company: an internal track that crawls the company's
//! own site and extracts structured knowledge from it, and an external
//! track that asks a browsing-enabled model for recent news and confirms
//! what it can with real fetches. A synthesis step merges both into the
//! final report, with recent signals kept apart from stale ones.
//!
//! Collaborators sit behind traits ([`LanguageModel`], [`WebSearcher`],
//! [`PageFetcher`], [`CompanyStore`]) so every stage is testable with the
//! doubles in [`testing`]. Individual sources degrade to nothing rather
//! than failing a run; the only hard errors a caller sees are
//! cancellation, ownership violations and storage faults.

pub mod batch;
pub mod config;
pub mod contacts;
pub mod crawler;
pub mod error;
pub mod external;
pub mod fetch;
pub mod html;
pub mod json;
pub mod knowledge;
pub mod pipeline;
pub mod synthesis;
pub mod testing;
pub mod traits;
pub mod types;

pub use batch::{BatchKind, BatchRunner};
pub use config::{CompanyContext, EnrichmentConfig};
pub use error::{CrawlError, EnrichmentError, Result};
pub use fetch::HttpFetcher;
pub use pipeline::EnrichmentPipeline;
pub use traits::fetcher::PageFetcher;
pub use traits::llm::LanguageModel;
pub use traits::searcher::{SearchHit, WebSearcher};
pub use traits::store::CompanyStore;
pub use types::{
    BatchOperationResult, Company, CompanyEnrichmentResult, KnowledgeSnippet, PageType,
    ProspectCandidate,
};
