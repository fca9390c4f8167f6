//! Core trait abstractions.
//!
//! The pipeline's external collaborators - the LLM provider, the web search
//! surface, the page fetcher and the persistence layer - sit behind traits
//! so every component can be exercised against mocks.

pub mod fetcher;
pub mod llm;
pub mod searcher;
pub mod store;

pub use fetcher::PageFetcher;
pub use llm::LanguageModel;
pub use searcher::{SearchHit, WebSearcher};
pub use store::CompanyStore;
