//! Test doubles for the pipeline's collaborator seams.
//!
//! Each mock is a builder over scripted responses. The language model
//! matches scripted prompt patterns by substring so a single mock can
//! serve every call site of a multi-call flow.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::{CrawlError, CrawlResult, EnrichmentError, Result};
use crate::traits::fetcher::PageFetcher;
use crate::traits::llm::LanguageModel;
use crate::traits::searcher::{SearchHit, WebSearcher};
use crate::traits::store::CompanyStore;
use crate::types::Company;
use llm_client::{LlmError, TextRequest};

/// Scripted language model.
///
/// Responses are registered as `(pattern, response)` pairs; a call gets
/// the response of the first pattern found in its prompt. A prompt that
/// matches nothing gets an empty string, which every parser in the
/// pipeline treats as a degraded result.
#[derive(Default)]
pub struct MockLanguageModel {
    responses: Vec<(String, String)>,
    fail: bool,
    calls: Mutex<Vec<TextRequest>>,
}

impl MockLanguageModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a response for prompts containing `pattern`.
    pub fn with_response(mut self, pattern: impl Into<String>, response: impl Into<String>) -> Self {
        self.responses.push((pattern.into(), response.into()));
        self
    }

    /// Make every call fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    /// Requests seen so far, in call order.
    pub fn calls(&self) -> Vec<TextRequest> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn generate(&self, request: TextRequest) -> Result<String> {
        let prompt = request.prompt.clone();
        self.calls.lock().unwrap().push(request);

        if self.fail {
            return Err(LlmError::Network("mock failure".to_string()).into());
        }

        for (pattern, response) in &self.responses {
            if prompt.contains(pattern.as_str()) {
                return Ok(response.clone());
            }
        }
        Ok(String::new())
    }
}

/// Fetcher backed by a URL-to-HTML map. Unregistered URLs fail the way a
/// dead host would. Every fetch is recorded so tests can assert on the
/// set of URLs actually requested.
#[derive(Default)]
pub struct MockFetcher {
    pages: HashMap<String, String>,
    calls: Mutex<Vec<String>>,
}

impl MockFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register raw HTML for a URL.
    pub fn with_page(mut self, url: impl Into<String>, html: impl Into<String>) -> Self {
        self.pages.insert(url.into(), html.into());
        self
    }

    /// URLs fetched so far, in call order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl PageFetcher for MockFetcher {
    async fn fetch_html(&self, url: &str) -> CrawlResult<String> {
        self.calls.lock().unwrap().push(url.to_string());
        match self.pages.get(url) {
            Some(html) => Ok(html.clone()),
            None => Err(CrawlError::Http {
                url: url.to_string(),
                message: "connection refused".to_string(),
            }),
        }
    }
}

/// Searcher returning scripted hits for queries containing a pattern.
#[derive(Default)]
pub struct MockWebSearcher {
    hits: Vec<(String, Vec<SearchHit>)>,
    fail: bool,
}

impl MockWebSearcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script hits for queries containing `pattern`.
    pub fn with_hits(mut self, pattern: impl Into<String>, hits: Vec<SearchHit>) -> Self {
        self.hits.push((pattern.into(), hits));
        self
    }

    /// Make every query fail.
    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl WebSearcher for MockWebSearcher {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        if self.fail {
            return Err(EnrichmentError::Storage("mock search failure".into()));
        }

        for (pattern, hits) in &self.hits {
            if query.contains(pattern.as_str()) {
                return Ok(hits.iter().take(max_results).cloned().collect());
            }
        }
        Ok(Vec::new())
    }
}

/// In-memory [`CompanyStore`].
#[derive(Default)]
pub struct MemoryCompanyStore {
    companies: Mutex<HashMap<Uuid, Company>>,
}

impl MemoryCompanyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a company.
    pub fn insert(&self, company: Company) {
        self.companies.lock().unwrap().insert(company.id, company);
    }
}

#[async_trait]
impl CompanyStore for MemoryCompanyStore {
    async fn get_company(&self, id: Uuid) -> Result<Option<Company>> {
        Ok(self.companies.lock().unwrap().get(&id).cloned())
    }

    async fn update_company(&self, company: &Company) -> Result<()> {
        self.companies
            .lock()
            .unwrap()
            .insert(company.id, company.clone());
        Ok(())
    }
}
