//! Language model trait.
//!
//! Abstracts the completion provider behind the one call shape the
//! pipeline needs: prompt in, plain text out. Implementations handle
//! provider specifics (retry, envelope parsing); callers handle prompting
//! and response parsing.

use async_trait::async_trait;

use crate::error::Result;
use llm_client::{LlmClient, TextRequest};

/// Text-generation seam used by every LLM call site in the pipeline.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Generate text for a request.
    ///
    /// A successful call that produced no textual content returns an empty
    /// string, not an error.
    async fn generate(&self, request: TextRequest) -> Result<String>;
}

#[async_trait]
impl LanguageModel for LlmClient {
    async fn generate(&self, request: TextRequest) -> Result<String> {
        Ok(LlmClient::generate(self, request).await?)
    }
}
