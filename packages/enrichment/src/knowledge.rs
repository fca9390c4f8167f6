//! Knowledge extraction - the map step.
//!
//! Batches raw pages and asks the model to classify each page and pull out
//! structured facts. One bad batch contributes nothing; it never aborts
//! its siblings.

use serde::Deserialize;
use tracing::{debug, warn};

use crate::config::EnrichmentConfig;
use crate::json;
use crate::traits::llm::LanguageModel;
use crate::types::{ExtractedCaseStudy, KnowledgeSnippet, PageType, WebPageContent};

/// Per-page character budget inside an extraction batch, so five pages fit
/// one prompt.
const PAGE_EXCERPT_CHARS: usize = 6_000;

const EXTRACTION_SYSTEM_PROMPT: &str = "You are a precise business analyst. \
You only state facts present in the provided text. You answer with JSON and \
nothing else.";

/// What the model returns per page. Snippet identity (url, title) is filled
/// in from the input page, not trusted from the model.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExtraction {
    #[serde(default)]
    page_type: PageType,

    #[serde(default)]
    summary: String,

    #[serde(default)]
    case_studies: Vec<ExtractedCaseStudy>,

    #[serde(default)]
    key_facts: Vec<String>,
}

/// Map-step extractor over a language model.
pub struct KnowledgeExtractor<'a, L: LanguageModel> {
    llm: &'a L,
    config: &'a EnrichmentConfig,
}

impl<'a, L: LanguageModel> KnowledgeExtractor<'a, L> {
    /// Create an extractor.
    pub fn new(llm: &'a L, config: &'a EnrichmentConfig) -> Self {
        Self { llm, config }
    }

    /// Extract snippets from a list of pages.
    ///
    /// Pages are chunked into batches of `extract_batch_size`; each batch
    /// is one LLM call. Batches run sequentially; a failed batch logs and
    /// contributes nothing.
    pub async fn extract_snippets(
        &self,
        company_name: &str,
        pages: &[WebPageContent],
    ) -> Vec<KnowledgeSnippet> {
        let mut snippets = Vec::new();

        for batch in pages.chunks(self.config.extract_batch_size.max(1)) {
            match self.extract_batch(company_name, batch).await {
                Ok(mut batch_snippets) => snippets.append(&mut batch_snippets),
                Err(reason) => {
                    warn!(
                        batch_size = batch.len(),
                        reason = %reason,
                        "extraction batch dropped"
                    );
                }
            }
        }

        debug!(
            pages = pages.len(),
            snippets = snippets.len(),
            "knowledge extraction complete"
        );
        snippets
    }

    async fn extract_batch(
        &self,
        company_name: &str,
        batch: &[WebPageContent],
    ) -> Result<Vec<KnowledgeSnippet>, String> {
        let prompt = build_extraction_prompt(company_name, batch);

        let response = self
            .llm
            .generate(
                llm_client::TextRequest::new(&self.config.model, prompt)
                    .with_system(EXTRACTION_SYSTEM_PROMPT)
                    .with_temperature(0.1)
                    .with_max_output_tokens(4_000),
            )
            .await
            .map_err(|e| e.to_string())?;

        let payload = json::extract_json_array(&response).ok_or("no JSON array in response")?;

        let raw: Vec<RawExtraction> =
            serde_json::from_str(payload).map_err(|e| format!("bad JSON: {e}"))?;

        // One object per input page, matched by position. A short answer
        // loses the tail pages rather than the batch.
        Ok(raw
            .into_iter()
            .zip(batch.iter())
            .map(|(extraction, page)| KnowledgeSnippet {
                source_url: page.url.clone(),
                page_title: page.title.clone(),
                page_type: extraction.page_type,
                summary: extraction.summary,
                case_studies: extraction.case_studies,
                key_facts: extraction.key_facts,
            })
            .collect())
    }
}

fn build_extraction_prompt(company_name: &str, batch: &[WebPageContent]) -> String {
    let mut prompt = format!(
        "Below are {count} pages from the website of the company \"{company_name}\".\n\
         For EACH page, in order, produce one JSON object with exactly these keys:\n\
         - \"pageType\": one of \"About\", \"Service\", \"Case\", \"Methods\", \"News\", \"Other\"\n\
         - \"summary\": a dense factual summary of the page (3-6 sentences)\n\
         - \"caseStudies\": array of {{\"clientName\", \"challenge\", \"solution\", \"result\"}} \
         for every client success story on the page, else []\n\
         - \"keyFacts\": array of standalone facts (numbers, certifications, named \
         clients, locations, dates), else []\n\n\
         Respond with a JSON array of exactly {count} objects, one per page, same order. \
         No markdown, no commentary.\n",
        count = batch.len(),
    );

    for (i, page) in batch.iter().enumerate() {
        let excerpt = truncate_chars(&page.body_text, PAGE_EXCERPT_CHARS);
        prompt.push_str(&format!(
            "\n--- PAGE {n} ---\nURL: {url}\nTITLE: {title}\nH1: {h1}\nTEXT:\n{excerpt}\n",
            n = i + 1,
            url = page.url,
            title = page.title,
            h1 = page.h1,
        ));
    }

    prompt
}

/// Truncate at a char boundary without splitting a code point.
pub(crate) fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLanguageModel;

    fn page(url: &str, text: &str) -> WebPageContent {
        WebPageContent::new(url, text).with_title(format!("Title of {url}"))
    }

    #[tokio::test]
    async fn test_extracts_batch_and_fills_identity() {
        let llm = MockLanguageModel::new().with_response(
            "PAGE 1",
            r#"```json
            [
              {"pageType": "About", "summary": "An agency.", "caseStudies": [], "keyFacts": ["Founded 2010"]},
              {"pageType": "Case", "summary": "A win.", "caseStudies": [{"clientName": "Acme"}], "keyFacts": []}
            ]
            ```"#,
        );

        let config = EnrichmentConfig::default();
        let extractor = KnowledgeExtractor::new(&llm, &config);

        let pages = vec![page("https://x.se/about", "a"), page("https://x.se/case", "b")];
        let snippets = extractor.extract_snippets("X", &pages).await;

        assert_eq!(snippets.len(), 2);
        assert_eq!(snippets[0].source_url, "https://x.se/about");
        assert_eq!(snippets[0].page_type, PageType::About);
        assert_eq!(snippets[1].case_studies[0].client_name, "Acme");
    }

    #[tokio::test]
    async fn test_bad_batch_contributes_nothing() {
        let llm = MockLanguageModel::new().with_response("PAGE", "I cannot help with that.");

        let config = EnrichmentConfig::default();
        let extractor = KnowledgeExtractor::new(&llm, &config);

        let pages = vec![page("https://x.se/about", "a")];
        let snippets = extractor.extract_snippets("X", &pages).await;

        assert!(snippets.is_empty());
    }

    #[tokio::test]
    async fn test_batches_are_independent() {
        // First batch valid, second batch garbage; batch size 1 so each
        // page is its own call.
        let llm = MockLanguageModel::new()
            .with_response(
                "https://x.se/about",
                r#"[{"pageType": "About", "summary": "ok"}]"#,
            )
            .with_response("https://x.se/broken", "not json");

        let config = EnrichmentConfig {
            extract_batch_size: 1,
            ..EnrichmentConfig::default()
        };
        let extractor = KnowledgeExtractor::new(&llm, &config);

        let pages = vec![
            page("https://x.se/about", "a"),
            page("https://x.se/broken", "b"),
        ];
        let snippets = extractor.extract_snippets("X", &pages).await;

        assert_eq!(snippets.len(), 1);
        assert_eq!(snippets[0].summary, "ok");
    }

    #[test]
    fn test_truncate_chars() {
        assert_eq!(truncate_chars("abcdef", 3), "abc");
        assert_eq!(truncate_chars("ab", 3), "ab");
        assert_eq!(truncate_chars("ééé", 2), "éé");
    }
}
