//! Contact discovery - finds likely decision-makers at one target.
//!
//! Three research tracks run fully in parallel: a site scrape, a battery
//! of role-targeted search queries, and a browsing-enabled model pass.
//! A failed track contributes an empty string or list; only then does one
//! reconciliation call merge, deduplicate and score the findings.

use tracing::{debug, info, warn};

use crate::config::{CompanyContext, EnrichmentConfig};
use crate::crawler::SiteCrawler;
use crate::json;
use crate::knowledge::truncate_chars;
use crate::traits::fetcher::PageFetcher;
use crate::traits::llm::LanguageModel;
use crate::traits::searcher::{SearchHit, WebSearcher};
use crate::types::ProspectCandidate;

/// Role-targeted query battery run against the generic search surface.
const ROLE_QUERIES: &[&str] = &[
    "\"{company}\" CEO OR founder",
    "\"{company}\" CFO OR \"finance director\"",
    "\"{company}\" CMO OR \"marketing director\"",
    "\"{company}\" \"head of sales\" OR \"sales director\"",
    "\"{company}\" CTO OR CIO",
    "\"{company}\" \"vice president\" OR director linkedin",
];

/// Hits requested per role query.
const HITS_PER_QUERY: usize = 5;

/// Discovers and reconciles decision-maker candidates.
pub struct ContactDiscovery<'a, L: LanguageModel, W: WebSearcher, F: PageFetcher> {
    llm: &'a L,
    searcher: &'a W,
    fetcher: &'a F,
    config: &'a EnrichmentConfig,
    context: &'a CompanyContext,
}

impl<'a, L: LanguageModel, W: WebSearcher, F: PageFetcher> ContactDiscovery<'a, L, W, F> {
    /// Create a discovery run over the three collaborator seams.
    pub fn new(
        llm: &'a L,
        searcher: &'a W,
        fetcher: &'a F,
        config: &'a EnrichmentConfig,
        context: &'a CompanyContext,
    ) -> Self {
        Self {
            llm,
            searcher,
            fetcher,
            config,
            context,
        }
    }

    /// Run all three tracks and reconcile into a ranked candidate list.
    ///
    /// Never errors: a fully failed run returns an empty list.
    pub async fn find_decision_makers(
        &self,
        company_name: &str,
        domain: &str,
    ) -> Vec<ProspectCandidate> {
        let (site_text, search_hits, llm_findings) = tokio::join!(
            self.site_track(domain),
            self.search_track(company_name),
            self.browsing_track(company_name, domain),
        );

        info!(
            company = %company_name,
            site_chars = site_text.len(),
            search_hits = search_hits.len(),
            llm_chars = llm_findings.len(),
            "contact tracks complete"
        );

        if site_text.is_empty() && search_hits.is_empty() && llm_findings.is_empty() {
            return Vec::new();
        }

        self.reconcile(company_name, &site_text, &search_hits, &llm_findings)
            .await
    }

    /// Track (a): scrape the site and concatenate cleaned text, truncated
    /// to the configured character budget.
    async fn site_track(&self, domain: &str) -> String {
        let crawler = SiteCrawler::new(self.fetcher, self.config);
        match crawler.scrape_site(domain).await {
            Ok(crawl) => {
                let mut text = String::new();
                for page in crawl.all_pages() {
                    text.push_str(&page.body_text);
                    text.push('\n');
                }
                truncate_chars(&text, self.config.site_text_budget).to_string()
            }
            Err(e) => {
                warn!(domain = %domain, error = %e, "site track failed");
                String::new()
            }
        }
    }

    /// Track (b): the fixed role-query battery, flattened into one list.
    async fn search_track(&self, company_name: &str) -> Vec<SearchHit> {
        let mut hits = Vec::new();

        for template in ROLE_QUERIES {
            let query = template.replace("{company}", company_name);
            match self.searcher.search(&query, HITS_PER_QUERY).await {
                Ok(mut query_hits) => hits.append(&mut query_hits),
                Err(e) => {
                    // Zero results is signal absence; an error is too
                    debug!(query = %query, error = %e, "role query failed");
                }
            }
        }

        hits
    }

    /// Track (c): one browsing-enabled model pass.
    async fn browsing_track(&self, company_name: &str, domain: &str) -> String {
        let prompt = format!(
            "Find at least 10 current executives, managers or team leads at the \
             company \"{company_name}\" ({domain}). For each person give their full \
             name, exact job title, and where you found them (LinkedIn, the company \
             site, news). Plain text, one person per line.",
        );

        match self
            .llm
            .generate(
                llm_client::TextRequest::new(&self.config.browsing_model, prompt)
                    .with_web_search()
                    .with_temperature(0.3)
                    .with_max_output_tokens(2_000),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(company = %company_name, error = %e, "browsing track failed");
                String::new()
            }
        }
    }

    /// One reconciliation call over the three raw outputs.
    async fn reconcile(
        &self,
        company_name: &str,
        site_text: &str,
        search_hits: &[SearchHit],
        llm_findings: &str,
    ) -> Vec<ProspectCandidate> {
        let hit_lines: String = search_hits
            .iter()
            .map(|h| h.to_prompt_line())
            .collect::<Vec<_>>()
            .join("\n");

        let context_block = if self.context.is_empty() {
            String::new()
        } else {
            format!(
                "\nFor relevance, we are selling into this company. Our context:\n{}\n",
                self.context.text
            )
        };

        let prompt = format!(
            "We researched decision-makers at \"{company_name}\" from three sources.\n\
             {context_block}\n\
             === SOURCE 1: company website text ===\n{site}\n\n\
             === SOURCE 2: search engine results ===\n{hits}\n\n\
             === SOURCE 3: web research findings ===\n{findings}\n\n\
             Merge these sources into a single candidate list:\n\
             - Deduplicate people that appear in more than one source.\n\
             - Score each person 0-100 for outreach relevance, weighting seniority \
             (C-level > VP > director > manager).\n\
             - In \"source\", say briefly which source(s) corroborated the person.\n\
             - At most 10 people, sorted by score, highest first.\n\
             Respond with only a JSON array of objects with exactly these keys: \
             \"name\", \"title\", \"linkedInUrl\" (string or null), \"source\", \
             \"confidenceScore\" (integer 0-100).",
            site = site_text,
            hits = hit_lines,
            findings = llm_findings,
        );

        let response = match self
            .llm
            .generate(
                llm_client::TextRequest::new(&self.config.model, prompt)
                    .with_temperature(0.1)
                    .with_max_output_tokens(2_000),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(company = %company_name, error = %e, "reconciliation failed");
                return Vec::new();
            }
        };

        parse_candidates(&response)
    }
}

/// Parse the reconciliation response into candidates. Empty on failure.
pub fn parse_candidates(response: &str) -> Vec<ProspectCandidate> {
    let Some(payload) = json::extract_json_array(response) else {
        warn!("no JSON array in reconciliation response");
        return Vec::new();
    };

    match serde_json::from_str::<Vec<ProspectCandidate>>(payload) {
        Ok(mut candidates) => {
            for candidate in &mut candidates {
                candidate.confidence_score = candidate.confidence_score.min(100);
            }
            candidates.truncate(10);
            candidates
        }
        Err(e) => {
            warn!(error = %e, "reconciliation parse failed");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{MockFetcher, MockLanguageModel, MockWebSearcher};

    const RECONCILED: &str = r#"```json
    [
      {"name": "Anna Berg", "title": "CEO", "linkedInUrl": "https://linkedin.com/in/annaberg",
       "source": "site + search", "confidenceScore": 95},
      {"name": "Erik Lund", "title": "CTO", "linkedInUrl": null,
       "source": "web research", "confidenceScore": 80}
    ]
    ```"#;

    #[tokio::test]
    async fn test_tracks_merge_into_candidates() {
        let llm = MockLanguageModel::new()
            .with_response("Find at least 10", "Anna Berg - CEO (LinkedIn)")
            .with_response("Merge these sources", RECONCILED);
        let searcher = MockWebSearcher::new().with_hits(
            "CEO",
            vec![SearchHit::new(
                "Anna Berg | LinkedIn",
                "https://linkedin.com/in/annaberg",
                "CEO at Acme",
            )],
        );
        let fetcher = MockFetcher::new()
            .with_page("https://acme.se", "<html><body><p>Our team: Anna Berg, CEO.</p></body></html>");

        let config = EnrichmentConfig::default();
        let context = CompanyContext::default();
        let discovery = ContactDiscovery::new(&llm, &searcher, &fetcher, &config, &context);

        let candidates = discovery.find_decision_makers("Acme", "acme.se").await;

        assert_eq!(candidates.len(), 2);
        assert_eq!(candidates[0].name, "Anna Berg");
        assert_eq!(candidates[0].confidence_score, 95);
        assert_eq!(candidates[1].linked_in_url, None);
    }

    #[tokio::test]
    async fn test_all_tracks_failing_yields_empty() {
        let llm = MockLanguageModel::new().failing();
        let searcher = MockWebSearcher::new().failing();
        let fetcher = MockFetcher::new(); // no pages: homepage fetch fails

        let config = EnrichmentConfig::default();
        let context = CompanyContext::default();
        let discovery = ContactDiscovery::new(&llm, &searcher, &fetcher, &config, &context);

        let candidates = discovery.find_decision_makers("Acme", "acme.se").await;
        assert!(candidates.is_empty());
    }

    #[test]
    fn test_parse_candidates_degrades_to_empty() {
        assert!(parse_candidates("Sorry, I could not find anyone.").is_empty());
        assert!(parse_candidates("[{\"name\": }]").is_empty());
    }

    #[test]
    fn test_parse_candidates_caps_at_ten() {
        let many: Vec<String> = (0..15)
            .map(|i| format!("{{\"name\": \"P{i}\", \"title\": \"VP\", \"confidenceScore\": {i}}}"))
            .collect();
        let response = format!("[{}]", many.join(","));

        let candidates = parse_candidates(&response);
        assert_eq!(candidates.len(), 10);
    }
}
