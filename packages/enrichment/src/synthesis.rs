//! Synthesis engine - the reduce step.
//!
//! Merges every knowledge snippet into one long-form prompt and parses the
//! response into the final structured report. The load-bearing rule here
//! is the recency gate: only News signals with a parseable date inside the
//! recency window may be presented as personalization hooks; everything
//! else is archived context the model is told not to use as a hook.

use chrono::{Duration, NaiveDate, Utc};
use regex::Regex;
use tracing::{info, warn};

use crate::config::{CompanyContext, EnrichmentConfig};
use crate::json;
use crate::traits::llm::LanguageModel;
use crate::types::{CompanyEnrichmentResult, KnowledgeSnippet, PageType};

/// Snippets partitioned into prompt sections.
#[derive(Debug, Default)]
pub struct PromptSections<'s> {
    /// About / Service / Methods - narrative and capability facts
    pub narrative: Vec<&'s KnowledgeSnippet>,

    /// Case - proof points
    pub proof: Vec<&'s KnowledgeSnippet>,

    /// News inside the recency window - usable as outreach hooks
    pub recent: Vec<&'s KnowledgeSnippet>,

    /// Everything else - context only, never a hook
    pub archived: Vec<&'s KnowledgeSnippet>,
}

/// Route snippets into sections, applying the recency gate at `today`.
pub fn partition_snippets<'s>(
    snippets: &'s [KnowledgeSnippet],
    today: NaiveDate,
    recency_window_days: i64,
) -> PromptSections<'s> {
    let mut sections = PromptSections::default();

    for snippet in snippets {
        match snippet.page_type {
            PageType::About | PageType::Service | PageType::Methods => {
                sections.narrative.push(snippet)
            }
            PageType::Case => sections.proof.push(snippet),
            PageType::News => {
                let recent = extract_embedded_date(snippet)
                    .map(|date| is_recent(date, today, recency_window_days))
                    .unwrap_or(false);
                if recent {
                    sections.recent.push(snippet);
                } else {
                    // Unparseable dates land on the safe side
                    sections.archived.push(snippet);
                }
            }
            PageType::Other => sections.archived.push(snippet),
        }
    }

    sections
}

/// Whether `date` falls inside the window ending at `today`.
///
/// Future-dated claims are not "recent" either; a model hallucinating
/// next quarter's event must not become a hook.
pub fn is_recent(date: NaiveDate, today: NaiveDate, window_days: i64) -> bool {
    date <= today && today - date <= Duration::days(window_days)
}

/// Find a parseable date embedded in a News snippet's text.
///
/// Scans the summary and key facts for `YYYY-MM-DD`, `YYYY-MM`,
/// `DD Month YYYY` or `Month YYYY` forms and returns the first that
/// parses. `YYYY-MM` and `Month YYYY` resolve to the first of the month.
pub fn extract_embedded_date(snippet: &KnowledgeSnippet) -> Option<NaiveDate> {
    let mut haystack = snippet.summary.clone();
    for fact in &snippet.key_facts {
        haystack.push(' ');
        haystack.push_str(fact);
    }

    parse_date_in_text(&haystack)
}

fn parse_date_in_text(text: &str) -> Option<NaiveDate> {
    // ISO forms first: they are what the discovery prompt asks for
    if let Ok(re) = Regex::new(r"\b(20\d{2})-(\d{2})(?:-(\d{2}))?\b") {
        if let Some(cap) = re.captures(text) {
            let year: i32 = cap[1].parse().ok()?;
            let month: u32 = cap[2].parse().ok()?;
            let day: u32 = cap
                .get(3)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1);
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(date);
            }
        }
    }

    // "12 June 2025" / "June 2025"
    if let Ok(re) = Regex::new(
        r"(?i)\b(?:(\d{1,2})\s+)?(january|february|march|april|may|june|july|august|september|october|november|december)\s+(20\d{2})\b",
    ) {
        if let Some(cap) = re.captures(text) {
            let day: u32 = cap
                .get(1)
                .and_then(|m| m.as_str().parse().ok())
                .unwrap_or(1);
            let month = month_number(&cap[2])?;
            let year: i32 = cap[3].parse().ok()?;
            return NaiveDate::from_ymd_opt(year, month, day);
        }
    }

    None
}

fn month_number(name: &str) -> Option<u32> {
    let months = [
        "january",
        "february",
        "march",
        "april",
        "may",
        "june",
        "july",
        "august",
        "september",
        "october",
        "november",
        "december",
    ];
    months
        .iter()
        .position(|m| m.eq_ignore_ascii_case(name))
        .map(|i| i as u32 + 1)
}

/// The reduce step over a language model.
pub struct Synthesizer<'a, L: LanguageModel> {
    llm: &'a L,
    config: &'a EnrichmentConfig,
    context: &'a CompanyContext,
}

impl<'a, L: LanguageModel> Synthesizer<'a, L> {
    /// Create a synthesizer.
    pub fn new(llm: &'a L, config: &'a EnrichmentConfig, context: &'a CompanyContext) -> Self {
        Self {
            llm,
            config,
            context,
        }
    }

    /// Merge snippets into the final report.
    ///
    /// Always returns a structurally valid report; parse failures yield
    /// the degraded placeholder, and an outright LLM failure does too.
    pub async fn synthesize(
        &self,
        company_name: &str,
        snippets: &[KnowledgeSnippet],
    ) -> CompanyEnrichmentResult {
        let today = Utc::now().date_naive();
        let sections = partition_snippets(snippets, today, self.config.recency_window_days);

        info!(
            company = %company_name,
            narrative = sections.narrative.len(),
            proof = sections.proof.len(),
            recent = sections.recent.len(),
            archived = sections.archived.len(),
            "synthesis sections built"
        );

        let prompt = build_synthesis_prompt(company_name, &sections, self.context);

        let response = match self
            .llm
            .generate(
                llm_client::TextRequest::new(&self.config.model, prompt)
                    .with_system(
                        "You are a B2B sales-intelligence analyst. You distinguish \
                         verified evidence from inference and never invent facts.",
                    )
                    .with_temperature(0.2)
                    .with_max_output_tokens(8_000),
            )
            .await
        {
            Ok(text) => text,
            Err(e) => {
                warn!(company = %company_name, error = %e, "synthesis call failed");
                return CompanyEnrichmentResult::parse_failure();
            }
        };

        parse_synthesis_response(&response)
    }
}

fn render_snippets(snippets: &[&KnowledgeSnippet]) -> String {
    if snippets.is_empty() {
        return "(none)\n".to_string();
    }

    let mut out = String::new();
    for snippet in snippets {
        out.push_str(&format!(
            "- [{url}] {title}\n  {summary}\n",
            url = snippet.source_url,
            title = snippet.page_title,
            summary = snippet.summary,
        ));
        for fact in &snippet.key_facts {
            out.push_str(&format!("  * {fact}\n"));
        }
        for case in &snippet.case_studies {
            out.push_str(&format!(
                "  * case: {client}: {challenge} -> {solution} -> {result}\n",
                client = case.client_name,
                challenge = case.challenge,
                solution = case.solution,
                result = case.result,
            ));
        }
    }
    out
}

fn build_synthesis_prompt(
    company_name: &str,
    sections: &PromptSections<'_>,
    context: &CompanyContext,
) -> String {
    let context_block = if context.is_empty() {
        String::new()
    } else {
        format!("\nOur own company, for framing the analysis:\n{}\n", context.text)
    };

    format!(
        "Synthesize a sales-intelligence report on \"{company_name}\" from the \
         research below.\n{context_block}\n\
         === COMPANY NARRATIVE AND CAPABILITIES ===\n{narrative}\n\
         === CASE STUDIES AND PROOF POINTS ===\n{proof}\n\
         === RECENT SIGNALS (last months - usable as outreach hooks) ===\n{recent}\n\
         === ARCHIVED CONTEXT (older or undated - do NOT use as a hook) ===\n{archived}\n\
         Rules:\n\
         - outreachHooks may ONLY reference the RECENT SIGNALS section. If it is \
         empty, return an empty outreachHooks array.\n\
         - Separate challenges you can support with the evidence above (confirmed) \
         from ones you infer (inferred).\n\
         - Every evidenceLog entry must cite a source URL from the research.\n\n\
         Respond with only a JSON object with exactly these keys:\n\
         \"snapshot\" (string), \"evidenceLog\" (array of strings), \
         \"challenges\" ({{\"confirmed\": [...], \"inferred\": [...]}}), \
         \"profile\" (string), \"outreachHooks\" (array of strings), \
         \"methodologyUsed\" (array of strings), \"openQuestions\" (array of strings).",
        narrative = render_snippets(&sections.narrative),
        proof = render_snippets(&sections.proof),
        recent = render_snippets(&sections.recent),
        archived = render_snippets(&sections.archived),
    )
}

/// Parse the synthesis response, substituting the degraded placeholder on
/// any failure. Never panics, never returns nothing.
pub fn parse_synthesis_response(response: &str) -> CompanyEnrichmentResult {
    if let Ok(report) = serde_json::from_str::<CompanyEnrichmentResult>(response) {
        return report;
    }

    if let Some(payload) = json::extract_json_object(response) {
        match serde_json::from_str::<CompanyEnrichmentResult>(payload) {
            Ok(report) => return report,
            Err(e) => warn!(error = %e, "synthesis payload did not deserialize"),
        }
    } else {
        warn!("no JSON object in synthesis response");
    }

    CompanyEnrichmentResult::parse_failure()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockLanguageModel;

    fn news(summary: &str) -> KnowledgeSnippet {
        KnowledgeSnippet::new("https://news.example/x", summary).with_page_type(PageType::News)
    }

    fn days_ago(days: i64) -> NaiveDate {
        Utc::now().date_naive() - Duration::days(days)
    }

    #[test]
    fn test_recency_gate_routes_old_news_to_archived() {
        let five_months = days_ago(150).format("%Y-%m-%d").to_string();
        let two_months = days_ago(60).format("%Y-%m-%d").to_string();

        let snippets = vec![
            news(&format!("AI SEARCH HIT: old partnership (dated {five_months})")),
            news(&format!("AI SEARCH HIT: fresh funding (dated {two_months})")),
        ];

        let sections = partition_snippets(&snippets, Utc::now().date_naive(), 120);

        assert_eq!(sections.archived.len(), 1);
        assert!(sections.archived[0].summary.contains("old partnership"));
        assert_eq!(sections.recent.len(), 1);
        assert!(sections.recent[0].summary.contains("fresh funding"));
    }

    #[test]
    fn test_unparseable_date_is_archived() {
        let snippets = vec![news("AI SEARCH HIT: something happened recently")];
        let sections = partition_snippets(&snippets, Utc::now().date_naive(), 120);

        assert!(sections.recent.is_empty());
        assert_eq!(sections.archived.len(), 1);
    }

    #[test]
    fn test_future_date_is_not_recent() {
        let today = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
        let future = NaiveDate::from_ymd_opt(2025, 8, 1).unwrap();
        assert!(!is_recent(future, today, 120));
    }

    #[test]
    fn test_date_parsing_forms() {
        let d = |s: &str| parse_date_in_text(s);

        assert_eq!(d("published 2025-06-12."), NaiveDate::from_ymd_opt(2025, 6, 12));
        assert_eq!(d("around 2025-06"), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(d("on 12 June 2025"), NaiveDate::from_ymd_opt(2025, 6, 12));
        assert_eq!(d("in June 2025"), NaiveDate::from_ymd_opt(2025, 6, 1));
        assert_eq!(d("no date here"), None);
    }

    #[test]
    fn test_page_type_routing() {
        let snippets = vec![
            KnowledgeSnippet::new("u1", "s").with_page_type(PageType::About),
            KnowledgeSnippet::new("u2", "s").with_page_type(PageType::Service),
            KnowledgeSnippet::new("u3", "s").with_page_type(PageType::Methods),
            KnowledgeSnippet::new("u4", "s").with_page_type(PageType::Case),
            KnowledgeSnippet::new("u5", "s").with_page_type(PageType::Other),
        ];

        let sections = partition_snippets(&snippets, Utc::now().date_naive(), 120);

        assert_eq!(sections.narrative.len(), 3);
        assert_eq!(sections.proof.len(), 1);
        assert_eq!(sections.archived.len(), 1);
        assert!(sections.recent.is_empty());
    }

    #[test]
    fn test_parse_failure_substitutes_placeholder() {
        for garbage in [
            "",
            "I could not produce a report.",
            "{\"snapshot\": unclosed",
            "[1, 2, 3]",
        ] {
            let report = parse_synthesis_response(garbage);
            assert!(report.is_parse_failure(), "input: {garbage:?}");
        }
    }

    #[test]
    fn test_parse_tolerates_fenced_object() {
        let response = "Here is the report:\n```json\n{\"snapshot\": \"A consultancy.\", \
                        \"outreachHooks\": [\"hook\"]}\n```";
        let report = parse_synthesis_response(response);

        assert_eq!(report.snapshot, "A consultancy.");
        assert_eq!(report.outreach_hooks, vec!["hook"]);
        assert!(!report.is_parse_failure());
    }

    #[tokio::test]
    async fn test_synthesize_applies_configured_window_to_prompt() {
        // A 60-day-old signal under a 30-day window must land in the
        // archived section of the prompt, never under recent signals.
        let two_months = days_ago(60).format("%Y-%m-%d").to_string();
        let snippets = vec![news(&format!(
            "AI SEARCH HIT: new partnership (dated {two_months})"
        ))];

        let llm = MockLanguageModel::new().with_response(
            "Synthesize a sales-intelligence report",
            r#"{"snapshot": "ok"}"#,
        );
        let config = EnrichmentConfig::new().with_recency_window_days(30);
        let context = CompanyContext::default();

        let report = Synthesizer::new(&llm, &config, &context)
            .synthesize("Acme", &snippets)
            .await;
        assert!(!report.is_parse_failure());

        let calls = llm.calls();
        assert_eq!(calls.len(), 1);
        let prompt = &calls[0].prompt;

        let recent_section = prompt
            .split("=== RECENT SIGNALS")
            .nth(1)
            .and_then(|rest| rest.split("=== ARCHIVED CONTEXT").next())
            .unwrap();
        let archived_section = prompt.split("=== ARCHIVED CONTEXT").nth(1).unwrap();

        assert!(!recent_section.contains("new partnership"));
        assert!(archived_section.contains("new partnership"));
    }

    #[tokio::test]
    async fn test_synthesize_failure_path_returns_placeholder() {
        let llm = MockLanguageModel::new().failing();
        let config = EnrichmentConfig::default();
        let context = CompanyContext::default();

        let synthesizer = Synthesizer::new(&llm, &config, &context);
        let report = synthesizer.synthesize("Acme", &[]).await;

        assert!(report.is_parse_failure());
    }
}
