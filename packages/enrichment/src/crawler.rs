//! Site crawler - discovers and fetches a bounded set of relevant pages
//! for one company domain.

use tracing::{debug, info, warn};
use url::Url;

use crate::config::EnrichmentConfig;
use crate::error::{CrawlError, CrawlResult};
use crate::html;
use crate::traits::fetcher::PageFetcher;
use crate::types::WebPageContent;

/// URL substrings that disqualify a candidate page, regardless of which
/// source proposed it or whether it also matches a priority term.
const BLOCKLIST: &[&str] = &[
    "contact",
    "kontakt",
    "career",
    "karriar",
    "jobs",
    "privacy",
    "cookie",
    "legal",
    "terms",
    "gdpr",
    "login",
    "signin",
    "sign-in",
    "register",
    "account",
    "cart",
    "checkout",
    "?page=",
    "/page/",
    "wp-json",
    ".pdf",
    ".jpg",
    ".png",
];

/// Feed endpoints are blocked by exact path segment, not substring, so
/// "/feedback" style pages survive.
const BLOCKED_SEGMENTS: &[&str] = &["feed", "rss", "atom"];

/// URL substrings that mark a page as likely high-signal; these sort
/// ahead of everything else.
const PRIORITY_TERMS: &[&str] = &[
    "about",
    "om-oss",
    "service",
    "tjanster",
    "case",
    "solution",
    "product",
    "industr",
    "method",
    "approach",
    "team",
    "reference",
    "client",
    "customer",
    "work",
    "portfolio",
];

/// Result of crawling one site.
#[derive(Debug, Clone)]
pub struct SiteCrawl {
    /// The homepage, always present
    pub home: WebPageContent,

    /// Prioritized sub-pages, at most `crawl_page_cap`
    pub pages: Vec<WebPageContent>,
}

impl SiteCrawl {
    /// All pages including the homepage.
    pub fn all_pages(&self) -> Vec<&WebPageContent> {
        std::iter::once(&self.home).chain(self.pages.iter()).collect()
    }
}

/// Crawls one company's public site.
pub struct SiteCrawler<'a, F: PageFetcher> {
    fetcher: &'a F,
    config: &'a EnrichmentConfig,
}

impl<'a, F: PageFetcher> SiteCrawler<'a, F> {
    /// Create a crawler over a fetcher.
    pub fn new(fetcher: &'a F, config: &'a EnrichmentConfig) -> Self {
        Self { fetcher, config }
    }

    /// Crawl a domain: homepage plus up to `crawl_page_cap` ranked
    /// sub-pages.
    ///
    /// Sub-page fetch failures are dropped silently; only an unreachable
    /// homepage fails the crawl.
    pub async fn scrape_site(&self, domain: &str) -> CrawlResult<SiteCrawl> {
        let home_url = normalize_domain(domain);
        let base = Url::parse(&home_url).map_err(|_| CrawlError::InvalidUrl {
            url: home_url.clone(),
        })?;

        let home_html = self.fetcher.fetch_html(&home_url).await?;
        let home = build_page(&home_url, &home_html);

        info!(domain = %domain, "homepage fetched, collecting candidates");

        let mut candidates = self.sitemap_candidates(&base).await;
        candidates.extend(html::extract_same_host_links(&base, &home_html));

        let ranked = rank_candidates(candidates, &home_url, self.config.crawl_page_cap);
        debug!(
            domain = %domain,
            candidates = ranked.len(),
            "candidates ranked"
        );

        let mut pages = Vec::with_capacity(ranked.len());
        for url in ranked {
            match self.fetcher.fetch_page(&url).await {
                Ok(page) => pages.push(page),
                Err(e) => {
                    // A single bad sub-page never sinks the crawl
                    warn!(url = %url, error = %e, "sub-page dropped");
                }
            }
        }

        info!(
            domain = %domain,
            pages = pages.len(),
            "site crawl complete"
        );

        Ok(SiteCrawl { home, pages })
    }

    /// Candidate URLs from `/sitemap.xml`, kept to the home host. Sitemaps
    /// routinely list CDN and partner URLs; those must not widen the crawl
    /// off-domain. Best-effort: any failure means an empty list.
    async fn sitemap_candidates(&self, base: &Url) -> Vec<String> {
        let sitemap_url = match base.join("/sitemap.xml") {
            Ok(u) => u.to_string(),
            Err(_) => return Vec::new(),
        };

        let home_host = base.host_str().unwrap_or("");

        match self.fetcher.fetch_html(&sitemap_url).await {
            Ok(xml) => {
                let urls: Vec<String> = html::extract_sitemap_urls(&xml)
                    .into_iter()
                    .filter(|u| {
                        Url::parse(u)
                            .map(|parsed| parsed.host_str().unwrap_or("") == home_host)
                            .unwrap_or(false)
                    })
                    .collect();
                debug!(count = urls.len(), "sitemap candidates");
                urls
            }
            Err(e) => {
                debug!(error = %e, "no usable sitemap");
                Vec::new()
            }
        }
    }
}

/// Normalize a bare domain to an `https://` URL.
pub fn normalize_domain(domain: &str) -> String {
    let trimmed = domain.trim();
    if trimmed.starts_with("http://") || trimmed.starts_with("https://") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Whether a URL hits the blocklist (substring, case-insensitive) or
/// names a feed endpoint as a path segment or extension.
pub fn is_blocked(url: &str) -> bool {
    let lower = url.to_lowercase();
    if BLOCKLIST.iter().any(|term| lower.contains(term)) {
        return true;
    }
    lower
        .split(['/', '?', '&', '=', '.', '#'])
        .any(|segment| BLOCKED_SEGMENTS.contains(&segment))
}

/// Whether a URL contains a priority term.
fn is_priority(url: &str) -> bool {
    let lower = url.to_lowercase();
    PRIORITY_TERMS.iter().any(|term| lower.contains(term))
}

/// Deduplicate, filter and rank candidates, returning at most `cap` URLs.
///
/// Priority-term URLs sort first; within each group shorter URLs win,
/// shorter being a cheap proxy for "more canonical".
pub fn rank_candidates(candidates: Vec<String>, home_url: &str, cap: usize) -> Vec<String> {
    let home_trimmed = home_url.trim_end_matches('/');

    let mut seen = std::collections::HashSet::new();
    let mut survivors: Vec<String> = candidates
        .into_iter()
        .filter(|url| {
            let trimmed = url.trim_end_matches('/');
            trimmed != home_trimmed && !is_blocked(url) && seen.insert(trimmed.to_string())
        })
        .collect();

    survivors.sort_by(|a, b| {
        let pa = is_priority(a);
        let pb = is_priority(b);
        pb.cmp(&pa).then(a.len().cmp(&b.len()))
    });

    survivors.truncate(cap);
    survivors
}

fn build_page(url: &str, raw_html: &str) -> WebPageContent {
    let mut page = WebPageContent::new(url, html::clean_body_text(raw_html));
    if let Some(title) = html::extract_title(raw_html) {
        page = page.with_title(title);
    }
    if let Some(h1) = html::extract_first_h1(raw_html) {
        page = page.with_h1(h1);
    }
    page
}
