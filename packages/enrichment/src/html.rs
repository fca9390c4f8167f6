//! Regex-based HTML utilities.
//!
//! Plain pattern matching rather than a DOM parser: the pipeline only
//! needs titles, headings, links and readable body text, and the sites it
//! targets are ordinary marketing pages.

use regex::Regex;
use url::Url;

/// Extract the `<title>` text.
pub fn extract_title(html: &str) -> Option<String> {
    let pattern = Regex::new(r"(?is)<title[^>]*>(.*?)</title>").ok()?;
    pattern
        .captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| decode_entities(m.as_str()).trim().to_string())
}

/// Extract the first `<h1>` text.
pub fn extract_first_h1(html: &str) -> Option<String> {
    let pattern = Regex::new(r"(?is)<h1[^>]*>(.*?)</h1>").ok()?;
    let captured = pattern.captures(html).and_then(|cap| cap.get(1))?;

    let tag_pattern = Regex::new(r"<[^>]+>").ok()?;
    let inner = tag_pattern.replace_all(captured.as_str(), "");
    let cleaned = decode_entities(&inner).trim().to_string();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned)
    }
}

/// Extract same-host `<a href>` links, resolved against `base_url`.
///
/// Anchors, javascript:, mailto: and tel: targets are skipped, as are
/// links resolving to a different host.
pub fn extract_same_host_links(base_url: &Url, html: &str) -> Vec<String> {
    let mut links = Vec::new();

    let href_pattern = match Regex::new(r#"href\s*=\s*["']([^"']+)["']"#) {
        Ok(p) => p,
        Err(_) => return links,
    };

    let base_host = base_url.host_str().unwrap_or("");

    for cap in href_pattern.captures_iter(html) {
        if let Some(href) = cap.get(1) {
            let href = href.as_str();

            if href.starts_with('#')
                || href.starts_with("javascript:")
                || href.starts_with("mailto:")
                || href.starts_with("tel:")
            {
                continue;
            }

            if let Ok(resolved) = base_url.join(href) {
                if resolved.host_str().unwrap_or("") == base_host {
                    let mut url = resolved;
                    url.set_fragment(None);
                    links.push(url.to_string());
                }
            }
        }
    }

    links
}

/// Extract `<loc>` URLs from a sitemap document.
pub fn extract_sitemap_urls(xml: &str) -> Vec<String> {
    let pattern = match Regex::new(r"(?is)<loc>\s*(.*?)\s*</loc>") {
        Ok(p) => p,
        Err(_) => return Vec::new(),
    };

    pattern
        .captures_iter(xml)
        .filter_map(|cap| cap.get(1))
        .map(|m| decode_entities(m.as_str()).trim().to_string())
        .filter(|u| !u.is_empty())
        .collect()
}

/// Clean HTML into readable body text.
///
/// Strips scripts, styles, comments and page chrome (nav/header/footer),
/// removes remaining tags, decodes entities, collapses whitespace and
/// scrubs copyright-year boilerplate so a footer's "(c) 2025" cannot be
/// mistaken downstream for an article date.
pub fn clean_body_text(html: &str) -> String {
    let mut text = html.to_string();

    for pattern in [
        r"(?is)<script[^>]*>.*?</script>",
        r"(?is)<style[^>]*>.*?</style>",
        r"(?is)<!--.*?-->",
        r"(?is)<noscript[^>]*>.*?</noscript>",
        r"(?is)<nav[^>]*>.*?</nav>",
        r"(?is)<header[^>]*>.*?</header>",
        r"(?is)<footer[^>]*>.*?</footer>",
    ] {
        if let Ok(re) = Regex::new(pattern) {
            text = re.replace_all(&text, " ").to_string();
        }
    }

    // Block-level closers become line breaks so words don't fuse
    if let Ok(re) = Regex::new(r"(?i)</(p|div|li|h[1-6]|tr|section|article)>") {
        text = re.replace_all(&text, "\n").to_string();
    }

    if let Ok(re) = Regex::new(r"<[^>]+>") {
        text = re.replace_all(&text, " ").to_string();
    }

    text = decode_entities(&text);
    text = scrub_copyright_years(&text);

    collapse_whitespace(&text)
}

/// Decode the handful of entities that actually show up in practice.
pub fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&copy;", "\u{00a9}")
        .replace("&ndash;", "\u{2013}")
        .replace("&mdash;", "\u{2014}")
}

/// Remove copyright-year boilerplate.
fn scrub_copyright_years(text: &str) -> String {
    let pattern = Regex::new(
        r"(?i)(\u{00a9}|\(c\)|copyright)\s*(19|20)\d{2}(\s*[-\u{2013}]\s*(19|20)\d{2})?",
    );
    match pattern {
        Ok(re) => re.replace_all(text, " ").to_string(),
        Err(_) => text.to_string(),
    }
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut last_was_space = false;
    let mut last_was_newline = false;

    for ch in text.chars() {
        if ch == '\n' {
            if !last_was_newline {
                // Trim trailing spaces before the break
                while out.ends_with(' ') {
                    out.pop();
                }
                out.push('\n');
            }
            last_was_newline = true;
            last_was_space = false;
        } else if ch.is_whitespace() {
            if !last_was_space && !last_was_newline {
                out.push(' ');
            }
            last_was_space = true;
        } else {
            out.push(ch);
            last_was_space = false;
            last_was_newline = false;
        }
    }

    out.trim().to_string()
}
