//! Knowledge snippets - structured facts extracted from pages.

use serde::{Deserialize, Deserializer, Serialize};

/// Classification of a source page.
///
/// Serialized with the exact strings the extraction prompt asks the model
/// for; anything unrecognized deserializes as [`PageType::Other`] so one
/// creative answer cannot sink a whole batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum PageType {
    About,
    Service,
    Case,
    Methods,
    Other,
    News,
}

impl<'de> Deserialize<'de> for PageType {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(match s.trim() {
            "About" => PageType::About,
            "Service" => PageType::Service,
            "Case" => PageType::Case,
            "Methods" => PageType::Methods,
            "News" => PageType::News,
            _ => PageType::Other,
        })
    }
}

impl Default for PageType {
    fn default() -> Self {
        PageType::Other
    }
}

/// One client success story found on a page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedCaseStudy {
    #[serde(default)]
    pub client_name: String,

    #[serde(default)]
    pub challenge: String,

    #[serde(default)]
    pub solution: String,

    #[serde(default)]
    pub result: String,
}

/// Structured facts extracted from one page or search hit.
///
/// Immutable after creation; accumulated into lists and merged by the
/// synthesis engine.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct KnowledgeSnippet {
    /// URL the facts were extracted from
    #[serde(default)]
    pub source_url: String,

    /// Title of the source page
    #[serde(default)]
    pub page_title: String,

    /// Page classification
    #[serde(default)]
    pub page_type: PageType,

    /// Dense summary of what the page says
    #[serde(default)]
    pub summary: String,

    /// Client success stories found on the page
    #[serde(default)]
    pub case_studies: Vec<ExtractedCaseStudy>,

    /// Standalone facts (numbers, certifications, named clients, dates)
    #[serde(default)]
    pub key_facts: Vec<String>,
}

impl KnowledgeSnippet {
    /// Create a snippet with a source and summary.
    pub fn new(source_url: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            source_url: source_url.into(),
            page_title: String::new(),
            page_type: PageType::Other,
            summary: summary.into(),
            case_studies: Vec::new(),
            key_facts: Vec::new(),
        }
    }

    /// Set the page title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.page_title = title.into();
        self
    }

    /// Set the page type.
    pub fn with_page_type(mut self, page_type: PageType) -> Self {
        self.page_type = page_type;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_type_round_trip() {
        let json = serde_json::to_string(&PageType::Case).unwrap();
        assert_eq!(json, "\"Case\"");

        let back: PageType = serde_json::from_str(&json).unwrap();
        assert_eq!(back, PageType::Case);
    }

    #[test]
    fn test_unknown_page_type_falls_back_to_other() {
        let parsed: PageType = serde_json::from_str("\"LandingPage\"").unwrap();
        assert_eq!(parsed, PageType::Other);
    }

    #[test]
    fn test_snippet_tolerates_missing_fields() {
        let snippet: KnowledgeSnippet =
            serde_json::from_str(r#"{"summary": "An agency."}"#).unwrap();

        assert_eq!(snippet.summary, "An agency.");
        assert_eq!(snippet.page_type, PageType::Other);
        assert!(snippet.case_studies.is_empty());
        assert!(snippet.key_facts.is_empty());
    }
}
