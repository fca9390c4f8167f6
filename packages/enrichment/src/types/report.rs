//! The final synthesized report for one target company.

use serde::{Deserialize, Serialize};

/// Confirmed versus inferred business challenges.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CompanyChallenges {
    /// Challenges directly supported by extracted evidence
    #[serde(default)]
    pub confirmed: Vec<String>,

    /// Challenges the model inferred from indirect signals
    #[serde(default)]
    pub inferred: Vec<String>,
}

/// Final synthesized report for one target.
///
/// Always well-formed: when the synthesis response cannot be parsed, a
/// degraded instance is substituted via [`CompanyEnrichmentResult::parse_failure`]
/// so downstream persistence never sees a missing report.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompanyEnrichmentResult {
    /// Two-to-three sentence company snapshot
    #[serde(default)]
    pub snapshot: String,

    /// Attributed evidence entries backing the report
    #[serde(default)]
    pub evidence_log: Vec<String>,

    /// Confirmed and inferred challenges
    #[serde(default)]
    pub challenges: CompanyChallenges,

    /// Longer-form company profile
    #[serde(default)]
    pub profile: String,

    /// Timely, recency-gated personalization hooks
    #[serde(default)]
    pub outreach_hooks: Vec<String>,

    /// Methodologies and frameworks the company appears to use
    #[serde(default)]
    pub methodology_used: Vec<String>,

    /// Things the research could not settle
    #[serde(default)]
    pub open_questions: Vec<String>,
}

impl CompanyEnrichmentResult {
    /// Degraded placeholder substituted when the synthesis response cannot
    /// be parsed. Structurally valid, clearly marked, never `None`.
    pub fn parse_failure() -> Self {
        Self {
            snapshot: "Error parsing".to_string(),
            evidence_log: Vec::new(),
            challenges: CompanyChallenges::default(),
            profile: "Error parsing".to_string(),
            outreach_hooks: Vec::new(),
            methodology_used: Vec::new(),
            open_questions: vec!["Failed to parse JSON".to_string()],
        }
    }

    /// Whether this is the degraded parse-failure placeholder.
    pub fn is_parse_failure(&self) -> bool {
        self.snapshot == "Error parsing" && self.open_questions.iter().any(|q| q == "Failed to parse JSON")
    }
}
