//! Decision-maker candidates.

use serde::{Deserialize, Serialize};

/// One detected decision-maker at the target company.
///
/// Produced once per pipeline run and handed to the persistence
/// collaborator, which deduplicates against already-known contacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProspectCandidate {
    /// Full name
    #[serde(default)]
    pub name: String,

    /// Job title as found
    #[serde(default)]
    pub title: String,

    /// LinkedIn profile URL, when a source carried one
    #[serde(default)]
    pub linked_in_url: Option<String>,

    /// Which source(s) corroborated this person
    #[serde(default)]
    pub source: String,

    /// Seniority-weighted relevance, 0-100
    #[serde(default)]
    pub confidence_score: u8,
}
