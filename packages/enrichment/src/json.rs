//! Tolerant JSON extraction from LLM output.
//!
//! Models wrap JSON in markdown fences, lead with prose, or trail with
//! commentary. Rather than duplicating substring surgery at every parse
//! site, all four callers (knowledge extraction, external discovery,
//! contact reconciliation, synthesis) share these two helpers.

/// Locate the first `[` ... last `]` slice in `text`.
///
/// Returns `None` when no plausible array is present.
pub fn extract_json_array(text: &str) -> Option<&str> {
    let start = text.find('[')?;
    let end = text.rfind(']')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}

/// Locate the first `{` ... last `}` slice in `text`.
///
/// Returns `None` when no plausible object is present.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end < start {
        return None;
    }
    Some(&text[start..=end])
}
