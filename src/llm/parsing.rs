//! Recovery of structured assessments from free-form model text.
//!
//! Models wrap JSON in a ```json fence, a bare ``` fence, or nothing at all.
//! Candidates are tried in that order and the first one that deserializes
//! into the expected record wins. When none does, the caller gets a sentinel
//! record instead of an error.

use serde::de::DeserializeOwned;
use tracing::warn;

use crate::error::AssessmentParseError;
use crate::models::{AdequacyAssessment, FormatAssessment};

const JSON_FENCE: &str = "```json";
const FENCE: &str = "```";

/// Candidate JSON payloads in the order they should be tried
pub fn extraction_candidates(text: &str) -> Vec<&str> {
    let mut candidates = Vec::with_capacity(3);

    for candidate in [
        fenced_after(text, JSON_FENCE),
        fenced_after(text, FENCE),
        Some(text.trim()),
    ]
    .into_iter()
    .flatten()
    {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    }

    candidates
}

/// Content between `opening` and the next closing fence (or end of text)
fn fenced_after<'a>(text: &'a str, opening: &str) -> Option<&'a str> {
    let start = text.find(opening)? + opening.len();
    let rest = &text[start..];
    let end = rest.find(FENCE).unwrap_or(rest.len());
    Some(rest[..end].trim())
}

/// Parse the first candidate that deserializes into `T`
pub(crate) fn parse_structured<T: DeserializeOwned>(
    text: &str,
) -> Result<T, AssessmentParseError> {
    let mut last_error = String::from("empty response");

    for candidate in extraction_candidates(text) {
        match serde_json::from_str::<T>(candidate) {
            Ok(value) => return Ok(value),
            Err(e) => last_error = e.to_string(),
        }
    }

    Err(AssessmentParseError(last_error))
}

/// Parse an adequacy response, substituting the sentinel record on failure
pub fn parse_adequacy_response(text: &str, fallback_answer: &str) -> AdequacyAssessment {
    parse_structured(text).unwrap_or_else(|e| {
        warn!("Adequacy stage: {}; using fallback assessment", e);
        AdequacyAssessment::unparseable(fallback_answer)
    })
}

/// Parse a formatting response, substituting the sentinel record on failure
pub fn parse_format_response(text: &str, fallback_answer: &str) -> FormatAssessment {
    parse_structured(text).unwrap_or_else(|e| {
        warn!("Formatting stage: {}; using fallback assessment", e);
        FormatAssessment::unparseable(fallback_answer)
    })
}
