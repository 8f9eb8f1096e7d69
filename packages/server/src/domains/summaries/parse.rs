//! Typed parsing of generation output.

use serde::Deserialize;
use thiserror::Error;

use super::heuristics::RECOMMENDATION_COUNT;
use super::models::{StructuredSummary, Theme};
use crate::common::utils::strip_code_fences;

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("model returned no text")]
    EmptyResponse,

    #[error("no JSON object in model output")]
    NoJsonObject,

    #[error("invalid JSON: {0}")]
    InvalidJson(String),

    #[error("summary is missing or empty")]
    MissingSummary,

    #[error("recommendations are missing or empty")]
    MissingRecommendations,
}

/// Whatever the model sent back, before validation. Unknown keys are ignored.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
struct StructuredDraft {
    summary: Option<String>,
    recommendations: Option<Vec<String>>,
    themes: Option<Vec<Theme>>,
    representative_comments: Option<Vec<String>>,
}

/// Slice from the first `{` to the last `}` inclusive
fn json_object_slice(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse a structured-mode response
///
/// `fallback_representatives` are used when the model omits
/// `representativeComments`, truncated to `top_k`.
pub fn parse_structured(
    raw: &str,
    fallback_representatives: &[String],
    top_k: usize,
) -> Result<StructuredSummary, ParseError> {
    let text = strip_code_fences(raw);
    if text.trim().is_empty() {
        return Err(ParseError::EmptyResponse);
    }

    let object = json_object_slice(&text).ok_or(ParseError::NoJsonObject)?;
    let draft: StructuredDraft =
        serde_json::from_str(object).map_err(|e| ParseError::InvalidJson(e.to_string()))?;

    let summary = draft
        .summary
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or(ParseError::MissingSummary)?;

    let recommendations: Vec<String> = draft
        .recommendations
        .unwrap_or_default()
        .into_iter()
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty())
        .take(RECOMMENDATION_COUNT)
        .collect();
    if recommendations.is_empty() {
        return Err(ParseError::MissingRecommendations);
    }

    let mut representative_comments: Vec<String> = draft
        .representative_comments
        .unwrap_or_default()
        .into_iter()
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .take(top_k)
        .collect();
    if representative_comments.is_empty() {
        representative_comments = fallback_representatives
            .iter()
            .take(top_k)
            .cloned()
            .collect();
    }

    Ok(StructuredSummary {
        summary,
        recommendations,
        themes: draft.themes.unwrap_or_default(),
        representative_comments,
    })
}

/// Parse a narrative-mode response: any non-blank text is usable
pub fn parse_narrative(raw: &str) -> Result<String, ParseError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(ParseError::EmptyResponse);
    }
    Ok(text.to_string())
}
