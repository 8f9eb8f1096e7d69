use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::common::ParcelId;

/// Shown instead of a summary when neither the parcel nor its neighbors have comments.
pub const NO_COMMENTS_MESSAGE: &str =
    "No comments yet. Be the first to share what you'd like to see on this lot!";

/// The two summary surfaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummaryMode {
    /// Exactly two sentences on what residents want.
    Narrative,
    /// JSON object with summary, recommendations, themes and representative comments.
    #[default]
    Structured,
}

impl SummaryMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            SummaryMode::Narrative => "narrative",
            SummaryMode::Structured => "structured",
        }
    }
}

/// A frequency-ranked keyword.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Theme {
    pub theme: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NarrativeSummary {
    pub summary: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct StructuredSummary {
    pub summary: String,
    pub recommendations: Vec<String>,
    pub themes: Vec<Theme>,
    pub representative_comments: Vec<String>,
}

impl StructuredSummary {
    /// Fixed sample payload served in mock mode (no generation call).
    pub fn sample(representative_comments: Vec<String>) -> Self {
        Self {
            summary: "Residents are mainly concerned about traffic and pedestrian safety, poor lighting at night, and parking pressures that affect local businesses. Repeated comments call for better crosswalk timing, improved street lighting, and measures to reduce through-traffic. Short-term interventions could address lighting and signal timing while longer-term work could add greenspace and loading zones.".to_string(),
            recommendations: vec![
                "Adjust signal timing and add pedestrian-first crossing phases at the main intersection to improve safety for seniors and children.".to_string(),
                "Install targeted street lighting and visibility improvements along poorly lit corridors.".to_string(),
                "Create designated loading/delivery zones and implement time-limited parking to reduce circling and improve access for local businesses.".to_string(),
            ],
            themes: Vec::new(),
            representative_comments,
        }
    }
}

/// Result payload of either surface. Serializes as the bare inner object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SummaryPayload {
    Structured(StructuredSummary),
    Narrative(NarrativeSummary),
}

impl SummaryPayload {
    /// Canned payload for a parcel with no comments anywhere in its neighborhood.
    pub fn no_comments(mode: SummaryMode) -> Self {
        match mode {
            SummaryMode::Narrative => SummaryPayload::Narrative(NarrativeSummary {
                summary: NO_COMMENTS_MESSAGE.to_string(),
            }),
            SummaryMode::Structured => SummaryPayload::Structured(StructuredSummary {
                summary: NO_COMMENTS_MESSAGE.to_string(),
                recommendations: Vec::new(),
                themes: Vec::new(),
                representative_comments: Vec::new(),
            }),
        }
    }

    pub fn mode(&self) -> SummaryMode {
        match self {
            SummaryPayload::Narrative(_) => SummaryMode::Narrative,
            SummaryPayload::Structured(_) => SummaryMode::Structured,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            SummaryPayload::Narrative(n) => &n.summary,
            SummaryPayload::Structured(s) => &s.summary,
        }
    }
}

/// Which path produced a payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SummarySource {
    Generated,
    Fallback,
    Empty,
    Mock,
}

/// Diagnostic envelope; never part of the primary payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebugInfo {
    pub llm_called: bool,
    pub used_model: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model_output_snippet: Option<String>,
    pub source: SummarySource,
    pub cached: bool,
}

/// Everything the orchestrator knows about one request.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryOutcome {
    pub payload: SummaryPayload,
    pub debug: DebugInfo,
}

impl SummaryOutcome {
    pub fn source(&self) -> SummarySource {
        self.debug.source
    }
}

/// Cache slot. Each parcel has one entry per mode and top K, since top K shapes
/// the prompt and the representative comments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SummaryCacheKey {
    pub parcel_id: ParcelId,
    pub mode: SummaryMode,
    pub top_k: usize,
}

impl SummaryCacheKey {
    pub fn new(parcel_id: ParcelId, mode: SummaryMode, top_k: usize) -> Self {
        Self {
            parcel_id,
            mode,
            top_k,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structured_payload_serializes_flat_camel_case() {
        let payload = SummaryPayload::Structured(StructuredSummary {
            summary: "s".into(),
            recommendations: vec!["r".into()],
            themes: vec![Theme {
                theme: "park".into(),
                count: 2,
            }],
            representative_comments: vec!["c".into()],
        });

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["summary"], "s");
        assert_eq!(json["representativeComments"][0], "c");
        assert_eq!(json["themes"][0]["count"], 2);
    }

    #[test]
    fn test_no_comments_payload_per_mode() {
        let narrative = SummaryPayload::no_comments(SummaryMode::Narrative);
        assert_eq!(narrative.summary(), NO_COMMENTS_MESSAGE);
        assert_eq!(narrative.mode(), SummaryMode::Narrative);

        match SummaryPayload::no_comments(SummaryMode::Structured) {
            SummaryPayload::Structured(s) => {
                assert!(s.recommendations.is_empty());
                assert!(s.representative_comments.is_empty());
            }
            other => panic!("unexpected payload {:?}", other),
        }
    }

    #[test]
    fn test_mode_parses_lowercase() {
        let mode: SummaryMode = serde_json::from_str("\"narrative\"").unwrap();
        assert_eq!(mode, SummaryMode::Narrative);
        assert_eq!(SummaryMode::default(), SummaryMode::Structured);
    }
}
