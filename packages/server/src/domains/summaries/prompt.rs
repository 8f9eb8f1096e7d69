//! Prompt construction for both summary surfaces.

use schemars::schema_for;

use super::models::StructuredSummary;
use crate::common::ParcelId;

const PREAMBLE: &str =
    "You are an assistant that summarizes community feedback for city planning.";

/// What the prompt says about the parcel itself
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub parcel_id: ParcelId,
    pub address: Option<&'a str>,
}

impl PromptContext<'_> {
    fn describe(&self) -> String {
        let address = self
            .address
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or("UNKNOWN");
        format!(
            "Context: these comments are for parcel {} (address: {}) and the parcels nearest to it.",
            self.parcel_id, address
        )
    }
}

/// `1. first\n2. second`, one comment per line
fn numbered(comments: &[String]) -> String {
    comments
        .iter()
        .enumerate()
        .map(|(i, comment)| {
            let single_line = comment.split_whitespace().collect::<Vec<_>>().join(" ");
            format!("{}. {}", i + 1, single_line)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn structured_schema() -> String {
    serde_json::to_string_pretty(&schema_for!(StructuredSummary)).unwrap_or_default()
}

pub fn build_structured_prompt(
    ctx: PromptContext<'_>,
    comments: &[String],
    top_k: usize,
) -> String {
    format!(
        "{preamble}\n\n\
         {context}\n\n\
         Representative comments:\n{comments}\n\n\
         Please produce a single valid JSON object (no prose) with the following keys:\n\
         - summary: a 3-4 sentence summary of the main concerns\n\
         - recommendations: an array of exactly three short (1-2 sentence) actionable interventions a city planner could implement\n\
         - themes: an array of objects {{\"theme\": string, \"count\": number}} describing major themes and counts\n\
         - representativeComments: an array of the top {top_k} representative comments\n\n\
         The object must match this JSON schema:\n{schema}\n\n\
         Return ONLY a valid JSON object and nothing else.",
        preamble = PREAMBLE,
        context = ctx.describe(),
        comments = numbered(comments),
        top_k = top_k,
        schema = structured_schema(),
    )
}

pub fn build_narrative_prompt(ctx: PromptContext<'_>, comments: &[String]) -> String {
    format!(
        "{preamble}\n\n\
         {context}\n\n\
         Resident comments:\n{comments}\n\n\
         In exactly two sentences, describe what residents want to see on this parcel. \
         Respond with plain prose only: no lists, no headings, no JSON.",
        preamble = PREAMBLE,
        context = ctx.describe(),
        comments = numbered(comments),
    )
}
