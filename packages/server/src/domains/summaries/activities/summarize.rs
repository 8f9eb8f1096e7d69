//! Summarization orchestrator.
//!
//! GATHER happens in the caller (see `gather.rs`); this service owns
//! cache lookup, PROMPT, CALL, PARSE and the FALLBACK decision. `summarize`
//! cannot fail: every error on the generation path degrades to heuristics.

use std::sync::Arc;
use tracing::{debug, info, warn};
use typed_builder::TypedBuilder;

use crate::common::utils::truncate_to_char_boundary;
use crate::common::ParcelId;
use crate::config::SummaryConfig;
use crate::domains::summaries::heuristics::heuristic_summary;
use crate::domains::summaries::models::{
    DebugInfo, NarrativeSummary, StructuredSummary, SummaryCacheKey, SummaryMode, SummaryOutcome,
    SummaryPayload, SummarySource,
};
use crate::domains::summaries::parse::{parse_narrative, parse_structured};
use crate::domains::summaries::prompt::{
    build_narrative_prompt, build_structured_prompt, PromptContext,
};
use crate::kernel::{AIError, BaseAI, BaseSummaryCache};

pub const DEFAULT_TOP_K: usize = 3;
pub const MAX_TOP_K: usize = 10;
pub const SNIPPET_CHARS: usize = 200;
const NARRATIVE_MAX_TOKENS: u32 = 200;

/// Clamp a caller-supplied top K into `1..=10`, defaulting to 3
pub fn clamp_top_k(requested: Option<i64>) -> usize {
    match requested {
        Some(k) => k.clamp(1, MAX_TOP_K as i64) as usize,
        None => DEFAULT_TOP_K,
    }
}

/// One summary request, comments already gathered and ranked
#[derive(Debug, Clone, TypedBuilder)]
pub struct SummaryRequest {
    pub parcel_id: ParcelId,
    #[builder(default, setter(into))]
    pub address: Option<String>,
    #[builder(default)]
    pub mode: SummaryMode,
    pub comments: Vec<String>,
    /// Cheap staleness proxy (total gathered comment count)
    pub fingerprint: u64,
    #[builder(default = DEFAULT_TOP_K)]
    pub top_k: usize,
}

#[derive(Clone)]
pub struct SummaryService {
    ai: Arc<dyn BaseAI>,
    cache: Arc<dyn BaseSummaryCache>,
    settings: SummaryConfig,
}

impl SummaryService {
    pub fn new(
        ai: Arc<dyn BaseAI>,
        cache: Arc<dyn BaseSummaryCache>,
        settings: SummaryConfig,
    ) -> Self {
        Self {
            ai,
            cache,
            settings,
        }
    }

    fn ttl(&self, mode: SummaryMode) -> std::time::Duration {
        match mode {
            SummaryMode::Narrative => self.settings.narrative_ttl,
            SummaryMode::Structured => self.settings.structured_ttl,
        }
    }

    /// Fixed sample payload; never calls the generation service or the cache
    pub fn mock(&self, comments: &[String], top_k: usize) -> SummaryOutcome {
        let representatives = comments.iter().take(top_k).cloned().collect();
        SummaryOutcome {
            payload: SummaryPayload::Structured(StructuredSummary::sample(representatives)),
            debug: DebugInfo {
                llm_called: false,
                used_model: None,
                model_output_snippet: None,
                source: SummarySource::Mock,
                cached: false,
            },
        }
    }

    pub async fn summarize(&self, request: SummaryRequest) -> SummaryOutcome {
        let mode = request.mode;

        if request.comments.is_empty() {
            debug!(parcel_id = %request.parcel_id, "No comments to summarize");
            return SummaryOutcome {
                payload: SummaryPayload::no_comments(mode),
                debug: DebugInfo {
                    llm_called: false,
                    used_model: None,
                    model_output_snippet: None,
                    source: SummarySource::Empty,
                    cached: false,
                },
            };
        }

        let key = SummaryCacheKey::new(request.parcel_id, mode, request.top_k);
        if let Some(hit) = self
            .cache
            .get(&key, request.fingerprint, self.ttl(mode))
            .await
        {
            debug!(parcel_id = %request.parcel_id, mode = mode.as_str(), "Summary cache hit");
            return SummaryOutcome {
                payload: hit.payload,
                debug: DebugInfo {
                    llm_called: false,
                    used_model: None,
                    model_output_snippet: None,
                    source: hit.source,
                    cached: true,
                },
            };
        }

        let ctx = PromptContext {
            parcel_id: request.parcel_id,
            address: request.address.as_deref(),
        };
        let (prompt, max_tokens) = match mode {
            SummaryMode::Structured => (
                build_structured_prompt(ctx, &request.comments, request.top_k),
                self.settings.max_tokens,
            ),
            SummaryMode::Narrative => (
                build_narrative_prompt(ctx, &request.comments),
                self.settings.max_tokens.min(NARRATIVE_MAX_TOKENS),
            ),
        };

        let llm_called = self.ai.enabled();
        let raw = if llm_called {
            self.call(&prompt, max_tokens, request.parcel_id).await
        } else {
            debug!(parcel_id = %request.parcel_id, "Generation disabled, using fallback");
            None
        };

        let parsed = raw.as_deref().and_then(|text| match mode {
            SummaryMode::Structured => {
                parse_structured(text, &request.comments, request.top_k)
                    .map(SummaryPayload::Structured)
                    .map_err(|e| {
                        warn!(
                            parcel_id = %request.parcel_id,
                            error = %e,
                            "Unusable structured summary"
                        )
                    })
                    .ok()
            }
            SummaryMode::Narrative => parse_narrative(text)
                .map(|summary| SummaryPayload::Narrative(NarrativeSummary { summary }))
                .map_err(|e| {
                    warn!(parcel_id = %request.parcel_id, error = %e, "Unusable narrative summary")
                })
                .ok(),
        });

        let (payload, source) = match parsed {
            Some(payload) => (payload, SummarySource::Generated),
            None => (self.fallback(&request), SummarySource::Fallback),
        };

        if source == SummarySource::Generated || self.settings.cache_fallback {
            self.cache
                .put(key, request.fingerprint, payload.clone(), source)
                .await;
        }

        info!(
            parcel_id = %request.parcel_id,
            mode = mode.as_str(),
            source = ?source,
            comments = request.comments.len(),
            "Summary produced"
        );

        SummaryOutcome {
            payload,
            debug: DebugInfo {
                llm_called,
                used_model: llm_called.then(|| self.ai.model().to_string()),
                model_output_snippet: raw
                    .as_deref()
                    .map(|text| truncate_to_char_boundary(text, SNIPPET_CHARS).to_string()),
                source,
                cached: false,
            },
        }
    }

    /// Generation call bounded by the configured timeout; any failure is `None`
    async fn call(&self, prompt: &str, max_tokens: u32, parcel_id: ParcelId) -> Option<String> {
        let timeout = self.settings.timeout;
        match tokio::time::timeout(timeout, self.ai.complete(prompt, max_tokens)).await {
            Ok(Ok(text)) => Some(text),
            Ok(Err(e)) => {
                warn!(parcel_id = %parcel_id, error = %e, "Generation call failed, using fallback");
                None
            }
            Err(_) => {
                warn!(
                    parcel_id = %parcel_id,
                    error = %AIError::Timeout(timeout),
                    "Generation call failed, using fallback"
                );
                None
            }
        }
    }

    fn fallback(&self, request: &SummaryRequest) -> SummaryPayload {
        let heuristic = heuristic_summary(&request.comments, request.top_k);
        match request.mode {
            SummaryMode::Structured => SummaryPayload::Structured(heuristic),
            SummaryMode::Narrative => SummaryPayload::Narrative(NarrativeSummary {
                summary: heuristic.summary,
            }),
        }
    }
}
