// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Prompt construction, ranking and fallbacks live in the domain layers.
//
// Naming convention: Base* for trait names (e.g., BaseAI, BaseSummaryCache)

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::time::Duration;

use crate::common::ParcelId;
use crate::domains::parcels::models::UpsertOutcome;
use crate::domains::summaries::models::{SummaryCacheKey, SummaryPayload, SummarySource};

// =============================================================================
// AI Trait (Infrastructure - text generation service)
// =============================================================================

#[async_trait]
pub trait BaseAI: Send + Sync {
    /// Model identifier sent with every request (reported in debug envelopes)
    fn model(&self) -> &str;

    /// False when no backend is configured; callers skip the call entirely
    fn enabled(&self) -> bool {
        true
    }

    /// Complete a prompt (returns raw text response)
    ///
    /// Unreliable by contract: every caller needs a deterministic fallback.
    async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String>;
}

// =============================================================================
// Summary Cache Trait (Infrastructure)
// =============================================================================

/// A cached summary plus the fingerprint it was computed against.
#[derive(Debug, Clone, PartialEq)]
pub struct CachedSummary {
    pub fingerprint: u64,
    pub generated_at: DateTime<Utc>,
    pub payload: SummaryPayload,
    pub source: SummarySource,
}

#[async_trait]
pub trait BaseSummaryCache: Send + Sync {
    /// Returns the entry only if its fingerprint matches and it is younger than `ttl`
    async fn get(
        &self,
        key: &SummaryCacheKey,
        fingerprint: u64,
        ttl: Duration,
    ) -> Option<CachedSummary>;

    /// Store (or replace) the entry for `key`
    async fn put(
        &self,
        key: SummaryCacheKey,
        fingerprint: u64,
        payload: SummaryPayload,
        source: SummarySource,
    );

    /// Drop every entry for the parcel (all modes)
    async fn invalidate(&self, parcel_id: ParcelId);
}

// =============================================================================
// Neighbor Store Trait (Infrastructure - keyed NeighborSet writes)
// =============================================================================

#[async_trait]
pub trait BaseNeighborStore: Send + Sync {
    /// Create the parcel's neighbor set, or replace it if present
    ///
    /// Must be safe under concurrent writers to different parcels.
    async fn upsert(&self, parcel_id: ParcelId, neighbor_ids: &[ParcelId])
        -> Result<UpsertOutcome>;
}
