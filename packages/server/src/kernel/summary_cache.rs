//! In-process summary cache shared by every request handler.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tracing::debug;

use super::{BaseSummaryCache, CachedSummary};
use crate::common::ParcelId;
use crate::domains::summaries::models::{SummaryCacheKey, SummaryPayload, SummarySource};

pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// HashMap-backed cache keyed by (parcel, mode).
///
/// Entries are validated on read against the caller's fingerprint and TTL, so a
/// stale entry is never returned even if nobody invalidated it.
#[derive(Clone)]
pub struct InMemorySummaryCache {
    entries: Arc<RwLock<HashMap<SummaryCacheKey, CachedSummary>>>,
    clock: Clock,
}

impl Default for InMemorySummaryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemorySummaryCache {
    pub fn new() -> Self {
        Self::with_clock(Arc::new(Utc::now))
    }

    /// Use a custom time source (tests drive TTL expiry through this).
    pub fn with_clock(clock: Clock) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            clock,
        }
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

#[async_trait]
impl BaseSummaryCache for InMemorySummaryCache {
    async fn get(
        &self,
        key: &SummaryCacheKey,
        fingerprint: u64,
        ttl: Duration,
    ) -> Option<CachedSummary> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;

        if entry.fingerprint != fingerprint {
            debug!(
                parcel_id = %key.parcel_id,
                mode = key.mode.as_str(),
                cached = entry.fingerprint,
                current = fingerprint,
                "Summary cache fingerprint mismatch"
            );
            return None;
        }

        let age = (self.clock)().signed_duration_since(entry.generated_at);
        let ttl = chrono::Duration::from_std(ttl).unwrap_or(chrono::Duration::MAX);
        if age >= ttl {
            debug!(
                parcel_id = %key.parcel_id,
                mode = key.mode.as_str(),
                "Summary cache entry expired"
            );
            return None;
        }

        Some(entry.clone())
    }

    async fn put(
        &self,
        key: SummaryCacheKey,
        fingerprint: u64,
        payload: SummaryPayload,
        source: SummarySource,
    ) {
        let entry = CachedSummary {
            fingerprint,
            generated_at: (self.clock)(),
            payload,
            source,
        };
        self.entries.write().await.insert(key, entry);
    }

    async fn invalidate(&self, parcel_id: ParcelId) {
        let mut entries = self.entries.write().await;
        entries.retain(|key, _| key.parcel_id != parcel_id);
    }
}
