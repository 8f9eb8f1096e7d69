//! Server dependencies for request handlers (using traits for testability)
//!
//! This module provides the central dependency container used by all routes.
//! External services sit behind trait abstractions to enable testing.

use sqlx::PgPool;
use std::sync::Arc;

use crate::config::SummaryConfig;
use crate::domains::summaries::activities::SummaryService;
use crate::kernel::{BaseAI, BaseSummaryCache};

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to routes (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub db_pool: PgPool,
    /// Text generation service (Anthropic, or a disabled stand-in without a key)
    pub ai: Arc<dyn BaseAI>,
    /// Process-wide summary cache, invalidated on comment writes
    pub summary_cache: Arc<dyn BaseSummaryCache>,
    pub summary: SummaryConfig,
}

impl ServerDeps {
    pub fn new(
        db_pool: PgPool,
        ai: Arc<dyn BaseAI>,
        summary_cache: Arc<dyn BaseSummaryCache>,
        summary: SummaryConfig,
    ) -> Self {
        Self {
            db_pool,
            ai,
            summary_cache,
            summary,
        }
    }

    /// Summary orchestrator wired to these dependencies
    pub fn summary_service(&self) -> SummaryService {
        SummaryService::new(
            self.ai.clone(),
            self.summary_cache.clone(),
            self.summary.clone(),
        )
    }
}
