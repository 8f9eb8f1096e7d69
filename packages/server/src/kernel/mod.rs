//! Kernel module - server infrastructure and dependencies.

pub mod ai;
pub mod deps;
pub mod summary_cache;
pub mod test_dependencies;
pub mod traits;

pub use ai::{create_ai, AIError, ClaudeClient, DisabledAI};
pub use deps::ServerDeps;
pub use summary_cache::InMemorySummaryCache;
pub use test_dependencies::{CompletionCall, InMemoryNeighborStore, MockAI};
pub use traits::*;
