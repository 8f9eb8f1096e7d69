//! Summary activities - gathering and orchestration

pub mod gather;
pub mod summarize;

pub use gather::{gather_comments, GatheredComments};
pub use summarize::{
    clamp_top_k, SummaryRequest, SummaryService, DEFAULT_TOP_K, MAX_TOP_K, SNIPPET_CHARS,
};
