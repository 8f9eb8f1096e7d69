pub mod activities;
pub mod heuristics;
pub mod models;
pub mod parse;
pub mod prompt;

pub use activities::{SummaryRequest, SummaryService};
pub use models::*;
pub use parse::ParseError;
