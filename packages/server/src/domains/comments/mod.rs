pub mod activities;
pub mod errors;
pub mod models;
pub mod ranking;

pub use errors::CommentError;
pub use models::*;
pub use ranking::rank_comments;
