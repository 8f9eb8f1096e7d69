use thiserror::Error;

use crate::common::{CommentId, ParcelId};

/// Failures of comment writes
#[derive(Error, Debug)]
pub enum CommentError {
    #[error("{0}")]
    Validation(String),

    #[error("Parcel {0} not found")]
    ParcelNotFound(ParcelId),

    #[error("Comment {0} not found")]
    CommentNotFound(CommentId),

    #[error("Internal error: {0}")]
    Internal(#[from] anyhow::Error),
}
