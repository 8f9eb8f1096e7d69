//! Comment domain activities - business logic functions

pub mod create;
pub mod seed;
pub mod vote;

use anyhow::Result;
use serde::Serialize;
use sqlx::PgPool;

use crate::common::ParcelId;
use crate::domains::comments::models::Comment;
use crate::domains::comments::rank_comments;

pub use create::{create_comment, CreateCommentInput, ValidComment, MAX_COMMENT_CHARS};
pub use seed::{seed_comments, SeedReport, SeedSettings};
pub use vote::{vote_comment, VoteInput};

/// A comment as listed, with its derived net score
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RankedComment {
    #[serde(flatten)]
    pub comment: Comment,
    pub net_score: i64,
}

impl From<Comment> for RankedComment {
    fn from(comment: Comment) -> Self {
        let net_score = comment.net_score();
        Self { comment, net_score }
    }
}

/// A parcel's comments, best first
pub async fn list_ranked_comments(
    parcel_id: ParcelId,
    pool: &PgPool,
) -> Result<Vec<RankedComment>> {
    let comments = Comment::find_by_parcel(parcel_id, pool).await?;
    Ok(rank_comments(&comments)
        .into_iter()
        .map(RankedComment::from)
        .collect())
}
