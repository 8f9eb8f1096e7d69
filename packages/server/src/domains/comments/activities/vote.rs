use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::common::CommentId;
use crate::domains::comments::models::{Comment, VoteType};
use crate::domains::comments::CommentError;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteInput {
    pub vote_type: Option<String>,
}

impl VoteInput {
    pub fn vote_type(&self) -> Result<VoteType, CommentError> {
        self.vote_type
            .as_deref()
            .ok_or_else(|| CommentError::Validation("voteType is required".into()))?
            .parse()
            .map_err(|_| {
                CommentError::Validation("voteType must be 'upvote' or 'downvote'".into())
            })
    }
}

/// Add one vote to a comment with a single atomic increment
///
/// Votes do not change the comment count, so cached summaries stay valid.
pub async fn vote_comment(
    comment_id: CommentId,
    input: &VoteInput,
    pool: &PgPool,
) -> Result<Comment, CommentError> {
    let vote = input.vote_type()?;

    let comment = Comment::increment_vote(comment_id, vote, pool)
        .await?
        .ok_or(CommentError::CommentNotFound(comment_id))?;

    info!(comment_id = %comment_id, vote = %vote, "Vote recorded");

    Ok(comment)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_type_validation() {
        let vote = |raw: Option<&str>| VoteInput {
            vote_type: raw.map(str::to_string),
        };

        assert_eq!(vote(Some("upvote")).vote_type().unwrap(), VoteType::Upvote);
        assert_eq!(vote(Some("downvote")).vote_type().unwrap(), VoteType::Downvote);
        assert!(matches!(vote(Some("meh")).vote_type(), Err(CommentError::Validation(_))));
        assert!(matches!(vote(None).vote_type(), Err(CommentError::Validation(_))));
    }
}
