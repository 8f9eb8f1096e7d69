//! Comment submission.

use serde::Deserialize;
use sqlx::PgPool;
use tracing::info;

use crate::common::{AuthorId, ParcelId};
use crate::domains::comments::models::Comment;
use crate::domains::comments::CommentError;
use crate::domains::parcels::models::Parcel;
use crate::kernel::BaseSummaryCache;

pub const MAX_COMMENT_CHARS: usize = 2000;

/// Raw submission as it arrives over HTTP
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCommentInput {
    pub parcel_id: Option<i64>,
    pub user_id: Option<i64>,
    pub content: Option<String>,
}

/// A submission that passed validation
#[derive(Debug, Clone, PartialEq)]
pub struct ValidComment {
    pub parcel_id: ParcelId,
    pub author_id: AuthorId,
    pub content: String,
}

impl CreateCommentInput {
    pub fn validate(&self) -> Result<ValidComment, CommentError> {
        let parcel_id = self
            .parcel_id
            .ok_or_else(|| CommentError::Validation("parcelId is required".into()))?;
        let parcel_id = ParcelId::checked(parcel_id)
            .map_err(|e| CommentError::Validation(format!("parcelId: {}", e)))?;

        let user_id = self
            .user_id
            .ok_or_else(|| CommentError::Validation("userId is required".into()))?;
        let author_id = AuthorId::checked(user_id)
            .map_err(|e| CommentError::Validation(format!("userId: {}", e)))?;

        let content = self.content.as_deref().map(str::trim).unwrap_or_default();
        if content.is_empty() {
            return Err(CommentError::Validation("content is required".into()));
        }
        if content.chars().count() > MAX_COMMENT_CHARS {
            return Err(CommentError::Validation(format!(
                "content must be at most {} characters",
                MAX_COMMENT_CHARS
            )));
        }

        Ok(ValidComment {
            parcel_id,
            author_id,
            content: content.to_string(),
        })
    }
}

/// Validate, store, then drop the parcel's cached summaries before returning
pub async fn create_comment(
    input: &CreateCommentInput,
    cache: &dyn BaseSummaryCache,
    pool: &PgPool,
) -> Result<Comment, CommentError> {
    let valid = input.validate()?;

    if !Parcel::exists(valid.parcel_id, pool).await? {
        return Err(CommentError::ParcelNotFound(valid.parcel_id));
    }

    let comment = Comment::create(valid.parcel_id, valid.author_id, &valid.content, pool).await?;

    cache.invalidate(valid.parcel_id).await;

    info!(
        comment_id = %comment.id,
        parcel_id = %comment.parcel_id,
        "Comment created"
    );

    Ok(comment)
}
