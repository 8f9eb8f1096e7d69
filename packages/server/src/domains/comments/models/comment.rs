use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::{AuthorId, CommentId, ParcelId};

/// Comment - a resident's feedback on one parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Comment {
    pub id: CommentId,
    pub parcel_id: ParcelId,
    pub author_id: AuthorId,
    pub content: String,
    pub upvotes: i32,
    pub downvotes: i32,
    pub created_at: DateTime<Utc>,
}

impl Comment {
    /// Upvotes minus downvotes. Derived, never stored.
    pub fn net_score(&self) -> i64 {
        i64::from(self.upvotes) - i64::from(self.downvotes)
    }
}

/// Vote direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoteType {
    Upvote,
    Downvote,
}

impl std::fmt::Display for VoteType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VoteType::Upvote => write!(f, "upvote"),
            VoteType::Downvote => write!(f, "downvote"),
        }
    }
}

impl std::str::FromStr for VoteType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "upvote" => Ok(VoteType::Upvote),
            "downvote" => Ok(VoteType::Downvote),
            _ => Err(anyhow::anyhow!("Invalid vote type: {}", s)),
        }
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Comment {
    pub async fn find_by_id(id: CommentId, pool: &PgPool) -> Result<Option<Self>> {
        let comment = sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(comment)
    }

    pub async fn find_by_parcel(parcel_id: ParcelId, pool: &PgPool) -> Result<Vec<Self>> {
        let comments =
            sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE parcel_id = $1")
                .bind(parcel_id)
                .fetch_all(pool)
                .await?;
        Ok(comments)
    }

    /// Comments on any of the given parcels
    pub async fn find_by_parcels(parcel_ids: &[ParcelId], pool: &PgPool) -> Result<Vec<Self>> {
        if parcel_ids.is_empty() {
            return Ok(Vec::new());
        }

        let comments =
            sqlx::query_as::<_, Comment>("SELECT * FROM comments WHERE parcel_id = ANY($1)")
                .bind(parcel_ids)
                .fetch_all(pool)
                .await?;
        Ok(comments)
    }

    pub async fn create(
        parcel_id: ParcelId,
        author_id: AuthorId,
        content: &str,
        pool: &PgPool,
    ) -> Result<Self> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (parcel_id, author_id, content)
            VALUES ($1, $2, $3)
            RETURNING *
            "#,
        )
        .bind(parcel_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(pool)
        .await?;
        Ok(comment)
    }

    /// Insert with preset vote counts (demo seeding only)
    pub async fn create_with_votes(
        parcel_id: ParcelId,
        author_id: AuthorId,
        content: &str,
        upvotes: i32,
        downvotes: i32,
        pool: &PgPool,
    ) -> Result<Self> {
        let comment = sqlx::query_as::<_, Comment>(
            r#"
            INSERT INTO comments (parcel_id, author_id, content, upvotes, downvotes)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(parcel_id)
        .bind(author_id)
        .bind(content)
        .bind(upvotes)
        .bind(downvotes)
        .fetch_one(pool)
        .await?;
        Ok(comment)
    }

    /// Atomically add one vote; `None` when the comment does not exist
    pub async fn increment_vote(
        id: CommentId,
        vote: VoteType,
        pool: &PgPool,
    ) -> Result<Option<Self>> {
        let query = match vote {
            VoteType::Upvote => {
                "UPDATE comments SET upvotes = upvotes + 1 WHERE id = $1 RETURNING *"
            }
            VoteType::Downvote => {
                "UPDATE comments SET downvotes = downvotes + 1 WHERE id = $1 RETURNING *"
            }
        };

        let comment = sqlx::query_as::<_, Comment>(query)
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(comment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_net_score_can_go_negative() {
        let comment = Comment {
            id: CommentId::from_i64(1),
            parcel_id: ParcelId::from_i64(1),
            author_id: AuthorId::from_i64(1),
            content: "More trees".into(),
            upvotes: 2,
            downvotes: 5,
            created_at: Utc::now(),
        };
        assert_eq!(comment.net_score(), -3);
    }

    #[test]
    fn test_vote_type_parsing() {
        assert_eq!("upvote".parse::<VoteType>().unwrap(), VoteType::Upvote);
        assert_eq!("downvote".parse::<VoteType>().unwrap(), VoteType::Downvote);
        assert!("sideways".parse::<VoteType>().is_err());
        assert!("Upvote".parse::<VoteType>().is_err());
    }
}
