use std::cmp::Reverse;

use super::models::Comment;

/// Order comments best-first
///
/// Net score descending, then newest first, then highest id, so the output is
/// fully determined by the input set.
pub fn rank_comments(comments: &[Comment]) -> Vec<Comment> {
    let mut ranked = comments.to_vec();
    ranked.sort_by_key(|c| Reverse((c.net_score(), c.created_at, c.id)));
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::{AuthorId, CommentId, ParcelId};
    use chrono::{Duration, TimeZone, Utc};

    fn comment(id: i64, up: i32, down: i32, minutes: i64) -> Comment {
        let base = Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap();
        Comment {
            id: CommentId::from_i64(id),
            parcel_id: ParcelId::from_i64(1),
            author_id: AuthorId::from_i64(1),
            content: format!("comment {}", id),
            upvotes: up,
            downvotes: down,
            created_at: base + Duration::minutes(minutes),
        }
    }

    fn ids(comments: &[Comment]) -> Vec<i64> {
        comments.iter().map(|c| c.id.as_i64()).collect()
    }

    #[test]
    fn test_orders_by_net_score_then_recency() {
        let comments = vec![
            comment(1, 1, 0, 0),
            comment(2, 5, 1, 0),
            comment(3, 1, 0, 30),
            comment(4, 0, 3, 60),
        ];

        let ranked = rank_comments(&comments);
        // 2 (net 4), 3 (net 1, newer), 1 (net 1), 4 (net -3)
        assert_eq!(ids(&ranked), vec![2, 3, 1, 4]);
    }

    #[test]
    fn test_ranking_is_idempotent_and_leaves_input_alone() {
        let comments = vec![comment(1, 0, 0, 5), comment(2, 3, 0, 0), comment(3, 0, 0, 5)];
        let before = comments.clone();

        let once = rank_comments(&comments);
        let twice = rank_comments(&once);

        assert_eq!(once, twice);
        assert_eq!(comments, before);
        // equal score and timestamp fall back to id descending
        assert_eq!(ids(&once), vec![2, 3, 1]);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank_comments(&[]).is_empty());
    }
}
