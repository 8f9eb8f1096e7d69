use anyhow::Result;
use sqlx::PgPool;

use crate::common::ParcelId;
use crate::domains::comments::{rank_comments, Comment};
use crate::domains::parcels::models::NeighborSet;

/// The comment pool a summary is built from
#[derive(Debug, Clone, Default)]
pub struct GatheredComments {
    /// Own comments first, then neighbor comments, each group ranked; capped
    pub comments: Vec<Comment>,
    pub own_count: usize,
    pub neighbor_count: usize,
}

impl GatheredComments {
    /// Combine two ranked groups, own first, and cap the result
    pub fn combine(own: Vec<Comment>, neighbors: Vec<Comment>, cap: usize) -> Self {
        let own_count = own.len();
        let neighbor_count = neighbors.len();
        let comments = own.into_iter().chain(neighbors).take(cap).collect();
        Self {
            comments,
            own_count,
            neighbor_count,
        }
    }

    /// Uncapped total, so comments beyond the cap still move the fingerprint
    pub fn fingerprint(&self) -> u64 {
        (self.own_count + self.neighbor_count) as u64
    }

    pub fn texts(&self) -> Vec<String> {
        self.comments.iter().map(|c| c.content.clone()).collect()
    }
}

/// Own comments plus those on the parcel's stored neighbors
pub async fn gather_comments(
    parcel_id: ParcelId,
    cap: usize,
    pool: &PgPool,
) -> Result<GatheredComments> {
    let own = rank_comments(&Comment::find_by_parcel(parcel_id, pool).await?);

    let neighbor_ids: Vec<ParcelId> = NeighborSet::find_by_parcel(parcel_id, pool)
        .await?
        .map(|set| {
            set.neighbor_ids
                .into_iter()
                .filter(|id| *id != parcel_id)
                .collect()
        })
        .unwrap_or_default();

    let neighbors = rank_comments(&Comment::find_by_parcels(&neighbor_ids, pool).await?);

    Ok(GatheredComments::combine(own, neighbors, cap))
}
