use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::common::ParcelId;
use crate::kernel::BaseNeighborStore;

/// NeighborSet - a parcel's K nearest other parcels, nearest first
///
/// Derived data: every `populate_neighbors` run overwrites it.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct NeighborSet {
    #[sqlx(rename = "id")]
    pub parcel_id: ParcelId,
    pub neighbor_ids: Vec<ParcelId>,
    pub updated_at: DateTime<Utc>,
}

/// Whether an upsert inserted a new row or replaced an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl NeighborSet {
    pub async fn find_by_parcel(parcel_id: ParcelId, pool: &PgPool) -> Result<Option<Self>> {
        let set = sqlx::query_as::<_, NeighborSet>("SELECT * FROM neighbors WHERE id = $1")
            .bind(parcel_id)
            .fetch_optional(pool)
            .await?;
        Ok(set)
    }

    /// Create or replace the parcel's neighbor list
    pub async fn upsert(
        parcel_id: ParcelId,
        neighbor_ids: &[ParcelId],
        pool: &PgPool,
    ) -> Result<UpsertOutcome> {
        let inserted: bool = sqlx::query_scalar(
            r#"
            INSERT INTO neighbors (id, neighbor_ids, updated_at)
            VALUES ($1, $2, NOW())
            ON CONFLICT (id) DO UPDATE
            SET neighbor_ids = EXCLUDED.neighbor_ids,
                updated_at = NOW()
            RETURNING (xmax = 0) AS inserted
            "#,
        )
        .bind(parcel_id)
        .bind(neighbor_ids)
        .fetch_one(pool)
        .await
        .with_context(|| format!("failed to upsert neighbors for parcel {}", parcel_id))?;

        Ok(if inserted {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        })
    }

    pub async fn count(pool: &PgPool) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM neighbors")
            .fetch_one(pool)
            .await?;
        Ok(count)
    }
}

/// Neighbor store backed by the `neighbors` table
#[derive(Clone)]
pub struct PostgresNeighborStore {
    pool: PgPool,
}

impl PostgresNeighborStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BaseNeighborStore for PostgresNeighborStore {
    async fn upsert(
        &self,
        parcel_id: ParcelId,
        neighbor_ids: &[ParcelId],
    ) -> Result<UpsertOutcome> {
        NeighborSet::upsert(parcel_id, neighbor_ids, &self.pool).await
    }
}
