use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use typed_builder::TypedBuilder;

use crate::common::ParcelId;
use crate::domains::geo::Coordinates;

/// Parcel - a mapped land unit with coordinates and vacancy attributes
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Parcel {
    pub id: ParcelId,
    /// Key in the source dataset, used to skip re-imports
    pub objectid: Option<i64>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub address: Option<String>,
    pub vacant_flag: Option<String>,
    pub vacant_rank: Option<f64>,
    pub created_at: DateTime<Utc>,
}

/// Fields for inserting a parcel during bulk load
#[derive(Debug, Clone, TypedBuilder)]
#[builder(field_defaults(default, setter(into)))]
pub struct NewParcel {
    pub objectid: Option<i64>,
    pub longitude: Option<f64>,
    pub latitude: Option<f64>,
    pub address: Option<String>,
    pub vacant_flag: Option<String>,
    pub vacant_rank: Option<f64>,
}

impl Parcel {
    /// Both coordinates, if present and finite.
    pub fn coordinates(&self) -> Option<Coordinates> {
        let point = Coordinates::new(self.latitude?, self.longitude?);
        point.is_finite().then_some(point)
    }
}

// =============================================================================
// SQL Queries - ALL queries must be in models/
// =============================================================================

impl Parcel {
    pub async fn find_by_id(id: ParcelId, pool: &PgPool) -> Result<Option<Self>> {
        let parcel = sqlx::query_as::<_, Parcel>("SELECT * FROM parcels WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await?;
        Ok(parcel)
    }

    /// All parcels with both coordinates set, ordered by id
    pub async fn find_all_located(pool: &PgPool) -> Result<Vec<Self>> {
        let parcels = sqlx::query_as::<_, Parcel>(
            r#"
            SELECT * FROM parcels
            WHERE latitude IS NOT NULL AND longitude IS NOT NULL
            ORDER BY id
            "#,
        )
        .fetch_all(pool)
        .await?;
        Ok(parcels)
    }

    pub async fn exists(id: ParcelId, pool: &PgPool) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parcels WHERE id = $1)")
                .bind(id)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    pub async fn exists_by_objectid(objectid: i64, pool: &PgPool) -> Result<bool> {
        let exists: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM parcels WHERE objectid = $1)")
                .bind(objectid)
                .fetch_one(pool)
                .await?;
        Ok(exists)
    }

    pub async fn create(new: &NewParcel, pool: &PgPool) -> Result<Self> {
        let parcel = sqlx::query_as::<_, Parcel>(
            r#"
            INSERT INTO parcels (objectid, longitude, latitude, address, vacant_flag, vacant_rank)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(new.objectid)
        .bind(new.longitude)
        .bind(new.latitude)
        .bind(&new.address)
        .bind(&new.vacant_flag)
        .bind(new.vacant_rank)
        .fetch_one(pool)
        .await?;
        Ok(parcel)
    }
}
