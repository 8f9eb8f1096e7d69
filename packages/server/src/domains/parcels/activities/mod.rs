//! Parcel activities - offline jobs over the parcel table

pub mod build_neighbor_index;
pub mod import;

use anyhow::Result;
use sqlx::PgPool;
use tracing::info;

use crate::config::NeighborConfig;
use crate::domains::parcels::models::{NeighborSet, Parcel, PostgresNeighborStore};

pub use build_neighbor_index::{
    compute_neighbors, NeighborIndexBuilder, NeighborIndexReport, ParcelPoint,
};
pub use import::{import_parcels, parse_feature_collection, FeatureCollection, ImportReport};

/// Recompute and store the NeighborSet of every located parcel
pub async fn populate_neighbors(
    settings: NeighborConfig,
    pool: &PgPool,
) -> Result<NeighborIndexReport> {
    let parcels = Parcel::find_all_located(pool).await?;
    let points = ParcelPoint::from_parcels(&parcels);
    info!(
        located = points.len(),
        skipped = parcels.len() - points.len(),
        "Loaded parcels for neighbor index"
    );

    let store = PostgresNeighborStore::new(pool.clone());
    let builder = NeighborIndexBuilder::new(settings.k, settings.batch_size);
    let report = builder.build(&points, &store).await;

    let stored = NeighborSet::count(pool).await?;
    info!(stored, k = builder.k(), "Neighbor sets in store");

    Ok(report)
}
