use axum::{
    extract::{rejection::PathRejection, Extension, Path},
    Json,
};
use serde::Serialize;

use crate::common::ParcelId;
use crate::domains::parcels::models::{NeighborSet, Parcel};
use crate::server::app::AppState;
use crate::server::error::ApiError;

/// GET /parcels - every parcel that has coordinates
pub async fn list_parcels(
    Extension(state): Extension<AppState>,
) -> Result<Json<Vec<Parcel>>, ApiError> {
    let parcels = Parcel::find_all_located(&state.db_pool).await?;
    Ok(Json(parcels))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborsResponse {
    pub neighbor_ids: Vec<ParcelId>,
}

/// GET /parcels/:id/neighbors - nearest first; empty until the index is built
pub async fn parcel_neighbors(
    Extension(state): Extension<AppState>,
    path: Result<Path<String>, PathRejection>,
) -> Result<Json<NeighborsResponse>, ApiError> {
    let Path(raw_id) = path?;
    let parcel_id = ParcelId::parse(&raw_id)
        .map_err(|e| ApiError::Validation(format!("Invalid parcel id: {}", e)))?;

    if !Parcel::exists(parcel_id, &state.db_pool).await? {
        return Err(ApiError::NotFound(format!("Parcel {} not found", parcel_id)));
    }

    let neighbor_ids = NeighborSet::find_by_parcel(parcel_id, &state.db_pool)
        .await?
        .map(|set| set.neighbor_ids)
        .unwrap_or_default();

    Ok(Json(NeighborsResponse { neighbor_ids }))
}
