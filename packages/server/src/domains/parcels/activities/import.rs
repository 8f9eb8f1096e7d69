//! GeoJSON bulk load of parcels.
//!
//! Expects a FeatureCollection of Point features (`[longitude, latitude]`) whose
//! properties carry `objectid`, `address`, `vacant_flag` and `vacant_rank`.
//! Features whose `objectid` is already stored are skipped, so re-running an
//! import only adds what is missing.

use anyhow::{Context, Result};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use tracing::{info, warn};

use crate::domains::parcels::models::{NewParcel, Parcel};

#[derive(Debug, Deserialize)]
pub struct FeatureCollection {
    #[serde(default)]
    pub features: Vec<Feature>,
}

#[derive(Debug, Deserialize)]
pub struct Feature {
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub properties: FeatureProperties,
}

#[derive(Debug, Deserialize)]
pub struct Geometry {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinates: Vec<f64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct FeatureProperties {
    pub objectid: Option<i64>,
    pub address: Option<String>,
    pub vacant_flag: Option<String>,
    pub vacant_rank: Option<f64>,
}

impl Feature {
    /// Parcel fields for this feature. Non-point geometry leaves coordinates empty.
    pub fn to_new_parcel(&self) -> NewParcel {
        let (longitude, latitude) = match &self.geometry {
            Some(geometry) if geometry.kind == "Point" && geometry.coordinates.len() >= 2 => {
                (Some(geometry.coordinates[0]), Some(geometry.coordinates[1]))
            }
            _ => (None, None),
        };

        NewParcel {
            objectid: self.properties.objectid,
            longitude,
            latitude,
            address: self.properties.address.clone(),
            vacant_flag: self.properties.vacant_flag.clone(),
            vacant_rank: self.properties.vacant_rank,
        }
    }
}

pub fn parse_feature_collection(raw: &str) -> Result<FeatureCollection> {
    serde_json::from_str(raw).context("Invalid GeoJSON FeatureCollection")
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub uploaded: usize,
    pub skipped: usize,
    pub errors: usize,
}

enum FeatureOutcome {
    Uploaded,
    Skipped,
    Failed,
}

async fn import_feature(feature: &Feature, pool: &PgPool) -> FeatureOutcome {
    let new = feature.to_new_parcel();

    if let Some(objectid) = new.objectid {
        match Parcel::exists_by_objectid(objectid, pool).await {
            Ok(true) => return FeatureOutcome::Skipped,
            Ok(false) => {}
            Err(e) => {
                warn!(objectid, error = %e, "Failed to check for existing parcel");
                return FeatureOutcome::Failed;
            }
        }
    }

    match Parcel::create(&new, pool).await {
        Ok(_) => FeatureOutcome::Uploaded,
        Err(e) => {
            warn!(objectid = ?new.objectid, error = %e, "Failed to insert parcel");
            FeatureOutcome::Failed
        }
    }
}

/// Insert every feature not already present, `batch_size` at a time
pub async fn import_parcels(
    collection: &FeatureCollection,
    batch_size: usize,
    pool: &PgPool,
) -> ImportReport {
    let mut report = ImportReport::default();
    let total = collection.features.len();

    info!(total, batch_size, "Importing parcels");

    for batch in collection.features.chunks(batch_size.max(1)) {
        let outcomes = join_all(batch.iter().map(|feature| import_feature(feature, pool))).await;
        for outcome in outcomes {
            match outcome {
                FeatureOutcome::Uploaded => report.uploaded += 1,
                FeatureOutcome::Skipped => report.skipped += 1,
                FeatureOutcome::Failed => report.errors += 1,
            }
        }

        info!(
            done = report.uploaded + report.skipped + report.errors,
            total,
            "Import progress"
        );
    }

    info!(
        uploaded = report.uploaded,
        skipped = report.skipped,
        errors = report.errors,
        "Import complete"
    );

    report
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        "type": "FeatureCollection",
        "features": [
            {
                "type": "Feature",
                "geometry": { "type": "Point", "coordinates": [-75.16, 39.95] },
                "properties": { "objectid": 11, "address": "1200 N 5TH ST", "vacant_flag": "Land", "vacant_rank": 3.5 }
            },
            {
                "type": "Feature",
                "geometry": null,
                "properties": { "objectid": 12 }
            },
            {
                "type": "Feature",
                "geometry": { "type": "Polygon", "coordinates": [] },
                "properties": {}
            }
        ]
    }"#;

    #[test]
    fn test_point_coordinates_are_longitude_first() {
        let collection = parse_feature_collection(SAMPLE).unwrap();
        assert_eq!(collection.features.len(), 3);

        let parcel = collection.features[0].to_new_parcel();
        assert_eq!(parcel.longitude, Some(-75.16));
        assert_eq!(parcel.latitude, Some(39.95));
        assert_eq!(parcel.objectid, Some(11));
        assert_eq!(parcel.vacant_flag.as_deref(), Some("Land"));
        assert_eq!(parcel.vacant_rank, Some(3.5));
    }

    #[test]
    fn test_missing_or_non_point_geometry_has_no_coordinates() {
        let collection = parse_feature_collection(SAMPLE).unwrap();

        let no_geometry = collection.features[1].to_new_parcel();
        assert!(no_geometry.latitude.is_none() && no_geometry.longitude.is_none());
        assert_eq!(no_geometry.objectid, Some(12));

        let polygon = collection.features[2].to_new_parcel();
        assert!(polygon.latitude.is_none());
        assert!(polygon.objectid.is_none());
    }

    #[test]
    fn test_rejects_non_geojson() {
        assert!(parse_feature_collection("not json").is_err());
    }
}
