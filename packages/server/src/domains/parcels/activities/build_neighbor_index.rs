//! Neighbor index builder.
//!
//! Brute-force all-pairs search: for each located parcel, measure the distance
//! to every other located parcel and keep the K closest. Runs offline, so the
//! O(n^2) cost never touches the request path.

use futures::future::join_all;
use serde::Serialize;
use std::cmp::Ordering;
use tracing::{info, warn};

use crate::common::ParcelId;
use crate::domains::geo::{haversine_km, Coordinates};
use crate::domains::parcels::models::{Parcel, UpsertOutcome};
use crate::kernel::BaseNeighborStore;

const PROGRESS_EVERY: usize = 50;

/// A parcel reduced to what the distance search needs
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ParcelPoint {
    pub id: ParcelId,
    pub coordinates: Coordinates,
}

impl ParcelPoint {
    pub fn new(id: ParcelId, latitude: f64, longitude: f64) -> Self {
        Self {
            id,
            coordinates: Coordinates::new(latitude, longitude),
        }
    }

    /// Points for every parcel with usable coordinates; the rest are skipped.
    pub fn from_parcels(parcels: &[Parcel]) -> Vec<Self> {
        parcels
            .iter()
            .filter_map(|parcel| {
                parcel.coordinates().map(|coordinates| ParcelPoint {
                    id: parcel.id,
                    coordinates,
                })
            })
            .collect()
    }
}

/// Ids of the `k` parcels nearest to `target`, nearest first
///
/// Never includes the target itself. Equal distances are ordered by id ascending.
pub fn compute_neighbors(target: &ParcelPoint, all: &[ParcelPoint], k: usize) -> Vec<ParcelId> {
    let mut distances: Vec<(f64, ParcelId)> = all
        .iter()
        .filter(|other| other.id != target.id)
        .map(|other| (haversine_km(target.coordinates, other.coordinates), other.id))
        .collect();

    distances.sort_by(|a, b| match a.0.total_cmp(&b.0) {
        Ordering::Equal => a.1.cmp(&b.1),
        order => order,
    });

    distances.into_iter().take(k).map(|(_, id)| id).collect()
}

/// Counts reported at the end of a run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct NeighborIndexReport {
    pub total: usize,
    pub processed: usize,
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
}

/// Computes and stores a NeighborSet for every parcel
#[derive(Debug, Clone, Copy)]
pub struct NeighborIndexBuilder {
    k: usize,
    batch_size: usize,
}

impl NeighborIndexBuilder {
    pub fn new(k: usize, batch_size: usize) -> Self {
        Self {
            k,
            batch_size: batch_size.max(1),
        }
    }

    pub fn k(&self) -> usize {
        self.k
    }

    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    /// Run over `points`, writing through `store`
    ///
    /// Batches run one after another; parcels within a batch run concurrently.
    /// A failed write is logged and counted, and the run continues.
    pub async fn build(
        &self,
        points: &[ParcelPoint],
        store: &dyn BaseNeighborStore,
    ) -> NeighborIndexReport {
        let mut report = NeighborIndexReport {
            total: points.len(),
            ..Default::default()
        };

        info!(
            total = report.total,
            k = self.k,
            batch_size = self.batch_size,
            "Building neighbor index"
        );

        for batch in points.chunks(self.batch_size) {
            let writes = batch.iter().map(|point| async move {
                let neighbors = compute_neighbors(point, points, self.k);
                (point.id, store.upsert(point.id, &neighbors).await)
            });

            for (parcel_id, result) in join_all(writes).await {
                report.processed += 1;
                match result {
                    Ok(UpsertOutcome::Created) => report.created += 1,
                    Ok(UpsertOutcome::Updated) => report.updated += 1,
                    Err(e) => {
                        report.failed += 1;
                        warn!(parcel_id = %parcel_id, error = %e, "Failed to store neighbors");
                    }
                }

                if report.processed % PROGRESS_EVERY == 0 {
                    info!(
                        processed = report.processed,
                        total = report.total,
                        "Neighbor index progress"
                    );
                }
            }
        }

        info!(
            total = report.total,
            processed = report.processed,
            created = report.created,
            updated = report.updated,
            failed = report.failed,
            "Neighbor index complete"
        );

        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(value: i64) -> ParcelId {
        ParcelId::from_i64(value)
    }

    /// Points along a meridian, spaced by `step` degrees of latitude.
    fn line(n: i64, step: f64) -> Vec<ParcelPoint> {
        (1..=n)
            .map(|i| ParcelPoint::new(id(i), 39.9 + step * i as f64, -75.16))
            .collect()
    }

    #[test]
    fn test_excludes_self_and_orders_by_distance() {
        let points = line(6, 0.01);
        let neighbors = compute_neighbors(&points[2], &points, 10);

        assert_eq!(neighbors.len(), 5);
        assert!(!neighbors.contains(&id(3)));

        let distance_to = |neighbor: &ParcelId| {
            let point = points.iter().find(|p| p.id == *neighbor).unwrap();
            haversine_km(points[2].coordinates, point.coordinates)
        };
        let distances: Vec<f64> = neighbors.iter().map(distance_to).collect();
        assert!(distances.windows(2).all(|w| w[0] <= w[1]));

        let mut nearest = neighbors[..2].to_vec();
        nearest.sort();
        assert_eq!(nearest, vec![id(2), id(4)]);
        assert_eq!(neighbors[4], id(6));
    }

    #[test]
    fn test_truncates_to_k() {
        let points = line(20, 0.001);
        let neighbors = compute_neighbors(&points[0], &points, 10);
        assert_eq!(neighbors.len(), 10);
        assert_eq!(neighbors[0], id(2));
        assert_eq!(neighbors[9], id(11));

        assert!(compute_neighbors(&points[0], &points, 0).is_empty());
    }

    #[test]
    fn test_non_finite_points_sort_last() {
        let mut points = line(3, 0.01);
        points.push(ParcelPoint::new(id(99), f64::NAN, -75.16));

        let neighbors = compute_neighbors(&points[0], &points, 10);
        assert_eq!(neighbors.last(), Some(&id(99)));
    }

    #[test]
    fn test_duplicate_locations_tie_break_on_id() {
        let points = vec![
            ParcelPoint::new(id(1), 39.95, -75.16),
            ParcelPoint::new(id(7), 39.96, -75.17),
            ParcelPoint::new(id(3), 39.96, -75.17),
            ParcelPoint::new(id(5), 39.96, -75.17),
        ];
        let neighbors = compute_neighbors(&points[0], &points, 10);
        assert_eq!(neighbors, vec![id(3), id(5), id(7)]);
    }

    #[test]
    fn test_zero_batch_size_is_treated_as_one() {
        let builder = NeighborIndexBuilder::new(10, 0);
        assert_eq!(builder.batch_size(), 1);
        assert_eq!(builder.k(), 10);
    }
}
