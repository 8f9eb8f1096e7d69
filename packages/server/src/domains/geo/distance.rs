use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A point in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.latitude.is_finite() && self.longitude.is_finite()
    }
}

/// Great-circle distance between two coordinates in kilometers
///
/// Uses the Haversine formula with a 6371 km Earth radius.
///
/// Identical points return exactly `0.0`. Out-of-range but finite inputs are passed
/// through; the haversine term is clamped to `[0, 1]` so they can never yield NaN.
/// Non-finite inputs return `f64::MAX` so such points sort after every real one.
///
/// # Example
/// ```
/// use blockly_core::domains::geo::{haversine_km, Coordinates};
///
/// let a = Coordinates::new(39.95, -75.16);
/// assert_eq!(haversine_km(a, a), 0.0);
/// ```
pub fn haversine_km(a: Coordinates, b: Coordinates) -> f64 {
    if !a.is_finite() || !b.is_finite() {
        return f64::MAX;
    }
    if a == b {
        return 0.0;
    }

    let dlat = (b.latitude - a.latitude).to_radians();
    let dlng = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2)
        + a.latitude.to_radians().cos()
            * b.latitude.to_radians().cos()
            * (dlng / 2.0).sin().powi(2);
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_KM * c
}
