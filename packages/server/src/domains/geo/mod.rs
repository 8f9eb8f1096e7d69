pub mod distance;

pub use distance::{haversine_km, Coordinates, EARTH_RADIUS_KM};
