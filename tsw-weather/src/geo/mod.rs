//! Geographic positions and great-circle distance.
//!
//! Provides the [`GeoPoint`] value type read from the simulation feed and the
//! haversine distance used to decide when the train has travelled far enough
//! to warrant a fresh weather observation.
//!
//! # Design
//!
//! - Spherical-Earth approximation (radius 6,371 km); errors stay well under
//!   0.5% which is far below the granularity of a weather observation
//! - Longitude wraparound is handled by the trigonometric formulation itself,
//!   so points either side of the antimeridian need no special case
//! - Equality is tolerance-based (~0.1 m) because positions arrive as JSON
//!   floats and jitter in the last few digits

use std::fmt;

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Coordinate tolerance for equality, in degrees (~0.1 m at the equator).
pub const COORDINATE_TOLERANCE_DEG: f64 = 0.000_001;

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeoPoint {
    /// Latitude in degrees (positive north).
    pub latitude: f64,
    /// Longitude in degrees (positive east).
    pub longitude: f64,
}

impl GeoPoint {
    /// Create a new point.
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Great-circle distance to `other` in meters.
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        distance_meters(self, other)
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km_to(&self, other: &GeoPoint) -> f64 {
        distance_km(self, other)
    }
}

impl PartialEq for GeoPoint {
    fn eq(&self, other: &Self) -> bool {
        (self.latitude - other.latitude).abs() < COORDINATE_TOLERANCE_DEG
            && (self.longitude - other.longitude).abs() < COORDINATE_TOLERANCE_DEG
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Lat={:.6}, Lon={:.6}", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two points in meters (haversine formula).
///
/// Symmetric, zero for coincident points, and correct across the
/// antimeridian.
#[inline]
pub fn distance_meters(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let dlat = (b.latitude - a.latitude).to_radians();
    let dlon = (b.longitude - a.longitude).to_radians();

    let h = (dlat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (dlon / 2.0).sin().powi(2);

    // Rounding can push h a hair outside [0, 1] for near-antipodal points
    let h = h.clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());

    EARTH_RADIUS_METERS * c
}

/// Great-circle distance between two points in kilometers.
#[inline]
pub fn distance_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    distance_meters(a, b) / 1000.0
}
