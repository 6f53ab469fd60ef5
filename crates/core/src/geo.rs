//! Geographic helpers for delivery distance.
//!
//! Distances are great-circle distances on a spherical Earth, which is well
//! within the accuracy needed to pick a delivery zone.

use serde::{Deserialize, Serialize};

/// Mean Earth radius used by the haversine formula.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A latitude/longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    #[must_use]
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Great-circle distance to `other` in kilometers.
    #[must_use]
    pub fn distance_km(&self, other: &Self) -> f64 {
        haversine_distance_km(self.lat, self.lng, other.lat, other.lng)
    }
}

/// One address-search result.
///
/// Produced by the address-search client and consumed during checkout to
/// price delivery. Never persisted on its own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeocodedAddress {
    /// Human-readable address as returned by the geocoder.
    pub display_name: String,
    pub lat: f64,
    pub lng: f64,
}

impl GeocodedAddress {
    #[must_use]
    pub const fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.lat, self.lng)
    }
}

/// Great-circle distance between two points given in degrees, in kilometers.
///
/// Inputs are not range-checked; out-of-range coordinates yield a defined but
/// meaningless number rather than an error. The result is symmetric in its
/// two points and zero for identical points.
#[must_use]
pub fn haversine_distance_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lon = (lon2 - lon1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}
