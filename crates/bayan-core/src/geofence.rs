//! Geofence Evaluator — great-circle distance between a captured coordinate
//! and a tenant's registered centroid.
//!
//! The distance is advisory evidence forwarded to the adjudicator; it is
//! never a hard gate inside this core.

use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Fallback reference point for tenants provisioned without a centroid
/// (Manila City Hall).
pub const DEFAULT_CENTROID: Coordinates =
  Coordinates { lat: 14.5995, lng: 120.9842 };

/// A WGS 84 coordinate pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
  pub lat: f64,
  pub lng: f64,
}

/// Haversine distance between two coordinates, in kilometres.
pub fn distance_km(a: Coordinates, b: Coordinates) -> f64 {
  let (lat1, lat2) = (a.lat.to_radians(), b.lat.to_radians());
  let d_lat = (b.lat - a.lat).to_radians();
  let d_lng = (b.lng - a.lng).to_radians();

  let h = (d_lat / 2.0).sin().powi(2)
    + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);

  2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt())
}

/// Round to two decimals for display and evidence payloads.
pub fn round2(km: f64) -> f64 {
  (km * 100.0).round() / 100.0
}
