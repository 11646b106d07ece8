//! Great-circle geometry over WGS84 coordinates.
//!
//! Foundation for all catalog matching: pure functions, no failure modes.
//! Callers are responsible for validating coordinates before passing them in.

use serde::{Deserialize, Serialize};

/// Earth radius in kilometers (mean).
const EARTH_RADIUS_KM: f64 = 6371.0;

/// A geographic point. Serialized as `{ "lat": .., "lng": .. }` to match
/// the intake payload shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl Coordinates {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// Haversine great-circle distance between two points, in kilometers.
///
/// Symmetric, zero for identical points, non-negative.
pub fn distance_km(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lat = (lat2 - lat1).to_radians();
    let d_lng = (lng2 - lng1).to_radians();

    let a = (d_lat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (d_lng / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Distance between two [`Coordinates`], in kilometers.
pub fn distance_between(a: Coordinates, b: Coordinates) -> f64 {
    distance_km(a.lat, a.lng, b.lat, b.lng)
}

/// Initial bearing from the first point to the second, in degrees [0, 360).
pub fn bearing_degrees(lat1: f64, lng1: f64, lat2: f64, lng2: f64) -> f64 {
    let d_lng = (lng2 - lng1).to_radians();
    let lat1 = lat1.to_radians();
    let lat2 = lat2.to_radians();

    let y = d_lng.sin() * lat2.cos();
    let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lng.cos();

    (y.atan2(x).to_degrees() + 360.0) % 360.0
}

/// Format a distance for display: meters under 1 km, one decimal under
/// 10 km, whole kilometers beyond.
pub fn format_distance(distance_km: f64) -> String {
    if distance_km < 1.0 {
        format!("{} m", (distance_km * 1000.0).round() as i64)
    } else if distance_km < 10.0 {
        format!("{distance_km:.1} km")
    } else {
        format!("{} km", distance_km.round() as i64)
    }
}

/// Whether a point falls inside the service area (approximate Pakistan
/// bounding box). Used for intake sanity checks, not for matching.
pub fn within_service_area(lat: f64, lng: f64) -> bool {
    (23.634..=37.084).contains(&lat) && (60.878..=77.837).contains(&lng)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KARACHI: (f64, f64) = (24.8607, 67.0011);
    const LAHORE: (f64, f64) = (31.5804, 74.3587);

    #[test]
    fn distance_is_symmetric() {
        let ab = distance_km(KARACHI.0, KARACHI.1, LAHORE.0, LAHORE.1);
        let ba = distance_km(LAHORE.0, LAHORE.1, KARACHI.0, KARACHI.1);
        assert!((ab - ba).abs() < 1e-9);
    }

    #[test]
    fn distance_to_self_is_zero() {
        assert_eq!(distance_km(KARACHI.0, KARACHI.1, KARACHI.0, KARACHI.1), 0.0);
    }

    #[test]
    fn distance_is_non_negative() {
        for (lat, lng) in [(-80.0, 170.0), (0.0, 0.0), (45.0, -120.0)] {
            assert!(distance_km(lat, lng, KARACHI.0, KARACHI.1) >= 0.0);
        }
    }

    #[test]
    fn karachi_to_lahore_roughly_known() {
        // Great-circle distance is just over 1,000 km.
        let d = distance_km(KARACHI.0, KARACHI.1, LAHORE.0, LAHORE.1);
        assert!((1000.0..1100.0).contains(&d), "got {d}");
    }

    #[test]
    fn triangle_inequality_holds() {
        let isb = (33.7077, 73.0563);
        let ab = distance_km(KARACHI.0, KARACHI.1, LAHORE.0, LAHORE.1);
        let bc = distance_km(LAHORE.0, LAHORE.1, isb.0, isb.1);
        let ac = distance_km(KARACHI.0, KARACHI.1, isb.0, isb.1);
        assert!(ac <= ab + bc + 1e-6);
    }

    #[test]
    fn bearing_in_range() {
        let b = bearing_degrees(KARACHI.0, KARACHI.1, LAHORE.0, LAHORE.1);
        assert!((0.0..360.0).contains(&b));
    }

    #[test]
    fn format_distance_buckets() {
        assert_eq!(format_distance(0.25), "250 m");
        assert_eq!(format_distance(4.26), "4.3 km");
        assert_eq!(format_distance(37.4), "37 km");
    }

    #[test]
    fn service_area_bounds() {
        assert!(within_service_area(KARACHI.0, KARACHI.1));
        assert!(within_service_area(LAHORE.0, LAHORE.1));
        assert!(!within_service_area(51.5, -0.12)); // London
    }
}
