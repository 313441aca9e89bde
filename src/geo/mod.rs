//! Geodesic distance between collection points.

use serde::{Deserialize, Serialize};

use crate::config::defaults::EARTH_RADIUS_KM;

/// Latitude / longitude pair in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Great-circle distance to `other` in kilometers.
    pub fn distance_km(&self, other: &Coordinate) -> f64 {
        haversine_km(self.latitude, self.longitude, other.latitude, other.longitude)
    }
}

/// Great-circle distance in kilometers using the haversine formula.
///
/// Total over finite input. Non-finite coordinates propagate into the result
/// (NaN/Inf out); callers validate coordinates upstream.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let dlat = (lat2 - lat1).to_radians();
    let dlon = (lon2 - lon1).to_radians();

    let a = (dlat / 2.0).sin().powi(2)
        + lat1.to_radians().cos() * lat2.to_radians().cos() * (dlon / 2.0).sin().powi(2);
    // a can drift a hair above 1.0 for antipodal points
    let a = if a > 1.0 { 1.0 } else { a };
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_distance_to_self_is_zero() {
        for &(lat, lon) in &[(0.0, 0.0), (28.7041, 77.1025), (-89.9, 179.9), (51.5, -0.12)] {
            assert_eq!(haversine_km(lat, lon, lat, lon), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let a = Coordinate::new(28.6139, 77.2090);
        let b = Coordinate::new(28.5355, 77.3910);
        let ab = a.distance_km(&b);
        let ba = b.distance_km(&a);
        assert!((ab - ba).abs() < 1e-9, "ab={ab} ba={ba}");
    }

    #[test]
    fn test_one_degree_of_longitude_at_equator() {
        let d = haversine_km(0.0, 0.0, 0.0, 1.0);
        // 2π·6371/360 ≈ 111.195 km
        assert!((d - 111.195).abs() < 0.01, "d={d}");
    }

    #[test]
    fn test_known_city_pair() {
        // Connaught Place → Noida Sector 18, roughly 12-13 km apart
        let d = haversine_km(28.6315, 77.2167, 28.5708, 77.3261);
        assert!(d > 12.0 && d < 14.0, "d={d}");
    }

    #[test]
    fn test_antipodal_points_half_circumference() {
        let d = haversine_km(0.0, 0.0, 0.0, 180.0);
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6, "d={d}");
    }

    #[test]
    fn test_nan_propagates() {
        assert!(haversine_km(f64::NAN, 0.0, 0.0, 0.0).is_nan());
    }
}
