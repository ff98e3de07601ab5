use serde::{Deserialize, Serialize};

pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Multiplier applied to the great-circle distance to approximate road
/// travel distance. A fixed estimate, not derived from routing data.
pub const ROAD_TOLERANCE_FACTOR: f64 = 1.5;

/// Road distance is never shorter than the straight line, so the factor
/// must be finite and above 1.0.
pub fn is_valid_tolerance_factor(tolerance_factor: f64) -> bool {
    tolerance_factor.is_finite() && tolerance_factor > 1.0
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }

    /// Finite and inside the -90..=90 / -180..=180 degree ranges.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

/// Calculate distance between two coordinates using Haversine formula
/// Returns distance in kilometers
pub fn haversine_distance(a: Coordinate, b: Coordinate) -> f64 {
    let lat1_rad = a.latitude.to_radians();
    let lat2_rad = b.latitude.to_radians();
    let delta_lat = (b.latitude - a.latitude).to_radians();
    let delta_lng = (b.longitude - a.longitude).to_radians();

    // Rounding can push h slightly past 1.0 for antipodal points
    let h = ((delta_lat / 2.0).sin().powi(2)
        + lat1_rad.cos() * lat2_rad.cos() * (delta_lng / 2.0).sin().powi(2))
    .clamp(0.0, 1.0);
    let c = 2.0 * h.sqrt().asin();

    EARTH_RADIUS_KM * c
}

/// Great-circle distance scaled by `tolerance_factor`
pub fn road_distance(a: Coordinate, b: Coordinate, tolerance_factor: f64) -> f64 {
    haversine_distance(a, b) * tolerance_factor
}

/// Estimated road distance in kilometers using [`ROAD_TOLERANCE_FACTOR`]
pub fn distance(a: Coordinate, b: Coordinate) -> f64 {
    road_distance(a, b, ROAD_TOLERANCE_FACTOR)
}

#[cfg(test)]
mod tests {
    use super::*;

    const JAKARTA: Coordinate = Coordinate::new(-6.2088, 106.8456);
    const BANDUNG: Coordinate = Coordinate::new(-6.9175, 107.6191);

    #[test]
    fn test_haversine_jakarta_bandung() {
        let distance = haversine_distance(JAKARTA, BANDUNG);
        // Should be approximately 115-125 km
        assert!(distance > 100.0 && distance < 150.0);
    }

    #[test]
    fn test_distance_to_self_is_zero() {
        for c in [JAKARTA, BANDUNG, Coordinate::new(0.0, 0.0), Coordinate::new(90.0, 180.0)] {
            assert_eq!(distance(c, c), 0.0);
        }
    }

    #[test]
    fn test_distance_is_symmetric() {
        let pairs = [
            (JAKARTA, BANDUNG),
            (Coordinate::new(3.5952, 98.6722), Coordinate::new(-0.9471, 100.4172)),
            (Coordinate::new(51.5, -0.12), Coordinate::new(-33.86, 151.2)),
        ];
        for (a, b) in pairs {
            assert!((distance(a, b) - distance(b, a)).abs() < 1e-9);
        }
    }

    #[test]
    fn test_distance_scales_with_tolerance_factor() {
        let straight = haversine_distance(JAKARTA, BANDUNG);
        assert_eq!(distance(JAKARTA, BANDUNG), straight * ROAD_TOLERANCE_FACTOR);
        assert_eq!(road_distance(JAKARTA, BANDUNG, 2.0), straight * 2.0);
    }

    #[test]
    fn test_tolerance_factor_validity() {
        assert!(is_valid_tolerance_factor(ROAD_TOLERANCE_FACTOR));
        assert!(is_valid_tolerance_factor(1.01));
        assert!(!is_valid_tolerance_factor(1.0));
        assert!(!is_valid_tolerance_factor(-1.5));
        assert!(!is_valid_tolerance_factor(f64::INFINITY));
        assert!(!is_valid_tolerance_factor(f64::NAN));
    }

    #[test]
    fn test_antipodal_points_are_finite() {
        let a = Coordinate::new(0.0, 0.0);
        let b = Coordinate::new(0.0, 180.0);
        let d = haversine_distance(a, b);
        assert!(d.is_finite());
        // Half the circumference
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-6);

        let north = Coordinate::new(90.0, 0.0);
        let south = Coordinate::new(-90.0, 0.0);
        assert!(distance(north, south).is_finite());
    }

    #[test]
    fn test_coordinate_validity() {
        assert!(JAKARTA.is_valid());
        assert!(!Coordinate::new(91.0, 0.0).is_valid());
        assert!(!Coordinate::new(0.0, -180.5).is_valid());
        assert!(!Coordinate::new(f64::NAN, 0.0).is_valid());
    }
}
