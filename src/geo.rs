//! Planar and great-circle distance helpers.
//!
//! Haversine for region distances, and a flat-earth RMS dispersion
//! ("stability") for clusters of fixes inside a single farm region.

use std::f64::consts::PI;

const DEG: f64 = PI / 180.0;

/// Mean Earth radius used for great-circle distances.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Flat-earth conversion factor for small dispersions.
pub const METERS_PER_DEGREE: f64 = 111_000.0;

/// Great-circle distance in kilometers between two WGS84 points.
pub fn haversine_km(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let d_lat = (lat2 - lat1) * DEG;
    let d_lon = (lon2 - lon1) * DEG;

    let a = (d_lat / 2.0).sin().powi(2)
        + (lat1 * DEG).cos() * (lat2 * DEG).cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).max(0.0).sqrt());

    EARTH_RADIUS_KM * c
}

/// Arithmetic mean of a set of (lat, lon) points.
/// Returns None for an empty set.
pub fn centroid(points: &[(f64, f64)]) -> Option<(f64, f64)> {
    if points.is_empty() {
        return None;
    }
    let n = points.len() as f64;
    let (sum_lat, sum_lon) = points
        .iter()
        .fold((0.0, 0.0), |(a, b), (lat, lon)| (a + lat, b + lon));
    Some((sum_lat / n, sum_lon / n))
}

/// RMS planar deviation of the points from their centroid, in meters.
///
/// An empty or single-point set has zero dispersion.
pub fn stability_m(points: &[(f64, f64)]) -> f64 {
    let Some((mean_lat, mean_lon)) = centroid(points) else {
        return 0.0;
    };
    let mean_sq = points
        .iter()
        .map(|(lat, lon)| (lat - mean_lat).powi(2) + (lon - mean_lon).powi(2))
        .sum::<f64>()
        / points.len() as f64;

    mean_sq.sqrt() * METERS_PER_DEGREE
}

/// Format coordinates as "17.3850°N, 78.4867°E".
pub fn format_coords(lat: f64, lon: f64) -> String {
    let ns = if lat >= 0.0 { 'N' } else { 'S' };
    let ew = if lon >= 0.0 { 'E' } else { 'W' };
    format!("{:.4}\u{00B0}{}, {:.4}\u{00B0}{}", lat.abs(), ns, lon.abs(), ew)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_haversine_known_distance() {
        // Hyderabad → Bengaluru is roughly 500 km as the crow flies.
        let d = haversine_km(17.3850, 78.4867, 12.9716, 77.5946);
        assert!(d > 490.0 && d < 510.0, "got {}", d);
    }

    #[test]
    fn test_haversine_zero_for_same_point() {
        assert_eq!(haversine_km(17.0, 78.5, 17.0, 78.5), 0.0);
    }

    #[test]
    fn test_stability_identical_readings_is_zero() {
        let pts = vec![(17.0, 78.5); 5];
        assert_eq!(stability_m(&pts), 0.0);
    }

    #[test]
    fn test_stability_two_points() {
        // Two points 0.0002° apart in latitude: each deviates 0.0001° → 11.1 m.
        let pts = [(17.0, 78.5), (17.0002, 78.5)];
        assert_relative_eq!(stability_m(&pts), 11.1, epsilon = 1e-6);
    }

    #[test]
    fn test_centroid_empty() {
        assert!(centroid(&[]).is_none());
        assert_eq!(stability_m(&[]), 0.0);
    }

    #[test]
    fn test_format_coords() {
        assert_eq!(format_coords(17.385, 78.4867), "17.3850°N, 78.4867°E");
        assert_eq!(format_coords(-2.0, -40.0), "2.0000°S, 40.0000°W");
    }

    fn coord() -> impl Strategy<Value = (f64, f64)> {
        (-89.0..89.0f64, -179.0..179.0f64)
    }

    proptest! {
        #[test]
        fn prop_haversine_symmetric(a in coord(), b in coord()) {
            let ab = haversine_km(a.0, a.1, b.0, b.1);
            let ba = haversine_km(b.0, b.1, a.0, a.1);
            prop_assert!((ab - ba).abs() < 1e-6);
        }

        #[test]
        fn prop_haversine_triangle_inequality(a in coord(), b in coord(), c in coord()) {
            let ab = haversine_km(a.0, a.1, b.0, b.1);
            let bc = haversine_km(b.0, b.1, c.0, c.1);
            let ac = haversine_km(a.0, a.1, c.0, c.1);
            prop_assert!(ac <= ab + bc + 1e-6);
        }

        #[test]
        fn prop_stability_grows_with_dispersion(
            base in coord(),
            offsets in prop::collection::vec((-0.01..0.01f64, -0.01..0.01f64), 2..8),
            factor in 1.0..10.0f64,
        ) {
            let near: Vec<_> = offsets.iter().map(|(a, b)| (base.0 + a, base.1 + b)).collect();
            let far: Vec<_> = offsets.iter().map(|(a, b)| (base.0 + a * factor, base.1 + b * factor)).collect();
            let s_near = stability_m(&near);
            let s_far = stability_m(&far);
            prop_assert!(s_near >= 0.0);
            prop_assert!(s_far + 1e-6 >= s_near);
        }
    }
}
