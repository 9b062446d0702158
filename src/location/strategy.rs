//! Pluggable placement and land-use strategies used by the resolver.
//!
//! Both defaults are deterministic approximations: an offset index stands
//! in for polygon containment, and a coordinate hash stands in for a
//! land-cover classifier. Real implementations drop in behind the traits.

use crate::geography::Region;
use super::types::{LandUse, LandUseCategory};

/// Chooses which of a region's ordered sub-regions contains a point.
pub trait SubRegionLocator: Send + Sync {
    /// Index into `count` sub-regions, or None when `count` is zero.
    fn locate(&self, lat: f64, lon: f64, region: &Region, count: usize) -> Option<usize>;
}

/// Decides whether a point lies on plausible farmland.
pub trait LandUseClassifier: Send + Sync {
    fn classify(&self, lat: f64, lon: f64) -> LandUse;
}

// ─── Offset-index locator ───────────────────────────────────────

/// `floor((Δlat + Δlon + 2) · n / 4)` clamped into `0..n`, with deltas
/// taken from the region's reference center.
#[derive(Debug, Clone, Copy, Default)]
pub struct OffsetIndexLocator;

impl SubRegionLocator for OffsetIndexLocator {
    fn locate(&self, lat: f64, lon: f64, region: &Region, count: usize) -> Option<usize> {
        if count == 0 {
            return None;
        }
        let d_lat = lat - region.center_lat;
        let d_lon = lon - region.center_lon;
        let raw = ((d_lat + d_lon + 2.0) * count as f64 / 4.0).floor();
        if !raw.is_finite() || raw < 0.0 {
            return Some(0);
        }
        Some((raw as usize).min(count - 1))
    }
}

// ─── Hash land-use classifier ───────────────────────────────────

/// Geographic bounding box (inclusive).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

impl BoundingBox {
    /// Mainland India plus island margins.
    pub const INDIA: BoundingBox = BoundingBox { min_lat: 6.0, max_lat: 37.5, min_lon: 68.0, max_lon: 97.5 };

    pub fn contains(&self, lat: f64, lon: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_lon..=self.max_lon).contains(&lon)
    }
}

const WATER_BAND: f64 = 0.05;
const URBAN_BAND: f64 = 0.95;

/// Bounding-box check followed by a sine hash of the coordinates.
/// Hash values below 0.05 read as water, above 0.95 as built-up land.
#[derive(Debug, Clone, Copy)]
pub struct HashLandUseClassifier {
    pub bounds: BoundingBox,
}

impl Default for HashLandUseClassifier {
    fn default() -> Self {
        Self { bounds: BoundingBox::INDIA }
    }
}

impl HashLandUseClassifier {
    /// Deterministic value in [0, 1).
    pub fn hash(lat: f64, lon: f64) -> f64 {
        let v = (lat * 12.9898 + lon * 78.233).sin() * 43758.5453;
        v - v.floor()
    }
}

impl LandUseClassifier for HashLandUseClassifier {
    fn classify(&self, lat: f64, lon: f64) -> LandUse {
        if !self.bounds.contains(lat, lon) {
            return LandUse { valid: false, category: LandUseCategory::OutsideRegion };
        }
        let h = Self::hash(lat, lon);
        let category = if h < WATER_BAND {
            LandUseCategory::Water
        } else if h > URBAN_BAND {
            LandUseCategory::Urban
        } else {
            LandUseCategory::Cropland
        };
        LandUse { valid: category == LandUseCategory::Cropland, category }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn region(lat: f64, lon: f64) -> Region {
        Region { name: "R".into(), code: "R".into(), center_lat: lat, center_lon: lon }
    }

    #[test]
    fn test_offset_index_at_center() {
        // (0 + 0 + 2) * 10 / 4 = 5
        assert_eq!(OffsetIndexLocator.locate(18.0, 79.0, &region(18.0, 79.0), 10), Some(5));
    }

    #[test]
    fn test_offset_index_clamped() {
        let r = region(18.0, 79.0);
        assert_eq!(OffsetIndexLocator.locate(10.0, 70.0, &r, 10), Some(0));
        assert_eq!(OffsetIndexLocator.locate(25.0, 85.0, &r, 10), Some(9));
        assert_eq!(OffsetIndexLocator.locate(18.0, 79.0, &r, 0), None);
        assert_eq!(OffsetIndexLocator.locate(f64::NAN, 79.0, &r, 4), Some(0));
    }

    #[test]
    fn test_offset_index_formula() {
        // Δ = (-1.1124, -0.5193) → (0.3683 * 10 / 4) = 0.92 → 0
        let r = region(18.1124, 79.0193);
        assert_eq!(OffsetIndexLocator.locate(17.0, 78.5, &r, 10), Some(0));
        // Δ = (0.5, 0.5) → 3 * 8 / 4 = 6
        assert_eq!(OffsetIndexLocator.locate(18.5, 79.5, &region(18.0, 79.0), 8), Some(6));
    }

    #[test]
    fn test_outside_bounds() {
        let use_ = HashLandUseClassifier::default().classify(2.0, 40.0);
        assert!(!use_.valid);
        assert_eq!(use_.category, LandUseCategory::OutsideRegion);
    }

    #[test]
    fn test_hash_bands() {
        let c = HashLandUseClassifier::default();
        assert_eq!(c.classify(17.0, 78.5).category, LandUseCategory::Cropland);
        assert!(c.classify(17.0, 78.5).valid);
        assert_eq!(c.classify(17.4, 78.5).category, LandUseCategory::Water);
        assert_eq!(c.classify(17.385, 78.4867).category, LandUseCategory::Urban);
    }

    #[test]
    fn test_hash_deterministic_and_in_range() {
        for (lat, lon) in [(10.0, 76.0), (22.5, 88.3), (30.9, 75.85)] {
            let a = HashLandUseClassifier::hash(lat, lon);
            assert_eq!(a, HashLandUseClassifier::hash(lat, lon));
            assert!((0.0..1.0).contains(&a));
        }
    }
}
