//! Geospatial resolver: raw coordinates → named region, sub-region,
//! locality and agronomic characteristics.
//!
//! Lookup flow:  nearest region (Haversine) → sub-region locator → locality
//! Derivations:  sub-region table → region table → coordinate heuristic
//!
//! Nothing here fails. Unknown regions and unmapped tables degrade to the
//! heuristics so a best-effort answer always exists.

use std::sync::Arc;

use crate::geo::haversine_km;
use crate::geography::{ReferenceGeography, Region};

use super::strategy::{HashLandUseClassifier, LandUseClassifier, OffsetIndexLocator, SubRegionLocator};
use super::types::{
    AdministrativeGroup, ElevationCategory, LandType, LandUse, RainfallZone, RegionalCharacteristics,
    SoilGroup,
};

/// Everything the resolver derives for one point.
#[derive(Debug, Clone)]
pub struct Resolution {
    pub region: Option<Region>,
    pub region_distance_km: Option<f64>,
    pub sub_region: Option<String>,
    pub locality: Option<String>,
    pub characteristics: RegionalCharacteristics,
    pub elevation_m: f64,
    pub land_use: LandUse,
}

/// The resolver with its injected dataset and strategies.
pub struct GeospatialResolver {
    geography: Arc<ReferenceGeography>,
    locator: Box<dyn SubRegionLocator>,
    classifier: Box<dyn LandUseClassifier>,
}

impl GeospatialResolver {
    pub fn new(geography: Arc<ReferenceGeography>) -> Self {
        Self {
            geography,
            locator: Box::new(OffsetIndexLocator),
            classifier: Box::new(HashLandUseClassifier::default()),
        }
    }

    /// Resolver over the built-in dataset with default strategies.
    pub fn builtin() -> Self {
        Self::new(Arc::new(ReferenceGeography::builtin()))
    }

    pub fn with_locator(mut self, locator: impl SubRegionLocator + 'static) -> Self {
        self.locator = Box::new(locator);
        self
    }

    pub fn with_classifier(mut self, classifier: impl LandUseClassifier + 'static) -> Self {
        self.classifier = Box::new(classifier);
        self
    }

    pub fn geography(&self) -> &ReferenceGeography {
        &self.geography
    }

    /// Linear scan for the region whose center is closest (great-circle).
    pub fn nearest_region(&self, lat: f64, lon: f64) -> Option<(&Region, f64)> {
        self.geography
            .regions
            .iter()
            .map(|r| (r, haversine_km(lat, lon, r.center_lat, r.center_lon)))
            .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal))
    }

    /// Sub-region and its first locality, if the dataset lists any.
    pub fn sub_region(&self, lat: f64, lon: f64, region: &Region) -> Option<(String, Option<String>)> {
        let subs = self.geography.sub_regions_of(&region.code);
        let idx = self.locator.locate(lat, lon, region, subs.len())?;
        let name = subs.get(idx)?.clone();
        let locality = self.geography.localities_of(&name).first().cloned();
        Some((name, locality))
    }

    pub fn land_use(&self, lat: f64, lon: f64) -> LandUse {
        self.classifier.classify(lat, lon)
    }

    /// Full resolution of a point.
    pub fn resolve(&self, lat: f64, lon: f64) -> Resolution {
        let nearest = self.nearest_region(lat, lon);
        let region = nearest.map(|(r, _)| r);
        let region_name = region.map(|r| r.name.as_str()).unwrap_or("");

        let (sub_region, locality) = match region.and_then(|r| self.sub_region(lat, lon, r)) {
            Some((s, l)) => (Some(s), l),
            None => (None, None),
        };

        let elevation_m = estimate_elevation(lat, lon, region_name);
        let characteristics = RegionalCharacteristics {
            land_type: self.land_type(lat, lon, region_name, sub_region.as_deref()),
            elevation_category: ElevationCategory::from_meters(elevation_m),
            rainfall_zone: self.rainfall_zone(lat, lon, region_name),
            soil_group: self.soil_group(lat, lon, region_name),
            administrative_group: self.administrative_group(lat, lon, region_name),
        };

        Resolution {
            region: region.cloned(),
            region_distance_km: nearest.map(|(_, d)| d),
            sub_region,
            locality,
            characteristics,
            elevation_m,
            land_use: self.land_use(lat, lon),
        }
    }

    // ─── Table lookups with heuristic fallback ──────────────────

    fn land_type(&self, lat: f64, lon: f64, region: &str, sub_region: Option<&str>) -> LandType {
        sub_region
            .and_then(|s| self.geography.sub_region_land_types.get(s))
            .or_else(|| self.geography.land_types.get(region))
            .copied()
            .unwrap_or_else(|| heuristic_land_type(lat, lon, region))
    }

    fn rainfall_zone(&self, lat: f64, lon: f64, region: &str) -> RainfallZone {
        self.geography
            .rainfall_zones
            .get(region)
            .copied()
            .unwrap_or_else(|| heuristic_rainfall_zone(lat, lon))
    }

    fn soil_group(&self, lat: f64, lon: f64, region: &str) -> SoilGroup {
        self.geography
            .soil_groups
            .get(region)
            .copied()
            .unwrap_or_else(|| heuristic_soil_group(lat, lon))
    }

    fn administrative_group(&self, lat: f64, lon: f64, region: &str) -> AdministrativeGroup {
        self.geography
            .administrative_groups
            .get(region)
            .copied()
            .or_else(|| zone_from_name(region))
            .unwrap_or_else(|| heuristic_zone(lat, lon))
    }
}

// ─── Elevation ───────────────────────────────────────────────────

const HIMALAYAN_REGIONS: &[&str] = &[
    "Jammu and Kashmir", "Ladakh", "Himachal Pradesh", "Uttarakhand", "Sikkim", "Arunachal Pradesh",
];
const HIMALAYAN_LAT_THRESHOLD: f64 = 27.0;
const HIMALAYAN_BASE_M: f64 = 1500.0;
const HIMALAYAN_RAMP_M_PER_DEG: f64 = 250.0;

/// Piecewise elevation estimate in meters.
pub fn estimate_elevation(lat: f64, lon: f64, region: &str) -> f64 {
    if HIMALAYAN_REGIONS.contains(&region) && lat > HIMALAYAN_LAT_THRESHOLD {
        return HIMALAYAN_BASE_M + (lat - HIMALAYAN_LAT_THRESHOLD) * HIMALAYAN_RAMP_M_PER_DEG;
    }
    match region {
        "Kerala" | "Goa" => return 50.0,
        "West Bengal" | "Odisha" => return 100.0,
        "Chhattisgarh" => return 350.0,
        "Jharkhand" => return 400.0,
        "Madhya Pradesh" => return 450.0,
        "Telangana" => return 500.0,
        "Maharashtra" => return 550.0,
        "Karnataka" => return 600.0,
        _ => {}
    }
    if in_indo_gangetic_plain(lat, lon) {
        return 150.0;
    }
    200.0
}

fn in_indo_gangetic_plain(lat: f64, lon: f64) -> bool {
    (24.0..=31.0).contains(&lat) && (74.0..=88.5).contains(&lon)
}

// ─── Coordinate heuristics ──────────────────────────────────────

const ARID_REGIONS: &[&str] = &["Rajasthan", "Gujarat"];

fn heuristic_land_type(lat: f64, lon: f64, region: &str) -> LandType {
    if lat > 30.0 {
        LandType::Hill
    } else if lat < 16.0 && lon > 80.0 {
        LandType::Coastal
    } else if ARID_REGIONS.contains(&region) && lon < 75.0 {
        LandType::Rainfed
    } else {
        LandType::Irrigated
    }
}

fn heuristic_rainfall_zone(lat: f64, lon: f64) -> RainfallZone {
    if lat > 30.0 {
        RainfallZone::Moderate
    } else if lon < 72.5 {
        RainfallZone::Arid
    } else if lon > 88.0 {
        RainfallZone::VeryHigh
    } else if lat < 13.0 && lon < 77.0 {
        RainfallZone::High
    } else if lat < 21.0 && lon < 78.0 {
        RainfallZone::SemiArid
    } else {
        RainfallZone::Moderate
    }
}

fn heuristic_soil_group(lat: f64, lon: f64) -> SoilGroup {
    if lat > 30.0 {
        SoilGroup::Mountain
    } else if in_indo_gangetic_plain(lat, lon) {
        SoilGroup::Alluvial
    } else if lon < 72.5 && lat > 24.0 {
        SoilGroup::Desert
    } else if (16.0..=24.0).contains(&lat) && (73.0..=80.0).contains(&lon) {
        SoilGroup::Black
    } else if lat < 13.0 && lon < 77.0 {
        SoilGroup::Laterite
    } else {
        SoilGroup::Red
    }
}

/// State-name keywords per zone (matched on the upper-cased name).
const ZONE_KEYWORDS: &[(AdministrativeGroup, &[&str])] = &[
    (AdministrativeGroup::NorthIndia, &["JAMMU", "KASHMIR", "HIMACHAL", "PUNJAB", "HARYANA", "UTTARAKHAND", "UTTAR PRADESH", "DELHI"]),
    (AdministrativeGroup::SouthIndia, &["ANDHRA", "TELANGANA", "KARNATAKA", "TAMIL", "KERALA", "PUDUCHERRY"]),
    (AdministrativeGroup::EastIndia, &["BIHAR", "JHARKHAND", "WEST BENGAL", "ODISHA", "ASSAM", "SIKKIM", "ARUNACHAL", "NAGALAND", "MANIPUR", "MIZORAM", "TRIPURA", "MEGHALAYA"]),
    (AdministrativeGroup::WestIndia, &["RAJASTHAN", "GUJARAT", "MAHARASHTRA", "GOA"]),
    (AdministrativeGroup::CentralIndia, &["MADHYA", "CHHATTISGARH"]),
];

fn zone_from_name(region: &str) -> Option<AdministrativeGroup> {
    if region.is_empty() {
        return None;
    }
    let upper = region.to_uppercase();
    ZONE_KEYWORDS
        .iter()
        .find(|(_, keys)| keys.iter().any(|k| upper.contains(k)))
        .map(|(zone, _)| *zone)
}

fn heuristic_zone(lat: f64, lon: f64) -> AdministrativeGroup {
    if lat > 28.0 {
        AdministrativeGroup::NorthIndia
    } else if lon > 84.0 {
        AdministrativeGroup::EastIndia
    } else if lat < 18.0 {
        AdministrativeGroup::SouthIndia
    } else if lon < 76.0 {
        AdministrativeGroup::WestIndia
    } else {
        AdministrativeGroup::CentralIndia
    }
}
