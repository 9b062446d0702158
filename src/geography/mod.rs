//! Reference geography: named regions, their sub-regions and localities,
//! plus per-region lookup tables for agronomic characteristics.
//!
//! Read-only once built. The built-in dataset covers the Indian states;
//! a JSON file of the same shape can be injected instead.

mod builtin;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

use crate::location::types::{AdministrativeGroup, LandType, LocateError, RainfallZone, SoilGroup};

/// A top-level region (state) with its reference center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub name: String,
    pub code: String,
    pub center_lat: f64,
    pub center_lon: f64,
}

/// The reference dataset consumed by the resolver.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ReferenceGeography {
    pub regions: Vec<Region>,
    /// Ordered sub-region names, keyed by region code.
    #[serde(default)]
    pub sub_regions: HashMap<String, Vec<String>>,
    /// Ordered locality names, keyed by sub-region name.
    #[serde(default)]
    pub localities: HashMap<String, Vec<String>>,
    /// Land type keyed by sub-region name.
    #[serde(default)]
    pub sub_region_land_types: HashMap<String, LandType>,
    /// Land type keyed by region name.
    #[serde(default)]
    pub land_types: HashMap<String, LandType>,
    #[serde(default)]
    pub soil_groups: HashMap<String, SoilGroup>,
    #[serde(default)]
    pub rainfall_zones: HashMap<String, RainfallZone>,
    #[serde(default)]
    pub administrative_groups: HashMap<String, AdministrativeGroup>,
}

impl ReferenceGeography {
    /// The built-in Indian states dataset.
    pub fn builtin() -> Self {
        let mut geo = Self::default();

        for r in builtin::REGIONS {
            geo.regions.push(Region {
                name: r.name.to_string(),
                code: r.code.to_string(),
                center_lat: r.lat,
                center_lon: r.lon,
            });
            geo.administrative_groups.insert(r.name.to_string(), r.admin);
            if let Some(soil) = r.soil {
                geo.soil_groups.insert(r.name.to_string(), soil);
            }
            if let Some(rain) = r.rainfall {
                geo.rainfall_zones.insert(r.name.to_string(), rain);
            }
            if let Some(land) = r.land_type {
                geo.land_types.insert(r.name.to_string(), land);
            }
        }

        for d in builtin::DISTRICTS {
            geo.sub_regions
                .entry(d.region_code.to_string())
                .or_default()
                .push(d.name.to_string());
            if !d.localities.is_empty() {
                geo.localities.insert(
                    d.name.to_string(),
                    d.localities.iter().map(|s| s.to_string()).collect(),
                );
            }
            if let Some(land) = d.land_type {
                geo.sub_region_land_types.insert(d.name.to_string(), land);
            }
        }

        geo
    }

    /// Load a dataset from a JSON file.
    pub fn load_from(path: &Path) -> Result<Self, LocateError> {
        let data = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }

    pub fn sub_regions_of(&self, region_code: &str) -> &[String] {
        self.sub_regions.get(region_code).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn localities_of(&self, sub_region: &str) -> &[String] {
        self.localities.get(sub_region).map(Vec::as_slice).unwrap_or(&[])
    }
}
