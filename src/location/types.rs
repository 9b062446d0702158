//! Core types for the location subsystem.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::geo::format_coords;

/// How a location was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationSource {
    Gps,
    Exif,
    Manual,
    Stored,
}

impl fmt::Display for LocationSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Gps => write!(f, "GPS"),
            Self::Exif => write!(f, "Photo"),
            Self::Manual => write!(f, "Manual"),
            Self::Stored => write!(f, "Saved"),
        }
    }
}

/// Tri-level trust bucket derived from the confidence score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValidationStatus {
    High,
    Medium,
    Low,
}

impl ValidationStatus {
    /// ≥80 high, 60–79 medium, below 60 low.
    pub fn from_score(score: u8) -> Self {
        match score {
            80..=u8::MAX => Self::High,
            60..=79 => Self::Medium,
            _ => Self::Low,
        }
    }

    pub fn note(self) -> &'static str {
        match self {
            Self::High => "High confidence: location verified",
            Self::Medium => "Medium confidence: location approximate, verify on the map",
            Self::Low => "Low confidence: consider retrying or entering the location manually",
        }
    }
}

impl fmt::Display for ValidationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

// ─── Regional characteristics ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandType {
    Irrigated,
    Rainfed,
    Hill,
    Coastal,
    Plateau,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElevationCategory {
    Lowland,
    Plain,
    Upland,
    Highland,
}

impl ElevationCategory {
    pub fn from_meters(m: f64) -> Self {
        if m < 100.0 {
            Self::Lowland
        } else if m < 300.0 {
            Self::Plain
        } else if m < 900.0 {
            Self::Upland
        } else {
            Self::Highland
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RainfallZone {
    Arid,
    SemiArid,
    Moderate,
    High,
    VeryHigh,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SoilGroup {
    Alluvial,
    Black,
    Red,
    Laterite,
    Desert,
    Mountain,
}

/// Agro-administrative zone a state belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AdministrativeGroup {
    NorthIndia,
    SouthIndia,
    EastIndia,
    WestIndia,
    CentralIndia,
    Other,
}

impl fmt::Display for AdministrativeGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NorthIndia => "north-india",
            Self::SouthIndia => "south-india",
            Self::EastIndia => "east-india",
            Self::WestIndia => "west-india",
            Self::CentralIndia => "central-india",
            Self::Other => "other",
        };
        f.write_str(s)
    }
}

/// Derived agronomic context for a point. Recomputed on every assembly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegionalCharacteristics {
    pub land_type: LandType,
    pub elevation_category: ElevationCategory,
    pub rainfall_zone: RainfallZone,
    pub soil_group: SoilGroup,
    pub administrative_group: AdministrativeGroup,
}

/// Outcome category of the land-use check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LandUseCategory {
    Cropland,
    Water,
    Urban,
    OutsideRegion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LandUse {
    pub valid: bool,
    pub category: LandUseCategory,
}

// ─── The detected location ──────────────────────────────────────

/// A fully resolved, confidence-scored farm location.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectedLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters.
    pub accuracy: f64,
    pub region: String,
    pub region_code: String,
    pub sub_region: String,
    #[serde(default)]
    pub locality: Option<String>,
    pub administrative_group: AdministrativeGroup,
    pub characteristics: RegionalCharacteristics,
    /// Estimated elevation in meters.
    pub elevation_estimate: f64,
    pub validation_status: ValidationStatus,
    pub validation_note: String,
    /// 0–100.
    pub confidence_score: u8,
    pub readings_count: u32,
    pub is_stabilized: bool,
    pub land_use_validated: bool,
    pub land_use_category: LandUseCategory,
    /// Distance to the nearest reference region center, if any region exists.
    #[serde(default)]
    pub region_distance_km: Option<f64>,
    pub source: LocationSource,
    pub detected_at: DateTime<Utc>,
}

impl DetectedLocation {
    pub fn display_line(&self) -> String {
        let place = match &self.locality {
            Some(loc) => format!("{}, {}, {}", loc, self.sub_region, self.region),
            None => format!("{}, {}", self.sub_region, self.region),
        };
        format!(
            "\u{1F4CD} {} ({})\n  \u{1F4D0} {} \u{00B1}{:.0} m\n  \u{1F3AF} Confidence {} ({}), {} reading(s), source: {}",
            place,
            self.region_code,
            format_coords(self.latitude, self.longitude),
            self.accuracy,
            self.confidence_score,
            self.validation_status,
            self.readings_count,
            self.source,
        )
    }
}

/// Location subsystem errors.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid geography dataset: {0}")]
    Geography(#[from] serde_json::Error),

    #[error("No GPS data found in image")]
    NoGpsInImage,

    #[error("Invalid coordinates: lat {lat}, lon {lon} (lat -90..90, lon -180..180)")]
    InvalidCoordinates { lat: f64, lon: f64 },
}

/// Reject coordinates outside the WGS84 numeric range.
pub fn check_coordinates(lat: f64, lon: f64) -> Result<(), LocateError> {
    if (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&lon) {
        Ok(())
    } else {
        Err(LocateError::InvalidCoordinates { lat, lon })
    }
}
