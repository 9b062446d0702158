//! Builds the final `DetectedLocation` for the GPS, photo and manual paths.
//!
//! All three converge on `assemble`: resolve geography, score confidence,
//! construct the immutable result.

use chrono::Utc;
use std::fs;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::acquisition::AcquiredFix;
use crate::exif;

use super::resolver::GeospatialResolver;
use super::scoring::{ConfidenceScorer, ScoreInput};
use super::types::{DetectedLocation, LocateError, LocationSource};

/// Accuracy assumed for coordinates read from photo metadata.
pub const EXIF_ACCURACY_M: f64 = 50.0;
/// Accuracy assumed for coordinates entered by hand.
pub const MANUAL_ACCURACY_M: f64 = 10.0;
/// Flat bonus for manually entered locations.
pub const MANUAL_BONUS: u8 = 10;

const UNKNOWN: &str = "Unknown";

/// What the assembler needs to know about a position.
struct Observation {
    latitude: f64,
    longitude: f64,
    accuracy: f64,
    readings_count: u32,
    stability_m: f64,
    is_stabilized: bool,
    source: LocationSource,
}

pub struct LocationAssembler {
    resolver: Arc<GeospatialResolver>,
    scorer: ConfidenceScorer,
}

impl LocationAssembler {
    pub fn new(resolver: Arc<GeospatialResolver>) -> Self {
        Self { resolver, scorer: ConfidenceScorer }
    }

    pub fn resolver(&self) -> &GeospatialResolver {
        &self.resolver
    }

    /// Result of a completed GPS session.
    pub fn from_gps(&self, fix: &AcquiredFix) -> DetectedLocation {
        self.assemble(Observation {
            latitude: fix.latitude,
            longitude: fix.longitude,
            accuracy: fix.accuracy,
            readings_count: fix.readings_count.max(1),
            stability_m: fix.stability_m,
            is_stabilized: fix.is_stabilized,
            source: LocationSource::Gps,
        })
    }

    /// Coordinates from a photo's EXIF GPS block, if it has one.
    pub fn from_image(&self, bytes: &[u8]) -> Option<DetectedLocation> {
        let gps = exif::extract_gps(bytes)?;
        debug!(lat = gps.latitude, lon = gps.longitude, "EXIF GPS found");
        Some(self.assemble(Observation {
            latitude: gps.latitude,
            longitude: gps.longitude,
            accuracy: EXIF_ACCURACY_M,
            readings_count: 1,
            stability_m: 0.0,
            is_stabilized: false,
            source: LocationSource::Exif,
        }))
    }

    /// Read a photo from disk. `Ok(None)` means the file has no GPS data.
    pub fn from_image_file(&self, path: &Path) -> Result<Option<DetectedLocation>, LocateError> {
        let bytes = fs::read(path)?;
        Ok(self.from_image(&bytes))
    }

    /// A hand-entered location: scored normally, then given a flat bonus.
    pub fn manual(&self, latitude: f64, longitude: f64) -> DetectedLocation {
        let mut loc = self.assemble(Observation {
            latitude,
            longitude,
            accuracy: MANUAL_ACCURACY_M,
            readings_count: 1,
            stability_m: 0.0,
            is_stabilized: false,
            source: LocationSource::Manual,
        });
        loc.confidence_score = loc.confidence_score.saturating_add(MANUAL_BONUS).min(100);
        loc.validation_note = "Manually entered location".into();
        loc
    }

    fn assemble(&self, obs: Observation) -> DetectedLocation {
        let res = self.resolver.resolve(obs.latitude, obs.longitude);

        let confidence = self.scorer.score(&ScoreInput {
            accuracy_m: obs.accuracy,
            readings_count: obs.readings_count,
            stability_m: obs.stability_m,
            land_use_valid: res.land_use.valid,
            distance_km: res.region_distance_km,
        });
        let (status, note) = self.scorer.validate(confidence);

        let (region, region_code) = match &res.region {
            Some(r) => (r.name.clone(), r.code.clone()),
            None => (UNKNOWN.to_string(), "NA".to_string()),
        };

        info!(
            source = %obs.source,
            region = %region,
            confidence,
            status = %status,
            "Location assembled"
        );

        DetectedLocation {
            latitude: obs.latitude,
            longitude: obs.longitude,
            accuracy: obs.accuracy,
            region,
            region_code,
            sub_region: res.sub_region.unwrap_or_else(|| UNKNOWN.to_string()),
            locality: res.locality,
            administrative_group: res.characteristics.administrative_group,
            characteristics: res.characteristics,
            elevation_estimate: res.elevation_m,
            validation_status: status,
            validation_note: note.to_string(),
            confidence_score: confidence,
            readings_count: obs.readings_count,
            is_stabilized: obs.is_stabilized,
            land_use_validated: res.land_use.valid,
            land_use_category: res.land_use.category,
            region_distance_km: res.region_distance_km,
            source: obs.source,
            detected_at: Utc::now(),
        }
    }
}
