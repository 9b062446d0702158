//! Location resolution subsystem.
//!
//! Turns raw coordinates (from a GPS session, a photo, or manual entry)
//! into a confidence-scored `DetectedLocation`, and keeps the last one on
//! disk.

pub mod assembler;
pub mod resolver;
pub mod scoring;
pub mod store;
pub mod strategy;
pub mod types;

pub use assembler::LocationAssembler;
pub use resolver::{GeospatialResolver, Resolution};
pub use scoring::{ConfidenceScorer, ScoreInput};
pub use store::LocationStore;
pub use strategy::{HashLandUseClassifier, LandUseClassifier, OffsetIndexLocator, SubRegionLocator};
pub use types::{
    check_coordinates, DetectedLocation, LocateError, LocationSource, RegionalCharacteristics, ValidationStatus,
};
