//! Readings, states and outcomes of a GPS acquisition session.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// One raw platform fix. Never mutated after creation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GpsReading {
    pub latitude: f64,
    pub longitude: f64,
    /// Horizontal accuracy in meters.
    pub accuracy: f64,
    /// Monotonic milliseconds.
    #[serde(default)]
    pub timestamp: u64,
}

/// Session lifecycle. `Ready` and `Error` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcquisitionStatus {
    Idle,
    Acquiring,
    Stabilizing,
    Validating,
    Ready,
    Error,
}

impl AcquisitionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Ready | Self::Error)
    }
}

impl fmt::Display for AcquisitionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Idle => "idle",
            Self::Acquiring => "acquiring",
            Self::Stabilizing => "stabilizing",
            Self::Validating => "validating",
            Self::Ready => "ready",
            Self::Error => "error",
        };
        f.pad(s)
    }
}

/// Broadcast on every state transition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionUpdate {
    pub status: AcquisitionStatus,
    /// 0–100.
    pub progress: u8,
    pub message: String,
    pub readings_count: u32,
    pub stability_m: Option<f64>,
    /// Snapshot of the buffered readings, in arrival order.
    pub readings: Vec<GpsReading>,
}

/// Final position of a successful session.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AcquiredFix {
    pub latitude: f64,
    pub longitude: f64,
    /// Best (smallest) accuracy seen, in meters.
    pub accuracy: f64,
    pub readings_count: u32,
    /// Last computed stability over the whole buffer.
    pub stability_m: f64,
    pub is_stabilized: bool,
    /// The buffered readings, in arrival order.
    pub readings: Vec<GpsReading>,
    /// True when the position came from the timeout fallback (single best reading).
    pub fallback: bool,
}

/// Terminal acquisition failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AcquisitionError {
    #[error("Location permission denied. Enable location access and retry.")]
    PermissionDenied,

    #[error("Location unavailable. Move to an open area and retry.")]
    PositionUnavailable,

    #[error("The device timed out while reading its position.")]
    DeviceTimeout,

    #[error("No GPS signal received before the timeout.")]
    NoSignal,
}

/// Exactly one of these ends every `start()`.
#[derive(Debug, Clone, PartialEq)]
pub enum AcquisitionOutcome {
    Ready(AcquiredFix),
    Failed(AcquisitionError),
    Cancelled,
}
