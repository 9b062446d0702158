//! GPS acquisition: platform position sources and the session state
//! machine that turns a noisy stream of fixes into one position.

pub mod platform;
pub mod session;
pub mod types;

pub use platform::{
    ChannelPositionSource, PositionErrorCode, PositionEvent, PositionFeed, PositionSource, ReplaySource,
    WatchOptions,
};
pub use session::{AcquisitionSession, SessionCanceller};
pub use types::{AcquiredFix, AcquisitionError, AcquisitionOutcome, AcquisitionStatus, GpsReading, SessionUpdate};
