use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::acquisition::{AcquisitionSession, SessionCanceller};
use crate::config::AcquisitionConfig;
use crate::location::{DetectedLocation, LocationAssembler, LocationStore};

pub struct AppState {
    pub assembler: LocationAssembler,
    /// The single "current location" slot.
    pub current: Mutex<Option<DetectedLocation>>,
    /// `None` when persistence is disabled.
    pub store: Option<Mutex<LocationStore>>,
    /// One GPS session at a time.
    pub session: tokio::sync::Mutex<AcquisitionSession>,
    /// Set while a GPS session runs.
    running: Mutex<Option<SessionCanceller>>,
}

impl AppState {
    pub fn new(assembler: LocationAssembler, acquisition: AcquisitionConfig, store: Option<LocationStore>) -> Self {
        Self {
            assembler,
            current: Mutex::new(None),
            store: store.map(Mutex::new),
            session: tokio::sync::Mutex::new(AcquisitionSession::new(acquisition)),
            running: Mutex::new(None),
        }
    }

    /// Expose `canceller` to the cancel route until the guard drops.
    pub(super) fn track_running(&self, canceller: SessionCanceller) -> RunningGuard<'_> {
        *lock(&self.running) = Some(canceller);
        RunningGuard { state: self }
    }

    /// Cancel the running GPS session. Returns false when none runs.
    pub fn cancel_acquisition(&self) -> bool {
        match lock(&self.running).take() {
            Some(canceller) => {
                canceller.cancel();
                true
            }
            None => false,
        }
    }

    /// Replace the current location and persist it.
    pub fn set_current(&self, location: DetectedLocation) {
        if let Some(store) = &self.store {
            lock(store).put(&location);
        }
        *lock(&self.current) = Some(location);
    }

    /// Current location, else the stored one.
    pub fn current_or_stored(&self) -> Option<DetectedLocation> {
        if let Some(loc) = lock(&self.current).clone() {
            return Some(loc);
        }
        self.store.as_ref().and_then(|s| lock(s).get())
    }

    pub fn clear(&self) {
        *lock(&self.current) = None;
        if let Some(store) = &self.store {
            lock(store).clear();
        }
    }
}

pub(super) struct RunningGuard<'a> {
    state: &'a AppState,
}

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        *lock(&self.state.running) = None;
    }
}

pub(super) fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}
