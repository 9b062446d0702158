//! GPS acquisition state machine.
//!
//! ```text
//! idle → acquiring → stabilizing → validating → ready
//!   ↑        └────────────┴──────────────────→ error
//!   └──────────── cancel ───────────────────────┘
//! ```
//!
//! One `start()` races three signals: platform events, a wall-clock
//! deadline and the cancellation token. Whichever wins resolves the
//! session exactly once; the watch is released by an RAII guard on every
//! path before the outcome is built. Each run consumes its cancellation
//! token, so a handle taken after a run returns targets the next one.

use std::cmp::Ordering;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::config::AcquisitionConfig;
use crate::geo::{centroid, stability_m};

use super::platform::{PositionEvent, PositionSource, WatchId};
use super::types::{
    AcquiredFix, AcquisitionError, AcquisitionOutcome, AcquisitionStatus, GpsReading, SessionUpdate,
};

const UPDATE_CAPACITY: usize = 64;

/// How the wait loop ended.
enum Wake {
    Stop,
    Fallback,
    Failed(AcquisitionError),
    Cancelled,
}

/// Releases a watch when dropped.
struct ActiveWatch<'a, S: PositionSource + ?Sized> {
    source: &'a S,
    id: WatchId,
}

impl<S: PositionSource + ?Sized> Drop for ActiveWatch<'_, S> {
    fn drop(&mut self) {
        self.source.clear_watch(self.id);
    }
}

/// Cancels a running session from another task.
#[derive(Debug, Clone)]
pub struct SessionCanceller {
    token: CancellationToken,
}

impl SessionCanceller {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// A single acquisition session. Owned by the caller; at most one
/// `start()` can run at a time because it borrows the session mutably.
pub struct AcquisitionSession {
    config: AcquisitionConfig,
    status: AcquisitionStatus,
    readings: Vec<GpsReading>,
    last_stability: Option<f64>,
    updates: broadcast::Sender<SessionUpdate>,
    cancel: CancellationToken,
}

impl AcquisitionSession {
    pub fn new(config: AcquisitionConfig) -> Self {
        let (updates, _) = broadcast::channel(UPDATE_CAPACITY);
        Self {
            config,
            status: AcquisitionStatus::Idle,
            readings: Vec::new(),
            last_stability: None,
            updates,
            cancel: CancellationToken::new(),
        }
    }

    pub fn status(&self) -> AcquisitionStatus {
        self.status
    }

    /// The buffered readings of the current or last session.
    pub fn readings(&self) -> &[GpsReading] {
        &self.readings
    }

    pub fn last_stability(&self) -> Option<f64> {
        self.last_stability
    }

    /// Live state updates, one per transition.
    pub fn subscribe(&self) -> broadcast::Receiver<SessionUpdate> {
        self.updates.subscribe()
    }

    /// Handle for cancelling the running `start()`, or the next one if
    /// none is running. A cancel issued before `start()` makes it return
    /// `Cancelled` at once.
    pub fn canceller(&self) -> SessionCanceller {
        SessionCanceller { token: self.cancel.clone() }
    }

    /// Run one acquisition against `source` until it resolves.
    pub async fn start<S: PositionSource + ?Sized>(&mut self, source: &S) -> AcquisitionOutcome {
        self.reset();

        let watch = source.watch_position(&self.config.watch);
        info!(
            watch_id = watch.id,
            timeout_ms = self.config.timeout_ms,
            "Starting GPS acquisition"
        );

        let wake = {
            let _active = ActiveWatch { source, id: watch.id };
            self.transition(AcquisitionStatus::Acquiring, "Acquiring GPS signal...".into());
            self.wait(watch.events).await
        };

        // A late cancel on the spent token must not reach the next run.
        self.cancel = CancellationToken::new();

        match wake {
            Wake::Stop => self.finish_stable(),
            Wake::Fallback => self.finish_fallback(),
            Wake::Failed(err) => self.fail(err),
            Wake::Cancelled => {
                self.readings.clear();
                self.last_stability = None;
                self.transition(AcquisitionStatus::Idle, "Acquisition cancelled".into());
                info!("GPS acquisition cancelled");
                AcquisitionOutcome::Cancelled
            }
        }
    }

    fn reset(&mut self) {
        self.readings.clear();
        self.last_stability = None;
        self.status = AcquisitionStatus::Idle;
    }

    async fn wait(&mut self, mut events: mpsc::UnboundedReceiver<PositionEvent>) -> Wake {
        let cancel = self.cancel.clone();
        let deadline = tokio::time::sleep(Duration::from_millis(self.config.timeout_ms));
        tokio::pin!(deadline);

        loop {
            tokio::select! {
                biased;

                _ = cancel.cancelled() => return Wake::Cancelled,

                event = events.recv() => match event {
                    Some(PositionEvent::Fix(reading)) => {
                        if self.on_reading(reading) {
                            return Wake::Stop;
                        }
                    }
                    Some(PositionEvent::Error { error }) => return Wake::Failed(error.into()),
                    None => {
                        debug!(readings = self.readings.len(), "Position stream closed");
                        return Wake::Fallback;
                    }
                },

                _ = &mut deadline => {
                    debug!(readings = self.readings.len(), "Acquisition timeout");
                    return Wake::Fallback;
                }
            }
        }
    }

    /// Buffer a reading; returns true when the stop condition holds.
    fn on_reading(&mut self, reading: GpsReading) -> bool {
        self.readings.push(reading);
        let n = self.readings.len() as u32;
        let stability = stability_m(&self.coords());
        self.last_stability = Some(stability);

        debug!(
            readings = n,
            accuracy = reading.accuracy,
            stability_m = stability,
            "GPS reading"
        );

        if n < self.config.min_stable_readings {
            self.transition(AcquisitionStatus::Acquiring, format!("Acquiring GPS signal ({} reading(s))", n));
        } else {
            self.transition(AcquisitionStatus::Stabilizing, format!("Stabilizing position (\u{00B1}{:.0} m)", stability));
        }

        (reading.accuracy <= self.config.target_accuracy_m && self.is_stable(n, stability))
            || n >= self.config.max_readings
    }

    fn is_stable(&self, n: u32, stability: f64) -> bool {
        n >= self.config.min_stable_readings && stability < self.config.stability_threshold_m
    }

    fn coords(&self) -> Vec<(f64, f64)> {
        self.readings.iter().map(|r| (r.latitude, r.longitude)).collect()
    }

    /// Mean of every buffered reading, best accuracy seen.
    fn finish_stable(&mut self) -> AcquisitionOutcome {
        let Some((latitude, longitude)) = centroid(&self.coords()) else {
            return self.fail(AcquisitionError::NoSignal);
        };
        let accuracy = self.readings.iter().map(|r| r.accuracy).fold(f64::INFINITY, f64::min);
        self.resolve(latitude, longitude, accuracy, false)
    }

    /// Best single reading, or no signal.
    fn finish_fallback(&mut self) -> AcquisitionOutcome {
        let best = self
            .readings
            .iter()
            .min_by(|a, b| a.accuracy.partial_cmp(&b.accuracy).unwrap_or(Ordering::Equal))
            .copied();
        match best {
            Some(r) => {
                warn!(
                    readings = self.readings.len(),
                    accuracy = r.accuracy,
                    "No stable fix, using best single reading"
                );
                self.resolve(r.latitude, r.longitude, r.accuracy, true)
            }
            None => self.fail(AcquisitionError::NoSignal),
        }
    }

    fn resolve(&mut self, latitude: f64, longitude: f64, accuracy: f64, fallback: bool) -> AcquisitionOutcome {
        self.transition(AcquisitionStatus::Validating, "Validating location...".into());

        let readings_count = self.readings.len() as u32;
        let stability = self.last_stability.unwrap_or(0.0);
        let fix = AcquiredFix {
            latitude,
            longitude,
            accuracy,
            readings_count,
            stability_m: stability,
            is_stabilized: self.is_stable(readings_count, stability),
            readings: self.readings.clone(),
            fallback,
        };

        self.transition(AcquisitionStatus::Ready, "Location acquired".into());
        info!(
            readings = readings_count,
            accuracy,
            stability_m = stability,
            fallback,
            "GPS acquisition ready"
        );
        AcquisitionOutcome::Ready(fix)
    }

    fn fail(&mut self, err: AcquisitionError) -> AcquisitionOutcome {
        warn!(readings = self.readings.len(), error = %err, "GPS acquisition failed");
        self.transition(AcquisitionStatus::Error, err.to_string());
        AcquisitionOutcome::Failed(err)
    }

    fn transition(&mut self, status: AcquisitionStatus, message: String) {
        self.status = status;
        let readings_count = self.readings.len() as u32;
        // No subscribers is fine.
        let _ = self.updates.send(SessionUpdate {
            status,
            progress: progress(status, readings_count),
            message,
            readings_count,
            stability_m: self.last_stability,
            readings: self.readings.clone(),
        });
    }
}

/// Progress percentage shown for a state.
fn progress(status: AcquisitionStatus, readings: u32) -> u8 {
    let n = readings.min(100);
    match status {
        AcquisitionStatus::Idle | AcquisitionStatus::Error => 0,
        AcquisitionStatus::Acquiring => (10 + 15 * n).min(100) as u8,
        AcquisitionStatus::Stabilizing => (40 + 10 * n).min(85) as u8,
        AcquisitionStatus::Validating => 90,
        AcquisitionStatus::Ready => 100,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::acquisition::platform::{ChannelPositionSource, PositionErrorCode, ReplaySource};
    use approx::assert_relative_eq;
    use tokio::time::Instant;

    fn reading(lat: f64, lon: f64, accuracy: f64) -> GpsReading {
        GpsReading { latitude: lat, longitude: lon, accuracy, timestamp: 0 }
    }

    fn session() -> AcquisitionSession {
        AcquisitionSession::new(AcquisitionConfig::default())
    }

    fn ready(outcome: AcquisitionOutcome) -> AcquiredFix {
        match outcome {
            AcquisitionOutcome::Ready(fix) => fix,
            other => panic!("expected ready, got {:?}", other),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_stable_accurate_readings() {
        let source = ReplaySource::new(vec![
            PositionEvent::Fix(reading(17.0, 78.5, 12.0)),
            PositionEvent::Fix(reading(17.0, 78.5, 8.0)),
            PositionEvent::Fix(reading(17.0, 78.5, 10.0)),
            PositionEvent::Fix(reading(18.0, 79.0, 5.0)),
        ]);
        let mut s = session();
        let fix = ready(s.start(&source).await);

        assert_eq!(fix.readings_count, 3);
        assert!(fix.is_stabilized);
        assert!(!fix.fallback);
        assert_eq!(fix.accuracy, 8.0);
        assert_relative_eq!(fix.latitude, 17.0, epsilon = 1e-9);
        assert_eq!(s.status(), AcquisitionStatus::Ready);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stops_on_fifth_reading_with_mean() {
        // 0.001° ≈ 111 m apart: never stable, never accurate enough.
        let lats = [17.000, 17.001, 17.002, 17.003, 17.004, 17.900];
        let source = ReplaySource::new(
            lats.iter().map(|&lat| PositionEvent::Fix(reading(lat, 78.5, 25.0))).collect(),
        );
        let mut s = session();
        let fix = ready(s.start(&source).await);

        assert_eq!(fix.readings_count, 5);
        assert!(!fix.is_stabilized);
        assert!(fix.stability_m > 20.0);
        assert_relative_eq!(fix.latitude, 17.002, epsilon = 1e-9);
        assert_relative_eq!(fix.longitude, 78.5, epsilon = 1e-9);
        assert_eq!(fix.accuracy, 25.0);
        assert_eq!(s.readings().len(), 5);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_without_readings() {
        let (source, _feed) = ChannelPositionSource::new();
        let mut s = session();
        let started = Instant::now();

        let outcome = s.start(&source).await;
        assert_eq!(outcome, AcquisitionOutcome::Failed(AcquisitionError::NoSignal));
        assert!(started.elapsed() >= Duration::from_secs(20));
        assert_eq!(s.status(), AcquisitionStatus::Error);
        assert_eq!(source.active_watches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_timeout_uses_single_late_reading() {
        let (source, feed) = ChannelPositionSource::new();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(18)).await;
            feed.push_fix(reading(17.0, 78.5, 80.0));
        });

        let mut s = session();
        let started = Instant::now();
        let fix = ready(s.start(&source).await);

        assert!(started.elapsed() >= Duration::from_secs(20));
        assert!(fix.fallback);
        assert_eq!(fix.readings_count, 1);
        assert_eq!(fix.accuracy, 80.0);
        assert_eq!(fix.latitude, 17.0);
        assert!(!fix.is_stabilized);
        assert_eq!(source.active_watches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_fallback_picks_best_not_mean() {
        let (source, feed) = ChannelPositionSource::new();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            feed.push_fix(reading(17.0, 78.5, 90.0));
            feed.push_fix(reading(17.2, 78.7, 45.0));
        });

        let mut s = session();
        let fix = ready(s.start(&source).await);
        assert_eq!(fix.readings_count, 2);
        assert_eq!(fix.latitude, 17.2);
        assert_eq!(fix.longitude, 78.7);
        assert_eq!(fix.accuracy, 45.0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stream_exhaustion_resolves_immediately() {
        let source = ReplaySource::new(vec![
            PositionEvent::Fix(reading(17.0, 78.5, 30.0)),
            PositionEvent::Fix(reading(17.1, 78.6, 15.0)),
        ]);
        let mut s = session();
        let started = Instant::now();
        let fix = ready(s.start(&source).await);

        assert!(started.elapsed() < Duration::from_secs(20));
        assert!(fix.fallback);
        assert_eq!(fix.latitude, 17.1);
        assert_eq!(fix.readings_count, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_platform_error_wins_over_buffer() {
        let source = ReplaySource::new(vec![
            PositionEvent::Fix(reading(17.0, 78.5, 10.0)),
            PositionEvent::Error { error: PositionErrorCode::PermissionDenied },
            PositionEvent::Fix(reading(17.0, 78.5, 10.0)),
        ]);
        let mut s = session();
        let outcome = s.start(&source).await;
        assert_eq!(outcome, AcquisitionOutcome::Failed(AcquisitionError::PermissionDenied));
        assert_eq!(s.status(), AcquisitionStatus::Error);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_releases_and_discards() {
        let (source, feed) = ChannelPositionSource::new();
        let mut s = session();
        let canceller = s.canceller();

        let pusher = feed.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            pusher.push_fix(reading(17.0, 78.5, 50.0));
            tokio::time::sleep(Duration::from_secs(1)).await;
            canceller.cancel();
        });

        let outcome = s.start(&source).await;
        assert_eq!(outcome, AcquisitionOutcome::Cancelled);
        assert_eq!(s.status(), AcquisitionStatus::Idle);
        assert!(s.readings().is_empty());
        assert!(s.last_stability().is_none());
        assert_eq!(source.active_watches(), 0);
        // Nothing listens after cancellation.
        assert!(!feed.push_fix(reading(17.0, 78.5, 5.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_restart_after_cancel() {
        let (source, _feed) = ChannelPositionSource::new();
        let mut s = session();
        let first = s.canceller();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            first.cancel();
        });
        assert_eq!(s.start(&source).await, AcquisitionOutcome::Cancelled);

        // The second run gets its own live token and can be cancelled too.
        let second = s.canceller();
        assert!(!second.is_cancelled());
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            second.cancel();
        });
        let started = Instant::now();
        assert_eq!(s.start(&source).await, AcquisitionOutcome::Cancelled);
        assert!(started.elapsed() < Duration::from_secs(20));
        assert_eq!(source.active_watches(), 0);

        let replay = ReplaySource::new(vec![PositionEvent::Fix(reading(17.0, 78.5, 10.0))]);
        let fix = ready(s.start(&replay).await);
        assert_eq!(fix.readings_count, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_cancel_does_not_reach_next_run() {
        let replay = ReplaySource::new(vec![PositionEvent::Fix(reading(17.0, 78.5, 10.0))]);
        let mut s = session();
        let stale = s.canceller();
        ready(s.start(&replay).await);

        stale.cancel();
        let fix = ready(s.start(&replay).await);
        assert_eq!(fix.readings_count, 1);
        assert!(!s.canceller().is_cancelled());
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_before_start() {
        let (source, _feed) = ChannelPositionSource::new();
        let mut s = session();
        s.canceller().cancel();

        let started = Instant::now();
        assert_eq!(s.start(&source).await, AcquisitionOutcome::Cancelled);
        assert_eq!(started.elapsed(), Duration::ZERO);
        assert_eq!(source.active_watches(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_releases_watch() {
        let (source, feed) = ChannelPositionSource::new();
        let pusher = feed.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            for accuracy in [12.0, 8.0, 10.0] {
                pusher.push_fix(reading(17.0, 78.5, accuracy));
            }
        });

        let mut s = session();
        let fix = ready(s.start(&source).await);
        assert_eq!(fix.readings_count, 3);
        assert!(!fix.fallback);
        assert_eq!(source.active_watches(), 0);
        assert!(!feed.push_fix(reading(17.0, 78.5, 5.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_max_readings_releases_watch() {
        let (source, feed) = ChannelPositionSource::new();
        let pusher = feed.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            for i in 0..5 {
                pusher.push_fix(reading(17.0 + 0.001 * i as f64, 78.5, 25.0));
            }
        });

        let mut s = session();
        let fix = ready(s.start(&source).await);
        assert_eq!(fix.readings_count, 5);
        assert_relative_eq!(fix.latitude, 17.002, epsilon = 1e-9);
        assert_eq!(source.active_watches(), 0);
        assert!(!feed.push_fix(reading(17.0, 78.5, 5.0)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_platform_error_releases_watch() {
        let (source, feed) = ChannelPositionSource::new();
        let pusher = feed.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(1)).await;
            pusher.push_fix(reading(17.0, 78.5, 10.0));
            pusher.push_error(PositionErrorCode::PermissionDenied);
        });

        let mut s = session();
        let outcome = s.start(&source).await;
        assert_eq!(outcome, AcquisitionOutcome::Failed(AcquisitionError::PermissionDenied));
        assert_eq!(source.active_watches(), 0);
        assert!(!feed.push_fix(reading(17.0, 78.5, 10.0)));
        assert!(!feed.push_error(PositionErrorCode::PositionUnavailable));
    }

    #[tokio::test(start_paused = true)]
    async fn test_updates_follow_transitions() {
        let source = ReplaySource::new(vec![
            PositionEvent::Fix(reading(17.0, 78.5, 10.0)),
            PositionEvent::Fix(reading(17.0, 78.5, 10.0)),
            PositionEvent::Fix(reading(17.0, 78.5, 10.0)),
        ]);
        let mut s = session();
        let mut rx = s.subscribe();
        ready(s.start(&source).await);

        let mut seen = Vec::new();
        let mut snapshot = Vec::new();
        while let Ok(update) = rx.try_recv() {
            assert_eq!(update.readings.len() as u32, update.readings_count);
            seen.push((update.status, update.progress, update.readings_count));
            snapshot = update.readings;
        }
        assert_eq!(snapshot, vec![reading(17.0, 78.5, 10.0); 3]);
        assert_eq!(
            seen,
            vec![
                (AcquisitionStatus::Acquiring, 10, 0),
                (AcquisitionStatus::Acquiring, 25, 1),
                (AcquisitionStatus::Acquiring, 40, 2),
                (AcquisitionStatus::Stabilizing, 70, 3),
                (AcquisitionStatus::Validating, 90, 3),
                (AcquisitionStatus::Ready, 100, 3),
            ]
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_update_carries_message() {
        let source = ReplaySource::new(vec![PositionEvent::Error {
            error: PositionErrorCode::PositionUnavailable,
        }]);
        let mut s = session();
        let mut rx = s.subscribe();
        s.start(&source).await;

        let mut last = None;
        while let Ok(update) = rx.try_recv() {
            last = Some(update);
        }
        let last = last.unwrap();
        assert_eq!(last.status, AcquisitionStatus::Error);
        assert_eq!(last.progress, 0);
        assert_eq!(last.message, AcquisitionError::PositionUnavailable.to_string());
    }

    #[test]
    fn test_progress_caps() {
        assert_eq!(progress(AcquisitionStatus::Acquiring, 0), 10);
        assert_eq!(progress(AcquisitionStatus::Stabilizing, 5), 85);
        assert_eq!(progress(AcquisitionStatus::Stabilizing, 20), 85);
        assert_eq!(progress(AcquisitionStatus::Acquiring, 40), 100);
    }
}
