//! The platform geolocation channel.
//!
//! A `PositionSource` hands out watches: a receiver of fixes and errors
//! plus an id that must be passed back to `clear_watch` to release it.
//! Two sources ship with the crate:
//!
//! - `ChannelPositionSource`: a bridge a platform layer pushes fixes into
//!   through a `PositionFeed`.
//! - `ReplaySource`: a scripted list of fixes and errors, optionally paced
//!   by the readings' timestamps.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use super::types::{AcquisitionError, GpsReading};

/// Options forwarded to the platform when a watch starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WatchOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub max_cached_age_ms: u64,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self { high_accuracy: true, timeout_ms: 30_000, max_cached_age_ms: 0 }
    }
}

/// Error codes reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PositionErrorCode {
    PermissionDenied,
    PositionUnavailable,
    Timeout,
}

impl From<PositionErrorCode> for AcquisitionError {
    fn from(code: PositionErrorCode) -> Self {
        match code {
            PositionErrorCode::PermissionDenied => Self::PermissionDenied,
            PositionErrorCode::PositionUnavailable => Self::PositionUnavailable,
            PositionErrorCode::Timeout => Self::DeviceTimeout,
        }
    }
}

/// One item of a watch stream.
///
/// JSON form: a reading object, or `{"error": "permission_denied"}`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PositionEvent {
    Fix(GpsReading),
    Error { error: PositionErrorCode },
}

pub type WatchId = u64;

/// An active subscription.
#[derive(Debug)]
pub struct PositionWatch {
    pub id: WatchId,
    pub events: mpsc::UnboundedReceiver<PositionEvent>,
}

/// A geolocation provider.
pub trait PositionSource: Send + Sync {
    fn watch_position(&self, options: &WatchOptions) -> PositionWatch;

    /// Release a watch. Unknown or already-cleared ids are ignored.
    fn clear_watch(&self, id: WatchId);
}

fn lock<T>(m: &Mutex<T>) -> MutexGuard<'_, T> {
    m.lock().unwrap_or_else(PoisonError::into_inner)
}

// ─── Channel bridge ─────────────────────────────────────────────

#[derive(Default)]
struct Watches {
    next_id: WatchId,
    active: HashMap<WatchId, mpsc::UnboundedSender<PositionEvent>>,
}

/// Position source fed from outside through a [`PositionFeed`].
pub struct ChannelPositionSource {
    watches: Arc<Mutex<Watches>>,
}

/// The push side of a [`ChannelPositionSource`].
#[derive(Clone)]
pub struct PositionFeed {
    watches: Arc<Mutex<Watches>>,
}

impl ChannelPositionSource {
    pub fn new() -> (Self, PositionFeed) {
        let watches = Arc::new(Mutex::new(Watches::default()));
        (Self { watches: Arc::clone(&watches) }, PositionFeed { watches })
    }

    /// Number of watches not yet cleared.
    pub fn active_watches(&self) -> usize {
        lock(&self.watches).active.len()
    }
}

impl PositionSource for ChannelPositionSource {
    fn watch_position(&self, options: &WatchOptions) -> PositionWatch {
        let (tx, events) = mpsc::unbounded_channel();
        let mut w = lock(&self.watches);
        w.next_id += 1;
        let id = w.next_id;
        w.active.insert(id, tx);
        debug!(watch_id = id, high_accuracy = options.high_accuracy, "Watch started");
        PositionWatch { id, events }
    }

    fn clear_watch(&self, id: WatchId) {
        if lock(&self.watches).active.remove(&id).is_some() {
            debug!(watch_id = id, "Watch cleared");
        }
    }
}

impl PositionFeed {
    /// Deliver an event to every active watch.
    /// Returns false when nothing is listening.
    pub fn push(&self, event: PositionEvent) -> bool {
        let mut w = lock(&self.watches);
        w.active.retain(|_, tx| tx.send(event).is_ok());
        !w.active.is_empty()
    }

    pub fn push_fix(&self, reading: GpsReading) -> bool {
        self.push(PositionEvent::Fix(reading))
    }

    pub fn push_error(&self, error: PositionErrorCode) -> bool {
        self.push(PositionEvent::Error { error })
    }
}

// ─── Scripted replay ────────────────────────────────────────────

/// Replays a fixed list of events to each watch.
///
/// In real-time mode a fix is delivered `timestamp` ms after the watch
/// started; otherwise everything is delivered at once. The stream closes
/// after the last event.
pub struct ReplaySource {
    events: Vec<PositionEvent>,
    realtime: bool,
    next_id: AtomicU64,
    tasks: Mutex<HashMap<WatchId, JoinHandle<()>>>,
}

impl ReplaySource {
    pub fn new(events: Vec<PositionEvent>) -> Self {
        Self {
            events,
            realtime: false,
            next_id: AtomicU64::new(1),
            tasks: Mutex::new(HashMap::new()),
        }
    }

    pub fn realtime(mut self, on: bool) -> Self {
        self.realtime = on;
        self
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    /// Load a JSON array of events from disk.
    pub fn load(path: &Path) -> io::Result<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }

    pub fn events(&self) -> &[PositionEvent] {
        &self.events
    }
}

impl PositionSource for ReplaySource {
    /// Must be called from within a tokio runtime.
    fn watch_position(&self, _options: &WatchOptions) -> PositionWatch {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let (tx, events) = mpsc::unbounded_channel();
        let script = self.events.clone();
        let realtime = self.realtime;

        let handle = tokio::spawn(async move {
            let started = tokio::time::Instant::now();
            for event in script {
                if let (true, PositionEvent::Fix(r)) = (realtime, &event) {
                    tokio::time::sleep_until(started + Duration::from_millis(r.timestamp)).await;
                }
                if tx.send(event).is_err() {
                    break;
                }
            }
        });

        let mut tasks = lock(&self.tasks);
        tasks.retain(|_, h| !h.is_finished());
        tasks.insert(id, handle);
        PositionWatch { id, events }
    }

    fn clear_watch(&self, id: WatchId) {
        if let Some(handle) = lock(&self.tasks).remove(&id) {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fix(lat: f64, accuracy: f64, timestamp: u64) -> GpsReading {
        GpsReading { latitude: lat, longitude: 78.5, accuracy, timestamp }
    }

    #[test]
    fn test_event_json_forms() {
        let events: Vec<PositionEvent> = serde_json::from_str(
            r#"[
                {"latitude": 17.0, "longitude": 78.5, "accuracy": 12.0, "timestamp": 1000},
                {"error": "permission_denied"}
            ]"#,
        )
        .unwrap();
        assert_eq!(events[0], PositionEvent::Fix(fix(17.0, 12.0, 1000)));
        assert_eq!(events[1], PositionEvent::Error { error: PositionErrorCode::PermissionDenied });
    }

    #[test]
    fn test_error_code_mapping() {
        assert_eq!(AcquisitionError::from(PositionErrorCode::Timeout), AcquisitionError::DeviceTimeout);
        assert_eq!(
            AcquisitionError::from(PositionErrorCode::PositionUnavailable),
            AcquisitionError::PositionUnavailable
        );
    }

    #[test]
    fn test_watch_options_defaults() {
        let opts = WatchOptions::default();
        assert!(opts.high_accuracy);
        assert_eq!(opts.timeout_ms, 30_000);
        assert_eq!(opts.max_cached_age_ms, 0);
    }

    #[tokio::test]
    async fn test_channel_push_and_clear() {
        let (source, feed) = ChannelPositionSource::new();
        assert!(!feed.push_fix(fix(17.0, 10.0, 0)));

        let mut watch = source.watch_position(&WatchOptions::default());
        assert_eq!(source.active_watches(), 1);
        assert!(feed.push_fix(fix(17.0, 10.0, 0)));
        assert_eq!(watch.events.recv().await, Some(PositionEvent::Fix(fix(17.0, 10.0, 0))));

        source.clear_watch(watch.id);
        assert_eq!(source.active_watches(), 0);
        assert!(!feed.push_fix(fix(17.1, 10.0, 0)));
        // Sender dropped with the watch entry.
        assert_eq!(watch.events.recv().await, None);
    }

    #[tokio::test]
    async fn test_channel_dropped_receiver_is_pruned() {
        let (source, feed) = ChannelPositionSource::new();
        let watch = source.watch_position(&WatchOptions::default());
        drop(watch);
        assert!(!feed.push_error(PositionErrorCode::Timeout));
        assert_eq!(source.active_watches(), 0);
    }

    #[tokio::test]
    async fn test_replay_delivers_then_closes() {
        let source = ReplaySource::new(vec![
            PositionEvent::Fix(fix(17.0, 30.0, 0)),
            PositionEvent::Fix(fix(17.1, 20.0, 0)),
        ]);
        let mut watch = source.watch_position(&WatchOptions::default());
        assert!(matches!(watch.events.recv().await, Some(PositionEvent::Fix(_))));
        assert!(matches!(watch.events.recv().await, Some(PositionEvent::Fix(_))));
        assert_eq!(watch.events.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_realtime_pacing() {
        let source = ReplaySource::new(vec![PositionEvent::Fix(fix(17.0, 30.0, 5_000))]).realtime(true);
        let started = tokio::time::Instant::now();
        let mut watch = source.watch_position(&WatchOptions::default());
        assert!(watch.events.recv().await.is_some());
        assert!(started.elapsed() >= Duration::from_millis(5_000));
    }

    #[tokio::test(start_paused = true)]
    async fn test_replay_clear_stops_delivery() {
        let source = ReplaySource::new(vec![PositionEvent::Fix(fix(17.0, 30.0, 5_000))]).realtime(true);
        let mut watch = source.watch_position(&WatchOptions::default());
        source.clear_watch(watch.id);
        assert_eq!(watch.events.recv().await, None);
    }

    #[test]
    fn test_replay_load_invalid() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("fixes.json");
        fs::write(&path, "[{\"bogus\": 1}]").unwrap();
        let err = ReplaySource::load(&path).err().unwrap();
        assert_eq!(err.kind(), io::ErrorKind::InvalidData);
    }
}
