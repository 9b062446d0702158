//! File-based store for the last detected location at
//! ~/.plot_locator/location.json.
//!
//! TTL: 30 days. Single entry; saving replaces it.
//! Reloaded entries carry `source = stored`.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::config::data_dir;

use super::types::{DetectedLocation, LocationSource};

const STORE_TTL_MS: i64 = 30 * 24 * 3600 * 1000; // 30 days in ms

#[derive(Serialize, Deserialize, Clone)]
struct StoredEntry {
    location: DetectedLocation,
    /// Unix ms when saved.
    saved_at: i64,
}

/// The stored-location file.
pub struct LocationStore {
    path: PathBuf,
    entry: Option<StoredEntry>,
}

impl LocationStore {
    /// Load from the default location.
    pub fn load() -> Self {
        Self::load_from(Self::default_path())
    }

    /// Load from a specific path. A missing or unreadable file is an empty store.
    pub fn load_from(path: PathBuf) -> Self {
        let entry = Self::read_file(&path);
        Self { path, entry }
    }

    pub fn default_path() -> PathBuf {
        data_dir().join("location.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read_file(path: &Path) -> Option<StoredEntry> {
        let data = fs::read_to_string(path).ok()?;
        match serde_json::from_str(&data) {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Ignoring unreadable stored location");
                None
            }
        }
    }

    /// The stored location, unless missing or expired.
    pub fn get(&self) -> Option<DetectedLocation> {
        let entry = self.entry.as_ref()?;

        let now = Utc::now().timestamp_millis();
        if now.saturating_sub(entry.saved_at) > STORE_TTL_MS {
            debug!(saved_at = entry.saved_at, "Stored location expired");
            return None;
        }

        Some(DetectedLocation {
            source: LocationSource::Stored,
            ..entry.location.clone()
        })
    }

    /// Replace the stored location and persist to disk.
    pub fn put(&mut self, location: &DetectedLocation) {
        self.entry = Some(StoredEntry {
            location: location.clone(),
            saved_at: Utc::now().timestamp_millis(),
        });
        self.persist();
    }

    /// Forget the stored location and remove the file.
    pub fn clear(&mut self) {
        self.entry = None;
        if let Err(e) = fs::remove_file(&self.path) {
            if e.kind() != std::io::ErrorKind::NotFound {
                warn!(path = %self.path.display(), error = %e, "Failed to remove stored location");
            }
        }
    }

    fn persist(&self) {
        if let Some(parent) = self.path.parent() {
            let _ = fs::create_dir_all(parent);
        }
        let written = serde_json::to_string_pretty(&self.entry)
            .map_err(std::io::Error::from)
            .and_then(|json| fs::write(&self.path, json));
        if let Err(e) = written {
            warn!(path = %self.path.display(), error = %e, "Failed to persist location");
        }
    }
}
