//! TOML configuration at ~/.plot_locator/config.toml.
//!
//! Every field is optional; defaults reproduce the built-in constants.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::acquisition::WatchOptions;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub acquisition: AcquisitionConfig,
    pub storage: StorageConfig,
    pub server: ServerConfig,
    pub log: LogConfig,
}

/// Session thresholds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AcquisitionConfig {
    pub timeout_ms: u64,
    pub target_accuracy_m: f64,
    pub min_stable_readings: u32,
    pub stability_threshold_m: f64,
    pub max_readings: u32,
    pub watch: WatchOptions,
}

impl Default for AcquisitionConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 20_000,
            target_accuracy_m: 20.0,
            min_stable_readings: 3,
            stability_threshold_m: 20.0,
            max_readings: 5,
            watch: WatchOptions::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// JSON geography dataset replacing the built-in one.
    pub geography: Option<PathBuf>,
    /// Stored-location file; defaults to ~/.plot_locator/location.json.
    pub location: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 3000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `tracing` filter directive used when RUST_LOG is unset.
    pub level: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self { level: "warn".into() }
    }
}

/// ~/.plot_locator, falling back to the working directory.
pub fn data_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".plot_locator")
}

impl Config {
    pub fn default_path() -> PathBuf {
        data_dir().join("config.toml")
    }

    /// Load the default file; a missing file yields defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load an explicit file, which must exist.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let data = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&data)
    }

    pub fn parse(data: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(data)?)
    }
}
