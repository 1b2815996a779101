//! Store configuration
//!
//! Loaded from a JSON file. Every field has a default, so `{}` is a valid config.
//!
//! ```json
//! {
//!   "data_dir": "./rebac-data",
//!   "log_level": "info",
//!   "backoff": { "enabled": false, "initial_spins": 4, "max_spins": 1024 }
//! }
//! ```

mod errors;

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::observability::Severity;

pub use errors::{ConfigError, ConfigResult};

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Directory holding snapshot files
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Minimum log severity ("trace", "info", "warn", "error", "fatal")
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Backoff between lost CAS rounds
    #[serde(default)]
    pub backoff: BackoffConfig,
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./rebac-data")
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            log_level: default_log_level(),
            backoff: BackoffConfig::default(),
        }
    }
}

impl StoreConfig {
    /// Load and validate configuration from a file.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&content)
    }

    /// Parse and validate configuration from a JSON string.
    pub fn from_json(content: &str) -> ConfigResult<Self> {
        let config: StoreConfig = serde_json::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.data_dir.as_os_str().is_empty() {
            return Err(ConfigError::invalid("data_dir", "must not be empty"));
        }
        self.severity()?;
        self.backoff.validate()
    }

    /// The configured minimum log severity.
    pub fn severity(&self) -> ConfigResult<Severity> {
        self.log_level
            .parse()
            .map_err(|e: String| ConfigError::invalid("log_level", e))
    }
}

/// Exponential backoff between retries of a lost CAS round.
///
/// Disabled by default: writers retry immediately.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackoffConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Spin iterations before the first retry
    #[serde(default = "default_initial_spins")]
    pub initial_spins: u32,

    /// Cap on spin iterations; past this the writer yields its thread
    #[serde(default = "default_max_spins")]
    pub max_spins: u32,
}

fn default_initial_spins() -> u32 {
    4
}

fn default_max_spins() -> u32 {
    1024
}

impl Default for BackoffConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            initial_spins: default_initial_spins(),
            max_spins: default_max_spins(),
        }
    }
}

impl BackoffConfig {
    pub fn enabled() -> Self {
        Self {
            enabled: true,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> ConfigResult<()> {
        if self.initial_spins == 0 {
            return Err(ConfigError::invalid("backoff.initial_spins", "must be > 0"));
        }
        if self.max_spins < self.initial_spins {
            return Err(ConfigError::invalid(
                "backoff.max_spins",
                format!(
                    "must be >= initial_spins ({} < {})",
                    self.max_spins, self.initial_spins
                ),
            ));
        }
        Ok(())
    }
}
