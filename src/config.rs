//! Monitor configuration.
//!
//! Settings layer in three stages: built-in defaults, an optional config
//! file, then command-line overrides applied by the binary. The resulting
//! [`MonitorConfig`] is immutable for the lifetime of a monitor instance.

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use config::{Config, File};
use serde::{Deserialize, Serialize};

/// Default target: a well-known public resolver.
pub const DEFAULT_HOST: &str = "8.8.8.8";

/// Configuration shared by both metric monitors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MonitorConfig {
    /// Target host for probe rounds.
    pub host: String,
    /// Echo requests per probe round.
    pub probe_count: u32,
    /// Seconds between probe rounds.
    pub probe_interval_secs: u64,
    /// Upper bound on one probe round; a timeout is a lenient failure.
    pub probe_timeout_secs: u64,
    /// Seconds of history retained for live display.
    pub window_secs: u64,
    /// Seconds between durable rollups.
    pub rollup_interval_secs: u64,
    /// Directory for rollup CSV files and the session log.
    pub log_dir: PathBuf,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            probe_count: 10,
            probe_interval_secs: 5,
            probe_timeout_secs: 30,
            window_secs: 30,
            rollup_interval_secs: 24 * 60 * 60,
            log_dir: PathBuf::from("."),
        }
    }
}

impl MonitorConfig {
    /// Load configuration, layering an optional file over the defaults.
    pub fn load(file: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Some(path) = file {
            builder = builder.add_source(File::from(path.to_path_buf()));
        }

        builder
            .build()
            .and_then(Config::try_deserialize)
            .with_context(|| match file {
                Some(path) => format!("invalid configuration in {}", path.display()),
                None => "invalid default configuration".to_string(),
            })
    }

    pub fn probe_interval(&self) -> Duration {
        Duration::from_secs(self.probe_interval_secs)
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_secs(self.probe_timeout_secs)
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }

    pub fn rollup_interval(&self) -> Duration {
        Duration::from_secs(self.rollup_interval_secs)
    }
}
