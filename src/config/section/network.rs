//! `[network]` section configuration.
//!
//! Tunables for the network status monitor. All durations are milliseconds.
//!
//! # Example
//!
//! ```toml
//! [network]
//! probe_urls = [
//!     "https://firestore.googleapis.com/",
//!     "https://www.google.com/favicon.ico",
//! ]
//! quality_interval_ms = 30000   # Periodic reachability check
//! quality_timeout_ms = 3000     # Timeout for the periodic check
//! speed_timeout_ms = 5000       # Timeout for speed and connectivity probes
//! fast_threshold_ms = 1000      # Round trips below this are "fast"
//! offline_wait_ms = 10000       # How long a retry waits for the link to return
//! signal_poll_interval_ms = 1000
//! probe_failure_class = "slow"  # Classification when the speed probe fails
//! ```

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::network::ConnectionType;

/// Network monitor settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct NetworkConfig {
    /// Well-known endpoints used purely as reachability probes.
    /// The first classifies speed, the second backs the periodic check.
    pub probe_urls: Vec<String>,

    pub quality_interval_ms: u64,
    pub quality_timeout_ms: u64,
    pub speed_timeout_ms: u64,
    pub fast_threshold_ms: u64,
    pub offline_wait_ms: u64,
    pub signal_poll_interval_ms: u64,

    /// Connection type recorded when the speed probe cannot complete.
    pub probe_failure_class: ConnectionType,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            probe_urls: vec![
                "https://firestore.googleapis.com/".to_string(),
                "https://www.google.com/favicon.ico".to_string(),
                "https://www.cloudflare.com/favicon.ico".to_string(),
            ],
            quality_interval_ms: 30_000,
            quality_timeout_ms: 3_000,
            speed_timeout_ms: 5_000,
            fast_threshold_ms: 1_000,
            offline_wait_ms: 10_000,
            signal_poll_interval_ms: 1_000,
            probe_failure_class: ConnectionType::Slow,
        }
    }
}

impl NetworkConfig {
    /// Endpoint for one-shot speed classification.
    pub fn speed_url(&self) -> Option<&str> {
        self.probe_urls.first().map(String::as_str)
    }

    /// Endpoint for the periodic quality check (second entry, else the first).
    pub fn quality_url(&self) -> Option<&str> {
        self.probe_urls
            .get(1)
            .or_else(|| self.probe_urls.first())
            .map(String::as_str)
    }

    pub const fn quality_interval(&self) -> Duration {
        Duration::from_millis(self.quality_interval_ms)
    }

    pub const fn quality_timeout(&self) -> Duration {
        Duration::from_millis(self.quality_timeout_ms)
    }

    pub const fn speed_timeout(&self) -> Duration {
        Duration::from_millis(self.speed_timeout_ms)
    }

    pub const fn fast_threshold(&self) -> Duration {
        Duration::from_millis(self.fast_threshold_ms)
    }

    pub const fn offline_wait(&self) -> Duration {
        Duration::from_millis(self.offline_wait_ms)
    }

    pub const fn signal_poll_interval(&self) -> Duration {
        Duration::from_millis(self.signal_poll_interval_ms)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.probe_urls.is_empty() {
            return Err("network.probe_urls must list at least one endpoint".into());
        }
        let zero = [
            ("quality_interval_ms", self.quality_interval_ms),
            ("quality_timeout_ms", self.quality_timeout_ms),
            ("speed_timeout_ms", self.speed_timeout_ms),
            ("signal_poll_interval_ms", self.signal_poll_interval_ms),
        ]
        .into_iter()
        .find(|(_, value)| *value == 0);
        if let Some((name, _)) = zero {
            return Err(format!("network.{name} must be greater than 0"));
        }
        Ok(())
    }
}
