//! Staking manager configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::ConfigError;

/// Timing of a staking session.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagerConfig {
    /// Wait between submitting an action and patching its transaction steps, in milliseconds.
    #[serde(default = "default_settle_delay_ms")]
    pub settle_delay_ms: u64,

    /// Interval between refreshes while pending actions are outstanding, in seconds.
    #[serde(default = "default_status_update_interval_secs")]
    pub status_update_interval_secs: u64,

    /// Refreshing stops this long after the first refresh, in seconds.
    #[serde(default = "default_status_update_timeout_secs")]
    pub status_update_timeout_secs: u64,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_settle_delay_ms() -> u64 {
    1_000
}

fn default_status_update_interval_secs() -> u64 {
    10
}

fn default_status_update_timeout_secs() -> u64 {
    180
}

// ── Impl ───────────────────────────────────────────────────────────────

impl ManagerConfig {
    pub fn settle_delay(&self) -> Duration {
        Duration::from_millis(self.settle_delay_ms)
    }

    pub fn status_update_interval(&self) -> Duration {
        Duration::from_secs(self.status_update_interval_secs)
    }

    pub fn status_update_timeout(&self) -> Duration {
        Duration::from_secs(self.status_update_timeout_secs)
    }

    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, ConfigError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Read(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        toml::from_str(s).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("ManagerConfig is always serializable to TOML")
    }
}

impl Default for ManagerConfig {
    fn default() -> Self {
        Self {
            settle_delay_ms: default_settle_delay_ms(),
            status_update_interval_secs: default_status_update_interval_secs(),
            status_update_timeout_secs: default_status_update_timeout_secs(),
        }
    }
}
