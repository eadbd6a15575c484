//! Daemon configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use stakesync_manager::ManagerConfig;
use stakesync_provider::HttpProviderConfig;
use stakesync_types::StakingWallet;
use stakesync_utils::LogFormat;

/// Configuration for the `stakesync` daemon.
///
/// Loaded from a TOML file; CLI flags and environment variables override
/// individual values.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DaemonConfig {
    /// Staking provider connection.
    pub provider: HttpProviderConfig,

    /// The wallet whose staking state is reconciled.
    pub wallet: StakingWallet,

    #[serde(default)]
    pub log: LogConfig,

    #[serde(default)]
    pub manager: ManagerConfig,

    /// Where the last successful snapshot is kept between runs.
    /// In-memory only when unset.
    #[serde(default)]
    pub state_file: Option<PathBuf>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LogConfig {
    /// Log format: "human" or "json".
    #[serde(default)]
    pub format: LogFormat,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl DaemonConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &std::path::Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(s)?)
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_log_level(),
        }
    }
}
