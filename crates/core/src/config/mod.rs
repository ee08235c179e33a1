//! Configuration for the scripting core
//!
//! Settings owned by the game server itself (command prefix, owner,
//! permission overrides, stats endpoint) are cvars and are read through
//! the host engine when needed. Framework settings live in a TOML file:
//!
//! ```toml
//! version = 1
//! debug = false
//! log_filter = "info"
//! handoff_capacity = 1024
//!
//! [stats]
//! poll_timeout_ms = 250
//! reconnect_delay_ms = 1000
//! ```

mod loader;

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

pub use loader::{core_config_path, qlrust_base_dir};

/// Cvar names read by the core
pub mod cvars {
    pub const OWNER: &str = "qlx_owner";
    pub const COMMAND_PREFIX: &str = "qlx_commandPrefix";
    pub const PERM_PREFIX: &str = "qlx_perm_";
    pub const CCMD_PERM_PREFIX: &str = "qlx_ccmd_perm_";
    pub const ZMQ_STATS_ENABLE: &str = "zmq_stats_enable";
    pub const ZMQ_STATS_IP: &str = "zmq_stats_ip";
    pub const ZMQ_STATS_PORT: &str = "zmq_stats_port";
    pub const ZMQ_STATS_PASSWORD: &str = "zmq_stats_password";
    pub const NET_PORT: &str = "net_port";
    pub const MAPNAME: &str = "mapname";
    pub const FACTORY: &str = "g_factory";
    pub const HOMEPATH: &str = "fs_homepath";
}

/// Configuration system errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read or write config file
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failed to parse TOML content
    #[error("Failed to parse TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Failed to serialize config to TOML
    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Result type for config operations
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Stats feed settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatsConfig {
    /// How long a single receive poll waits before the loop checks its stop flag
    pub poll_timeout_ms: u64,

    /// Pause before reconnecting after a socket failure
    pub reconnect_delay_ms: u64,
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            poll_timeout_ms: 250,
            reconnect_delay_ms: 1000,
        }
    }
}

impl StatsConfig {
    pub fn poll_timeout(&self) -> Duration {
        Duration::from_millis(self.poll_timeout_ms)
    }

    pub fn reconnect_delay(&self) -> Duration {
        Duration::from_millis(self.reconnect_delay_ms)
    }
}

/// Core framework configuration.
///
/// Loaded from `<fs_homepath>/qlrust/core.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CoreConfig {
    /// Config version for future migration support
    pub version: u32,

    /// Enable debug logging
    pub debug: bool,

    /// `tracing` filter directive used when `RUST_LOG` is unset
    pub log_filter: String,

    /// Capacity of the next-frame hand-off queue
    pub handoff_capacity: usize,

    /// Stats feed settings
    pub stats: StatsConfig,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            version: 1,
            debug: false,
            log_filter: "info".to_string(),
            handoff_capacity: 1024,
            stats: StatsConfig::default(),
        }
    }
}

impl CoreConfig {
    /// Load config from `path`, creating a default file if missing.
    pub fn load(path: &Path) -> ConfigResult<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Self = toml::from_str(&content)?;
            tracing::debug!("Loaded core config from {:?}", path);
            Ok(config)
        } else {
            let default = Self::default();
            default.save(path)?;
            tracing::info!("Created default core config at {:?}", path);
            Ok(default)
        }
    }

    /// Save config to `path`, creating parent directories.
    pub fn save(&self, path: &Path) -> ConfigResult<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        tracing::debug!("Saved core config to {:?}", path);
        Ok(())
    }

    /// Reload config from `path`.
    pub fn reload(&mut self, path: &Path) -> ConfigResult<()> {
        let content = std::fs::read_to_string(path)?;
        *self = toml::from_str(&content)?;
        tracing::debug!("Reloaded core config from {:?}", path);
        Ok(())
    }

    /// Filter directive for the log subscriber
    pub fn filter_directive(&self) -> &str {
        if self.debug {
            "debug"
        } else {
            &self.log_filter
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_config_default() {
        let config = CoreConfig::default();
        assert_eq!(config.version, 1);
        assert!(!config.debug);
        assert_eq!(config.handoff_capacity, 1024);
        assert_eq!(config.stats.poll_timeout(), Duration::from_millis(250));
        assert_eq!(config.filter_directive(), "info");
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: CoreConfig = toml::from_str("debug = true\n[stats]\npoll_timeout_ms = 50\n").unwrap();
        assert!(config.debug);
        assert_eq!(config.filter_directive(), "debug");
        assert_eq!(config.stats.poll_timeout_ms, 50);
        assert_eq!(config.stats.reconnect_delay_ms, 1000);
        assert_eq!(config.handoff_capacity, 1024);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = std::env::temp_dir().join(format!("qlrust-config-{}", std::process::id()));
        let path = core_config_path(&dir);
        let _ = std::fs::remove_file(&path);

        let config = CoreConfig::load(&path).unwrap();
        assert_eq!(config, CoreConfig::default());
        assert!(path.exists());

        let mut changed = config.clone();
        changed.handoff_capacity = 16;
        changed.save(&path).unwrap();

        let mut reloaded = CoreConfig::default();
        reloaded.reload(&path).unwrap();
        assert_eq!(reloaded.handoff_capacity, 16);

        let _ = std::fs::remove_dir_all(&dir);
    }
}
