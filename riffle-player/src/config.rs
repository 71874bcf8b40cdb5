//! Configuration for riffle-player
//!
//! Bootstrap configuration comes from a TOML file (see
//! `riffle_common::config` for how the file is located). Every key has a
//! built-in default, so an absent file yields a runnable configuration.
//!
//! # Settings Sources Priority
//!
//! 1. Command-line arguments (--port, --catalog, --gateway-url)
//! 2. TOML configuration file
//! 3. Built-in defaults (code constants)

use crate::error::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Bootstrap configuration loaded from TOML file
#[derive(Debug, Clone, Deserialize)]
pub struct TomlConfig {
    /// HTTP server port
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging configuration (optional)
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Where track and playlist data come from
    #[serde(default)]
    pub gateway: GatewayConfig,

    /// Playback engine tuning
    #[serde(default)]
    pub engine: EngineSettings,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log filter directive used when RUST_LOG is unset
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

/// Data gateway selection
///
/// Exactly one of `base_url` (remote record store) or `catalog_path` (local
/// TOML catalog) should be set. When both are set the catalog wins.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct GatewayConfig {
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub catalog_path: Option<PathBuf>,

    /// Request timeout for the remote record store
    #[serde(default = "default_gateway_timeout_ms")]
    pub timeout_ms: u64,
}

impl GatewayConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Playback engine tuning
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EngineSettings {
    /// Playlist entries requested per page fetch
    #[serde(default = "default_page_size")]
    pub page_size: u32,

    /// Remaining playlist-queue length at or below which a refill is issued
    #[serde(default = "default_low_water_mark")]
    pub low_water_mark: usize,

    /// Volume at startup (0-100)
    #[serde(default = "default_initial_volume")]
    pub initial_volume: u8,

    /// Interval between position notifications from the audio output
    #[serde(default = "default_position_interval_ms")]
    pub position_interval_ms: u64,

    /// Upper bound on fetching an HLS manifest when loading a track
    #[serde(default = "default_manifest_timeout_ms")]
    pub manifest_timeout_ms: u64,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
            low_water_mark: default_low_water_mark(),
            initial_volume: default_initial_volume(),
            position_interval_ms: default_position_interval_ms(),
            manifest_timeout_ms: default_manifest_timeout_ms(),
        }
    }
}

impl EngineSettings {
    /// Reject settings the pager cannot work with
    pub fn validate(&self) -> Result<()> {
        if self.page_size == 0 {
            return Err(Error::Config("engine.page_size must be >= 1".to_string()));
        }
        if self.low_water_mark >= self.page_size as usize {
            return Err(Error::Config(format!(
                "engine.low_water_mark ({}) must be below engine.page_size ({})",
                self.low_water_mark, self.page_size
            )));
        }
        if self.initial_volume > 100 {
            return Err(Error::Config("engine.initial_volume must be 0-100".to_string()));
        }
        if self.position_interval_ms == 0 {
            return Err(Error::Config("engine.position_interval_ms must be >= 1".to_string()));
        }
        if self.manifest_timeout_ms == 0 {
            return Err(Error::Config("engine.manifest_timeout_ms must be >= 1".to_string()));
        }
        Ok(())
    }

    pub fn position_interval(&self) -> Duration {
        Duration::from_millis(self.position_interval_ms)
    }

    pub fn manifest_timeout(&self) -> Duration {
        Duration::from_millis(self.manifest_timeout_ms)
    }
}

impl Default for TomlConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            logging: LoggingConfig::default(),
            gateway: GatewayConfig::default(),
            engine: EngineSettings::default(),
        }
    }
}

impl TomlConfig {
    /// Load from `path`, or use defaults when no file was resolved
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                riffle_common::config::load_toml::<TomlConfig>(path)?
            }
            None => {
                info!("No configuration file found, using built-in defaults");
                TomlConfig::default()
            }
        };
        config.engine.validate()?;
        Ok(config)
    }
}

fn default_port() -> u16 {
    5750
}

fn default_log_level() -> String {
    "riffle_player=info,tower_http=info".to_string()
}

fn default_gateway_timeout_ms() -> u64 {
    5000
}

fn default_page_size() -> u32 {
    10
}

fn default_low_water_mark() -> usize {
    3
}

fn default_initial_volume() -> u8 {
    75
}

fn default_position_interval_ms() -> u64 {
    250
}

fn default_manifest_timeout_ms() -> u64 {
    5000
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_are_valid() {
        let config = TomlConfig::default();
        assert_eq!(config.port, 5750);
        assert_eq!(config.engine.page_size, 10);
        assert_eq!(config.engine.low_water_mark, 3);
        assert!(config.engine.validate().is_ok());
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "port = 7000\n[engine]\npage_size = 25").unwrap();

        let config = TomlConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.port, 7000);
        assert_eq!(config.engine.page_size, 25);
        assert_eq!(config.engine.low_water_mark, 3);
        assert_eq!(config.gateway.timeout_ms, 5000);
    }

    #[test]
    fn test_low_water_mark_must_be_below_page_size() {
        let settings = EngineSettings {
            page_size: 3,
            low_water_mark: 3,
            ..EngineSettings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let settings = EngineSettings {
            page_size: 0,
            low_water_mark: 0,
            ..EngineSettings::default()
        };
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_manifest_timeout_rejected() {
        let settings = EngineSettings {
            manifest_timeout_ms: 0,
            ..EngineSettings::default()
        };
        assert!(matches!(settings.validate(), Err(Error::Config(_))));
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = TomlConfig::load(Some(Path::new("/nonexistent/riffle.toml")));
        assert!(matches!(result, Err(Error::Config(_))));
    }
}
