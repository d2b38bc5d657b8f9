//! Application configuration
//!
//! Loaded from a TOML file; every field has a default so the server runs
//! with no config file at all. Lookup order: `VOLTCORE_CONFIG` env var, then
//! `<config dir>/voltcore-ocpp/config.toml`.

use std::path::PathBuf;

use serde::Deserialize;
use tracing::{info, warn};

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub ocpp: OcppConfig,
    pub bootstrap: BootstrapConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// WebSocket listener for charge points.
    pub ws_host: String,
    pub ws_port: u16,
    /// REST API listener.
    pub api_host: String,
    pub api_port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            ws_host: "0.0.0.0".to_string(),
            ws_port: 9000,
            api_host: "0.0.0.0".to_string(),
            api_port: 8080,
        }
    }
}

impl ServerConfig {
    pub fn ws_address(&self) -> String {
        format!("{}:{}", self.ws_host, self.ws_port)
    }

    pub fn api_address(&self) -> String {
        format!("{}:{}", self.api_host, self.api_port)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            // rwc: create the file on first run
            url: "sqlite://voltcore.db?mode=rwc".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OcppConfig {
    /// Interval handed to stations in the BootNotification response.
    pub heartbeat_interval_secs: u32,
    /// MeterValueSampleInterval pushed during startup configuration.
    pub meter_sample_interval_secs: u32,
    /// MeterValuesSampledData pushed during startup configuration.
    pub sampled_measurands: String,
    /// How long an outbound command waits for the station's answer.
    pub command_timeout_secs: u64,
}

impl Default for OcppConfig {
    fn default() -> Self {
        Self {
            heartbeat_interval_secs: 30,
            meter_sample_interval_secs: 10,
            sampled_measurands: "Power.Active.Import,Current.Import".to_string(),
            command_timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct BootstrapConfig {
    /// Stations to push metering configuration to after startup. Empty
    /// disables the configurator.
    pub station_ids: Vec<String>,
    /// Time given to chargers to connect before the first pass.
    pub grace_secs: u64,
    pub retry_secs: u64,
}

impl Default for BootstrapConfig {
    fn default() -> Self {
        Self {
            station_ids: Vec::new(),
            grace_secs: 30,
            retry_secs: 30,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default tracing filter; RUST_LOG overrides it.
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load configuration, falling back to defaults when no file exists.
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        match std::fs::read_to_string(&path) {
            Ok(raw) => match toml::from_str(&raw) {
                Ok(config) => {
                    info!(path = %path.display(), "Loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "Bad config file, using defaults");
                    Self::default()
                }
            },
            Err(_) => Self::default(),
        }
    }

    fn config_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("VOLTCORE_CONFIG") {
            return Some(PathBuf::from(path));
        }
        dirs_next::config_dir().map(|dir| dir.join("voltcore-ocpp").join("config.toml"))
    }
}
