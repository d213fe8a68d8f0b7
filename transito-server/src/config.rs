use std::{path::Path, path::PathBuf, time::Duration};

use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Server settings, read from a TOML file. Every key is optional.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Socket address to bind
    pub listen: String,
    /// Simulation tick period
    pub tick_interval_ms: u64,
    /// Speed (km/h) for demo vehicles and vehicles first seen through telemetry
    pub default_vehicle_speed: f64,
    pub seed_demo_vehicles: bool,
    pub max_concurrent_requests: usize,
    pub request_timeout_ms: u64,
    /// Reference data file; the built-in network when absent
    pub data_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            listen: "0.0.0.0:3000".to_string(),
            tick_interval_ms: 1000,
            default_vehicle_speed: 40.0,
            seed_demo_vehicles: true,
            max_concurrent_requests: 256,
            request_timeout_ms: 10_000,
            data_path: None,
        }
    }
}

impl ServerConfig {
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.tick_interval_ms == 0 {
            return Err(ConfigError::Invalid(
                "tick_interval_ms must be greater than zero".to_string(),
            ));
        }
        if !self.default_vehicle_speed.is_finite() || self.default_vehicle_speed < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "default_vehicle_speed must be a non-negative number, got {}",
                self.default_vehicle_speed
            )));
        }
        if self.max_concurrent_requests == 0 {
            return Err(ConfigError::Invalid(
                "max_concurrent_requests must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}
