//! Configuration for the orderhub server.
//!
//! Supports YAML file and environment variable overrides.

use serde::Deserialize;
use std::time::Duration;

/// Environment variable naming a config file to load.
pub const CONFIG_ENV_VAR: &str = "ORDERHUB_CONFIG";
/// Prefix for environment variable overrides (e.g. `ORDERHUB__SERVER__PORT`).
pub const CONFIG_ENV_PREFIX: &str = "ORDERHUB";

/// Server configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Listening socket configuration.
    pub server: ServerConfig,
    /// Order-tracking simulation configuration.
    pub tracking: TrackingConfig,
}

/// Listening socket configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port for the order gRPC service.
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 50051,
        }
    }
}

impl ServerConfig {
    /// Get the socket address string.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Order-tracking simulation configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TrackingConfig {
    /// Spacing between scheduled status updates, in milliseconds.
    pub tick_millis: u64,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self { tick_millis: 2000 }
    }
}

impl TrackingConfig {
    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Sources, later overrides earlier:
    /// 1. `config.yaml` in the current directory (if present)
    /// 2. File named by the `path` argument (if provided)
    /// 3. File named by `ORDERHUB_CONFIG` (if set)
    /// 4. `ORDERHUB`-prefixed environment variables
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new("config", FileFormat::Yaml).required(false));

        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let settings = builder
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = settings.try_deserialize()?;
        Ok(config)
    }
}
