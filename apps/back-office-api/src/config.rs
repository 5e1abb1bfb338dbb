//! Back office API configuration.
//!
//! ## Load Order (later overrides earlier)
//! 1. Default values
//! 2. Config file (`FUELBOOK_CONFIG`, else `<config dir>/fuelbook/server.toml`)
//! 3. Environment variables
//!
//! ## Example config file
//! ```toml
//! bind_addr = "0.0.0.0"
//! port = 8080
//! database_path = "/var/lib/fuelbook/fuelbook.db"
//! max_connections = 8
//! request_timeout_secs = 15
//! ```

use std::env;
use std::net::{IpAddr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// HTTP server configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to listen on.
    pub bind_addr: String,

    /// HTTP port
    pub port: u16,

    /// SQLite database file
    pub database_path: PathBuf,

    /// Pool size
    pub max_connections: u32,

    /// Upper bound on one request, transaction included.
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind_addr: "0.0.0.0".to_string(),
            port: 8080,
            database_path: PathBuf::from("./fuelbook.db"),
            max_connections: 5,
            request_timeout_secs: 30,
        }
    }
}

impl ServerConfig {
    /// Loads configuration from file, environment and defaults.
    pub fn load() -> Result<Self, ConfigError> {
        let path = env::var("FUELBOOK_CONFIG")
            .ok()
            .map(PathBuf::from)
            .or_else(Self::default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => {
                info!(?path, "Loading server config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ConfigError::Read(path.clone(), e))?;
                toml::from_str(&contents)?
            }
            Some(path) => {
                debug!(?path, "Config file not found, using defaults");
                Self::default()
            }
            None => Self::default(),
        };

        config.apply_env_overrides(|key| env::var(key).ok())?;
        config.validate()?;

        Ok(config)
    }

    /// Applies `FUELBOOK_*` overrides read through `lookup`.
    fn apply_env_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(addr) = lookup("FUELBOOK_BIND_ADDR") {
            self.bind_addr = addr;
        }

        if let Some(port) = lookup("FUELBOOK_PORT") {
            self.port = parse_var("FUELBOOK_PORT", &port)?;
        }

        if let Some(path) = lookup("FUELBOOK_DATABASE_PATH") {
            debug!(path = %path, "Overriding database path from environment");
            self.database_path = PathBuf::from(path);
        }

        if let Some(max) = lookup("FUELBOOK_MAX_CONNECTIONS") {
            self.max_connections = parse_var("FUELBOOK_MAX_CONNECTIONS", &max)?;
        }

        if let Some(secs) = lookup("FUELBOOK_REQUEST_TIMEOUT_SECS") {
            self.request_timeout_secs = parse_var("FUELBOOK_REQUEST_TIMEOUT_SECS", &secs)?;
        }

        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.bind_addr.parse::<IpAddr>().is_err() {
            return Err(ConfigError::InvalidValue("bind_addr".to_string()));
        }

        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRequired("database_path".to_string()));
        }

        if self.max_connections == 0 {
            return Err(ConfigError::InvalidValue("max_connections".to_string()));
        }

        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue("request_timeout_secs".to_string()));
        }

        Ok(())
    }

    /// Address the listener binds to. Only valid after [`Self::validate`].
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        let ip: IpAddr = self
            .bind_addr
            .parse()
            .map_err(|_| ConfigError::InvalidValue("bind_addr".to_string()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "fuelbook", "fuelbook")
            .map(|dirs| dirs.config_dir().join("server.toml"))
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, ConfigError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigError::InvalidValue(key.to_string()))
}

/// Configuration error types.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for {0}")]
    InvalidValue(String),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Failed to read {0:?}: {1}")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
}
