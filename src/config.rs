//! Service configuration loader - parses weatherbox.toml
//!
//! Keeps provider URLs, the User-Agent string and fetch limits out of the
//! code. Every field has a default, so running without a config file works
//! against the public providers.

use serde::Deserialize;
use std::env;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_CONFIG_PATH: &str = "weatherbox.toml";

/// Engine configuration, read from the top level of weatherbox.toml.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ServiceConfig {
    /// api.weather.gov root; tests point this at a local mock.
    pub alerts_base_url: String,
    /// ArcGIS GeocodeServer root (findAddressCandidates is appended).
    pub geocoder_base_url: String,
    /// api.weather.gov rejects requests without an identifying User-Agent.
    pub user_agent: String,
    /// Per-request timeout, applied to each provider call independently.
    pub query_timeout_secs: u64,
    /// Outer limit for one multi-zone alert fetch.
    pub fetch_timeout_secs: u64,
    /// Worker pool size for per-zone alert queries.
    pub max_concurrent_queries: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            alerts_base_url: "https://api.weather.gov".to_string(),
            geocoder_base_url:
                "https://geocode.arcgis.com/arcgis/rest/services/World/GeocodeServer".to_string(),
            user_agent: "WeatherBox/1.0".to_string(),
            query_timeout_secs: 8,
            fetch_timeout_secs: 20,
            max_concurrent_queries: 4,
        }
    }
}

impl ServiceConfig {
    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    fn validate(self) -> Result<Self, ConfigError> {
        if self.alerts_base_url.trim().is_empty() || self.geocoder_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("provider base URLs must not be empty".into()));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid("user_agent must not be empty".into()));
        }
        if self.query_timeout_secs == 0 || self.fetch_timeout_secs == 0 {
            return Err(ConfigError::Invalid("timeouts must be at least one second".into()));
        }
        if self.max_concurrent_queries == 0 {
            return Err(ConfigError::Invalid("max_concurrent_queries must be at least 1".into()));
        }
        Ok(self)
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read { path: PathBuf, source: io::Error },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Parses and validates a configuration document.
pub fn parse_config(contents: &str) -> Result<ServiceConfig, ConfigError> {
    let config: ServiceConfig = toml::from_str(contents).map_err(|source| ConfigError::Parse {
        path: PathBuf::from("<inline>"),
        source,
    })?;
    config.validate()
}

/// Loads configuration from `path`. A missing file yields defaults; a file
/// that exists but cannot be read or parsed is an error.
pub fn load_config_from(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let contents = match fs::read_to_string(path) {
        Ok(contents) => contents,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            log::info!("{} not found, using default configuration", path.display());
            return ServiceConfig::default().validate();
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    let config: ServiceConfig = toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    config.validate()
}

/// Loads configuration the way the binaries do: `.env` first, then the file
/// named by `WEATHERBOX_CONFIG` (default `weatherbox.toml`), then the
/// `WEATHERBOX_USER_AGENT` override.
pub fn load_config() -> Result<ServiceConfig, ConfigError> {
    dotenv::dotenv().ok();

    let path = env::var("WEATHERBOX_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    let mut config = load_config_from(Path::new(&path))?;

    if let Ok(user_agent) = env::var("WEATHERBOX_USER_AGENT") {
        config.user_agent = user_agent;
    }

    config.validate()
}
