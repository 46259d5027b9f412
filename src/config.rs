//! Configuration: connection parameters and client tuning, parsed from TOML.

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::core::{RequeryError, Result};

const DEFAULT_CALL_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_PROBE_TIMEOUT_MS: u64 = 2_000;

/// Connection parameters, supplied once at client construction.
#[derive(Debug, Clone, Deserialize)]
pub struct ConnectionParams {
    pub host: String,
    pub port: u16,
    pub database: String,
    pub user: String,
    pub password: String,
}

impl ConnectionParams {
    /// Builds the connection target identifier.
    ///
    /// Credentials are passed to the driver separately and never embedded
    /// here, so the URL is safe to log.
    pub fn url(&self) -> String {
        format!("postgres://{}:{}/{}", self.host, self.port, self.database)
    }
}

/// Client tuning knobs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    /// Bounded wait for one background connect/query call, in milliseconds
    pub call_timeout_ms: Option<u64>,
    /// Reachability probe timeout, in milliseconds
    pub probe_timeout_ms: Option<u64>,
}

impl ClientConfig {
    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms.unwrap_or(DEFAULT_CALL_TIMEOUT_MS))
    }

    pub fn probe_timeout(&self) -> Duration {
        Duration::from_millis(self.probe_timeout_ms.unwrap_or(DEFAULT_PROBE_TIMEOUT_MS))
    }
}

/// Top-level configuration structure parsed from a TOML file.
#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: ConnectionParams,
    pub client: Option<ClientConfig>,
}

impl Config {
    pub fn client(&self) -> ClientConfig {
        self.client.clone().unwrap_or_default()
    }
}

/// Loads configuration from a TOML file at the given path.
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let content = fs::read_to_string(path)?;
    toml::from_str(&content).map_err(|e| RequeryError::Config(e.to_string()))
}

/// Default configuration location: `<config_dir>/requery/config.toml`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("requery").join("config.toml"))
}
