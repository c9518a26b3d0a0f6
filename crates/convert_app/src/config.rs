//! Client configuration: defaults, an optional RON file, then the environment.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use client_logging::client_info;
use convert_core::AUTO_EXPIRE_DELAY;
use convert_engine::{TransportSettings, DEFAULT_BASE_URL};
use serde::Deserialize;
use thiserror::Error;

pub const BASE_URL_ENV: &str = "CONVERTER_API_BASE_URL";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path:?}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config {path:?}: {message}")]
    Parse { path: PathBuf, message: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub base_url: String,
    pub request_timeout: Duration,
    pub connect_timeout: Duration,
    pub max_response_bytes: u64,
    pub notification_ttl: Duration,
    pub log_level: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        let transport = TransportSettings::default();
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout: transport.request_timeout,
            connect_timeout: transport.connect_timeout,
            max_response_bytes: transport.max_response_bytes,
            notification_ttl: AUTO_EXPIRE_DELAY,
            log_level: "info".to_string(),
        }
    }
}

/// On-disk shape. Every field is optional; missing ones keep their default.
#[derive(Debug, Deserialize)]
#[serde(default)]
struct ConfigFile {
    base_url: String,
    request_timeout_ms: u64,
    connect_timeout_ms: u64,
    max_response_bytes: u64,
    notification_ttl_ms: u64,
    log_level: String,
}

impl Default for ConfigFile {
    fn default() -> Self {
        let defaults = ClientConfig::default();
        Self {
            base_url: defaults.base_url,
            request_timeout_ms: millis(defaults.request_timeout),
            connect_timeout_ms: millis(defaults.connect_timeout),
            max_response_bytes: defaults.max_response_bytes,
            notification_ttl_ms: millis(defaults.notification_ttl),
            log_level: defaults.log_level,
        }
    }
}

impl From<ConfigFile> for ClientConfig {
    fn from(file: ConfigFile) -> Self {
        Self {
            base_url: file.base_url,
            request_timeout: Duration::from_millis(file.request_timeout_ms),
            connect_timeout: Duration::from_millis(file.connect_timeout_ms),
            max_response_bytes: file.max_response_bytes,
            notification_ttl: Duration::from_millis(file.notification_ttl_ms),
            log_level: file.log_level,
        }
    }
}

impl ClientConfig {
    /// Loads `path` when given (a missing file is an error), then applies the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let file: ConfigFile = ron::from_str(&text).map_err(|err| ConfigError::Parse {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        client_info!("loaded config from {:?}", path);
        Ok(file.into())
    }

    /// Applies environment overrides read through `lookup`. Blank values are ignored.
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(BASE_URL_ENV).filter(|url| !url.trim().is_empty()) {
            self.base_url = url.trim().to_string();
        }
    }

    pub fn transport_settings(&self) -> TransportSettings {
        TransportSettings {
            base_url: self.base_url.clone(),
            connect_timeout: self.connect_timeout,
            request_timeout: self.request_timeout,
            max_response_bytes: self.max_response_bytes,
        }
    }
}

fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}
