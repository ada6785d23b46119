//! Gateway configuration
//!
//! Loaded from a YAML file or from `GEO_GATEWAY_*` environment variables
//! (with `.env` support). Every field has a default; with nothing set the
//! gateway points at a local engine.

use serde::Deserialize;
use std::path::Path;
use url::Url;

use crate::error::ConfigError;

pub const ENV_URL: &str = "GEO_GATEWAY_URL";
pub const ENV_COLLECTION: &str = "GEO_GATEWAY_COLLECTION";
pub const ENV_TIMEOUT_SECS: &str = "GEO_GATEWAY_TIMEOUT_SECS";
pub const ENV_USERNAME: &str = "GEO_GATEWAY_USERNAME";
pub const ENV_PASSWORD: &str = "GEO_GATEWAY_PASSWORD";

pub const DEFAULT_URL: &str = "http://localhost:9200";
pub const DEFAULT_COLLECTION: &str = "cafe";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Base url of the search engine
    pub url: String,
    /// Target index for writes and searches
    pub collection: String,
    /// Per-request deadline applied by the HTTP transport
    pub request_timeout_secs: u64,
    pub username: Option<String>,
    pub password: Option<String>,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            collection: DEFAULT_COLLECTION.to_string(),
            request_timeout_secs: DEFAULT_TIMEOUT_SECS,
            username: None,
            password: None,
        }
    }
}

impl GatewayConfig {
    /// Load `.env` (if present) then read the environment
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_env()
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup; unset keys keep their defaults
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(url) = lookup(ENV_URL) {
            config.url = url;
        }
        if let Some(collection) = lookup(ENV_COLLECTION) {
            config.collection = collection;
        }
        if let Some(raw) = lookup(ENV_TIMEOUT_SECS) {
            config.request_timeout_secs =
                raw.trim()
                    .parse()
                    .map_err(|_| ConfigError::InvalidValue {
                        key: ENV_TIMEOUT_SECS,
                        value: raw.clone(),
                    })?;
        }
        config.username = lookup(ENV_USERNAME);
        config.password = lookup(ENV_PASSWORD);
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.engine_url()?;
        if self.collection.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                key: "collection",
                value: self.collection.clone(),
            });
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                key: "request_timeout_secs",
                value: "0".to_string(),
            });
        }
        Ok(())
    }

    /// Parsed engine url; only http and https are accepted
    pub fn engine_url(&self) -> Result<Url, ConfigError> {
        let url = Url::parse(&self.url).map_err(|source| ConfigError::InvalidUrl {
            url: self.url.clone(),
            source,
        })?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ConfigError::InvalidValue {
                key: "url",
                value: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}
