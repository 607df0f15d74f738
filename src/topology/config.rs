//! Service configuration file model.
//!
//! Mirrors the JSON file the service has always read at startup
//! (`config/service-config.json`). Sections are keyed by service name.

use serde::{Deserialize, Deserializer};
use std::path::Path;
use std::time::Duration;

use super::selector::ConfigError;

pub const DEFAULT_CONFIG_PATH: &str = "config/service-config.json";

const DEFAULT_CONNECTIONS: usize = 64;
const DEFAULT_TIMEOUT_MS: u64 = 1000;

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(rename = "home-timeline-service")]
    pub service: ServiceSection,
    #[serde(rename = "home-timeline-redis")]
    pub cache: CacheSection,
    #[serde(rename = "redis-primary", default)]
    pub primary: Option<BackendSection>,
    #[serde(rename = "redis-replica", default)]
    pub replica: Option<BackendSection>,
    #[serde(rename = "social-graph-service")]
    pub social_graph: BackendSection,
    #[serde(rename = "post-storage-service")]
    pub post_storage: BackendSection,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceSection {
    pub addr: String,
}

/// Connection settings for one remote endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct BackendSection {
    pub addr: String,
    #[serde(default = "default_connections")]
    pub connections: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl BackendSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// The home timeline cache tier: standalone address, cluster shards and the
/// two topology switches.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheSection {
    #[serde(default)]
    pub addr: Option<String>,
    #[serde(default = "default_connections")]
    pub connections: usize,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
    #[serde(default, deserialize_with = "flag")]
    pub use_cluster: bool,
    #[serde(default, deserialize_with = "flag")]
    pub use_replica: bool,
    #[serde(default)]
    pub shards: Vec<String>,
}

impl CacheSection {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

impl ServiceConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&raw)
    }

    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }
}

fn default_connections() -> usize {
    DEFAULT_CONNECTIONS
}

fn default_timeout_ms() -> u64 {
    DEFAULT_TIMEOUT_MS
}

/// Accepts `true`/`false` as well as the `0`/`1` integers older config files use.
fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::Bool(value) => Ok(value),
        serde_json::Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(serde::de::Error::custom(format!(
                "expected 0 or 1, got {}",
                n
            ))),
        },
        serde_json::Value::Null => Ok(false),
        other => Err(serde::de::Error::custom(format!(
            "expected boolean or 0/1, got {}",
            other
        ))),
    }
}
