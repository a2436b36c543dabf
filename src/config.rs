//! Configuration management for Tollgate.
//!
//! Configuration is layered: built-in defaults, then an optional YAML file,
//! then `TOLLGATE__`-prefixed environment variables, e.g.
//! `TOLLGATE__RATE_LIMIT__GLOBAL__CAPACITY=20`.
//!
//! The file is read with `serde_yaml` so key case survives (`refillTokens`,
//! `/API/V1/**`). Environment keys arrive lowercased from the `config` crate
//! and replace the file entry whose name differs only in case or underscores.

use config::{Environment, Source};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::net::SocketAddr;
use std::path::Path;
use tracing::{debug, info};

use crate::error::{Result, TollgateError};
use crate::ratelimit::RateLimitProperties;

/// Main configuration for the Tollgate service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,

    /// Rate limiting configuration
    #[serde(default)]
    pub rate_limit: RateLimitProperties,
}

/// Server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server address
    #[serde(default = "default_http_addr")]
    pub http_addr: SocketAddr,

    /// Number of employees generated into the backend at startup
    #[serde(default = "default_seed_employees")]
    pub seed_employees: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            http_addr: default_http_addr(),
            seed_employees: default_seed_employees(),
        }
    }
}

const ENV_PREFIX: &str = "TOLLGATE";

fn default_http_addr() -> SocketAddr {
    SocketAddr::from(([127, 0, 0, 1], 8112))
}

fn default_seed_employees() -> usize {
    50
}

impl AppConfig {
    /// Load configuration from an optional file plus environment overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, environment())
    }

    fn load_with_env(path: Option<&Path>, env: Environment) -> Result<Self> {
        let mut document = match path {
            Some(path) => {
                info!(path = %path.display(), "Loading configuration file");
                let contents = std::fs::read_to_string(path)?;
                serde_yaml::from_str::<Value>(&contents).map_err(|e| {
                    TollgateError::Config(format!("Failed to parse {}: {}", path.display(), e))
                })?
            }
            None => Value::Null,
        };
        if document.is_null() {
            document = Value::Object(Map::new());
        }

        let mut overrides: Vec<_> = env.collect()?.into_iter().collect();
        overrides.sort_by(|(a, _), (b, _)| a.cmp(b));
        for (key, value) in overrides {
            debug!(key = %key, "Applying environment override");
            apply_override(&mut document, &key, value.try_deserialize()?);
        }

        let config: AppConfig = serde_json::from_value(document)
            .map_err(|e| TollgateError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: AppConfig = serde_yaml::from_str(yaml)
            .map_err(|e| TollgateError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration for values that cannot be served.
    pub fn validate(&self) -> Result<()> {
        self.rate_limit.validate()
    }
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

/// Set a dotted `key` in `document`, creating intermediate tables as needed.
fn apply_override(document: &mut Value, key: &str, value: Value) {
    let mut parts: Vec<&str> = key.split('.').collect();
    let Some(leaf) = parts.pop() else {
        return;
    };

    let mut node = document;
    for part in parts {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(object) = node else {
            return;
        };
        let name = matching_key(object, part).unwrap_or_else(|| part.to_string());
        node = object
            .entry(name)
            .or_insert_with(|| Value::Object(Map::new()));
    }

    if !node.is_object() {
        *node = Value::Object(Map::new());
    }
    if let Value::Object(object) = node {
        if let Some(existing) = matching_key(object, leaf) {
            object.remove(&existing);
        }
        object.insert(leaf.to_string(), value);
    }
}

fn matching_key(object: &Map<String, Value>, name: &str) -> Option<String> {
    let wanted = normalize_key(name);
    object.keys().find(|k| normalize_key(k) == wanted).cloned()
}

fn normalize_key(key: &str) -> String {
    key.chars()
        .filter(|c| *c != '_' && *c != '-')
        .map(|c| c.to_ascii_lowercase())
        .collect()
}
