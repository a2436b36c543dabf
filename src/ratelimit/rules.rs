//! Rate limit rules configuration.
//!
//! A rules document has a global kill-switch, one global scope, and any number
//! of endpoint scopes keyed by Ant-style path pattern. Each scope describes the
//! shape of the token buckets created under it.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use tracing::info;

use super::period::serde_period;
use crate::error::{Result, TollgateError};

const DEFAULT_CAPACITY: u64 = 10;
const DEFAULT_REFILL_TOKENS: u64 = 10;
const DEFAULT_REFILL_PERIOD: Duration = Duration::from_secs(60);
const DEFAULT_ERROR_MESSAGE: &str = "Rate limit exceeded. Please try again later.";

/// The shape of one rate limit scope.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitConfig {
    /// Maximum tokens a bucket can hold
    #[serde(default = "default_capacity")]
    pub capacity: u64,
    /// Tokens added each time a refill period elapses
    #[serde(default = "default_refill_tokens", alias = "refill_tokens")]
    pub refill_tokens: u64,
    /// Interval between refills
    #[serde(
        default = "default_refill_period",
        alias = "refill_period",
        with = "serde_period"
    )]
    pub refill_period: Duration,
    /// When false, requests in this scope bypass admission control
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Message returned to denied callers
    #[serde(default = "default_error_message", alias = "error_message")]
    pub error_message: String,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            refill_tokens: default_refill_tokens(),
            refill_period: default_refill_period(),
            enabled: true,
            error_message: default_error_message(),
        }
    }
}

impl RateLimitConfig {
    /// Create an enabled scope with the default error message.
    pub fn new(capacity: u64, refill_tokens: u64, refill_period: Duration) -> Self {
        Self {
            capacity,
            refill_tokens,
            refill_period,
            ..Self::default()
        }
    }

    /// Replace the error message.
    pub fn with_error_message(mut self, message: impl Into<String>) -> Self {
        self.error_message = message.into();
        self
    }

    /// Enable or disable the scope.
    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Reject shapes that would produce a bucket that can never admit or refill.
    ///
    /// `capacity >= refill_tokens` is intentionally not required.
    pub fn validate(&self, scope: &str) -> Result<()> {
        if self.capacity == 0 {
            return Err(invalid_scope(scope, "capacity must be greater than zero"));
        }
        if self.refill_tokens == 0 {
            return Err(invalid_scope(scope, "refillTokens must be greater than zero"));
        }
        if self.refill_period.is_zero() {
            return Err(invalid_scope(scope, "refillPeriod must be greater than zero"));
        }
        Ok(())
    }
}

fn invalid_scope(scope: &str, reason: &str) -> TollgateError {
    TollgateError::Config(format!("rate limit scope '{}': {}", scope, reason))
}

/// Settings for the rate limit management endpoints.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManagementConfig {
    /// Mount the admin endpoints
    #[serde(default)]
    pub enabled: bool,
}

/// The complete rate limiting configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitProperties {
    /// Global kill-switch; when false every request is admitted
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Scope applied when no endpoint pattern matches
    #[serde(default)]
    pub global: RateLimitConfig,
    /// Endpoint scopes keyed by path pattern
    #[serde(default)]
    pub endpoints: BTreeMap<String, RateLimitConfig>,
    /// Admin surface settings
    #[serde(default)]
    pub management: ManagementConfig,
}

impl Default for RateLimitProperties {
    fn default() -> Self {
        Self {
            enabled: true,
            global: RateLimitConfig::default(),
            endpoints: BTreeMap::new(),
            management: ManagementConfig::default(),
        }
    }
}

impl RateLimitProperties {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load rules from a YAML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!(path = %path.display(), "Loading rate limit rules");

        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Load rules from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let properties: RateLimitProperties = serde_yaml::from_str(yaml).map_err(|e| {
            TollgateError::Config(format!("Failed to parse rate limit rules: {}", e))
        })?;
        properties.validate()?;
        Ok(properties)
    }

    /// Add or replace an endpoint scope.
    pub fn with_endpoint(mut self, pattern: impl Into<String>, config: RateLimitConfig) -> Self {
        self.endpoints.insert(pattern.into(), config);
        self
    }

    /// Validate every scope and pattern.
    pub fn validate(&self) -> Result<()> {
        self.global.validate("global")?;
        for (pattern, config) in &self.endpoints {
            if !pattern.starts_with('/') {
                return Err(TollgateError::Config(format!(
                    "endpoint pattern '{}' must start with '/'",
                    pattern
                )));
            }
            config.validate(pattern)?;
        }
        Ok(())
    }
}

fn default_true() -> bool {
    true
}

fn default_capacity() -> u64 {
    DEFAULT_CAPACITY
}

fn default_refill_tokens() -> u64 {
    DEFAULT_REFILL_TOKENS
}

fn default_refill_period() -> Duration {
    DEFAULT_REFILL_PERIOD
}

fn default_error_message() -> String {
    DEFAULT_ERROR_MESSAGE.to_string()
}
