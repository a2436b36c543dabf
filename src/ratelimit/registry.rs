//! Resolution of request paths to rate limit scopes.

use tracing::trace;

use super::pattern::PathPattern;
use super::rules::{RateLimitConfig, RateLimitProperties};

/// Resolves a request path to the rate limit scope that governs it.
///
/// Endpoint patterns are ordered once, most specific first, so resolution is
/// deterministic regardless of how the configuration map was built.
#[derive(Debug, Clone)]
pub struct RateLimitRegistry {
    properties: RateLimitProperties,
    /// Compiled endpoint patterns in resolution order
    endpoints: Vec<(PathPattern, RateLimitConfig)>,
}

impl RateLimitRegistry {
    /// Build a registry from the rate limiting configuration.
    pub fn new(properties: RateLimitProperties) -> Self {
        let mut endpoints: Vec<(PathPattern, RateLimitConfig)> = properties
            .endpoints
            .iter()
            .map(|(pattern, config)| (PathPattern::new(pattern), config.clone()))
            .collect();
        endpoints.sort_by(|(a, _), (b, _)| a.specificity_cmp(b));

        Self {
            properties,
            endpoints,
        }
    }

    /// Whether rate limiting is enabled at all.
    pub fn is_enabled(&self) -> bool {
        self.properties.enabled
    }

    /// The global fallback scope.
    pub fn global(&self) -> &RateLimitConfig {
        &self.properties.global
    }

    /// The configuration this registry was built from.
    pub fn properties(&self) -> &RateLimitProperties {
        &self.properties
    }

    /// Number of endpoint scopes.
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.len()
    }

    /// Endpoint patterns in the order they are tried.
    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.endpoints.iter().map(|(pattern, _)| pattern.as_str())
    }

    /// Find the scope for a request path: the first matching endpoint pattern,
    /// or the global scope.
    pub fn resolve(&self, path: &str) -> &RateLimitConfig {
        for (pattern, config) in &self.endpoints {
            if pattern.matches(path) {
                trace!(path = %path, pattern = %pattern, "Using endpoint-specific rate limit");
                return config;
            }
        }

        trace!(path = %path, "Using global rate limit");
        &self.properties.global
    }

    /// The denial message for a request path.
    pub fn error_message(&self, path: &str) -> &str {
        &self.resolve(path).error_message
    }
}

impl Default for RateLimitRegistry {
    fn default() -> Self {
        Self::new(RateLimitProperties::default())
    }
}
