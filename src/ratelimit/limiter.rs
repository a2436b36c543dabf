//! Admission control.

use tracing::{debug, warn};

use super::key::BucketKey;
use super::registry::RateLimitRegistry;
use super::rules::RateLimitProperties;
use super::store::BucketStore;

/// Outcome of a single admission check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    /// Whether the request may proceed
    pub allowed: bool,
    /// The scope's denial message, empty when admission control was bypassed
    pub message: String,
}

impl Admission {
    fn bypass() -> Self {
        Self {
            allowed: true,
            message: String::new(),
        }
    }
}

/// The rate limiter that decides whether a request is admitted.
///
/// This struct is thread-safe and is shared across all request handlers.
#[derive(Debug, Default)]
pub struct RateLimiter {
    /// Scope resolution
    registry: RateLimitRegistry,
    /// Token buckets indexed by client, path and scope shape
    store: BucketStore,
}

impl RateLimiter {
    /// Create a rate limiter for the given configuration.
    pub fn new(properties: RateLimitProperties) -> Self {
        Self {
            registry: RateLimitRegistry::new(properties),
            store: BucketStore::new(),
        }
    }

    /// Decide whether a request from `client_id` to `path` is admitted,
    /// consuming one token when it is.
    pub fn admit(&self, client_id: &str, path: &str) -> Admission {
        if !self.registry.is_enabled() {
            return Admission::bypass();
        }

        let config = self.registry.resolve(path);
        if !config.enabled {
            return Admission::bypass();
        }

        let key = BucketKey::new(client_id, path, config);
        let bucket = self.store.get_or_create(&key, config);
        let allowed = bucket.try_consume(1);

        if allowed {
            debug!(
                client = %client_id,
                path = %path,
                remaining = bucket.available_tokens(),
                "Request allowed"
            );
        } else {
            warn!(client = %client_id, path = %path, "Rate limit exceeded");
        }

        Admission {
            allowed,
            message: config.error_message.clone(),
        }
    }

    /// Get the scope registry.
    pub fn registry(&self) -> &RateLimitRegistry {
        &self.registry
    }

    /// Clear all buckets, restoring every client's full quota.
    pub fn clear(&self) {
        self.store.clear_all();
    }

    /// Get the number of active buckets.
    pub fn bucket_count(&self) -> usize {
        self.store.count()
    }
}
