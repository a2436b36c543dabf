//! Concurrent bucket storage.

use dashmap::DashMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::bucket::TokenBucket;
use super::key::BucketKey;
use super::rules::RateLimitConfig;

/// A concurrent map from bucket key to token bucket.
///
/// Buckets are created lazily on first access and live until [`clear_all`](Self::clear_all).
#[derive(Debug, Default)]
pub struct BucketStore {
    buckets: DashMap<BucketKey, Arc<TokenBucket>>,
}

impl BucketStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the bucket for `key`, creating it from `config` if absent.
    ///
    /// Concurrent callers racing on a new key all receive the same bucket.
    pub fn get_or_create(&self, key: &BucketKey, config: &RateLimitConfig) -> Arc<TokenBucket> {
        if let Some(bucket) = self.buckets.get(key) {
            return Arc::clone(bucket.value());
        }

        let bucket = self.buckets.entry(key.clone()).or_insert_with(|| {
            debug!(
                key = %key,
                capacity = config.capacity,
                refill_tokens = config.refill_tokens,
                refill_period = ?config.refill_period,
                "Creating new rate limit bucket"
            );
            Arc::new(TokenBucket::from_config(config))
        });
        Arc::clone(bucket.value())
    }

    /// Remove every bucket.
    ///
    /// Requests arriving concurrently may recreate buckets immediately.
    pub fn clear_all(&self) {
        self.buckets.clear();
        info!("All rate limit buckets cleared");
    }

    /// Get the number of tracked buckets.
    pub fn count(&self) -> usize {
        self.buckets.len()
    }
}
