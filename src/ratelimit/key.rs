//! Bucket key generation.

use std::time::Duration;

use super::period::format_period;
use super::rules::RateLimitConfig;

/// A key that uniquely identifies a token bucket.
///
/// The key is composed of the client identity, the raw request path and the
/// bucket shape. Changing a scope's shape therefore yields a fresh bucket.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct BucketKey {
    /// The client this bucket belongs to
    pub client_id: String,
    /// The request path, without query string
    pub path: String,
    /// Bucket capacity
    pub capacity: u64,
    /// Tokens per refill
    pub refill_tokens: u64,
    /// Refill interval
    pub refill_period: Duration,
}

impl BucketKey {
    /// Create a bucket key for a client, path and scope.
    pub fn new(client_id: &str, path: &str, config: &RateLimitConfig) -> Self {
        Self {
            client_id: client_id.to_string(),
            path: path.to_string(),
            capacity: config.capacity,
            refill_tokens: config.refill_tokens,
            refill_period: config.refill_period,
        }
    }

    /// Convert the bucket key to a string representation.
    ///
    /// This is useful for logging and debugging.
    pub fn to_string_key(&self) -> String {
        format!(
            "{}:{}:{}:{}:{}",
            self.client_id,
            self.path,
            self.capacity,
            self.refill_tokens,
            format_period(self.refill_period)
        )
    }
}

impl std::fmt::Display for BucketKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_string_key())
    }
}
