//! Token bucket implementation.

use parking_lot::Mutex;
use std::time::{Duration, Instant};

use super::rules::RateLimitConfig;

/// Mutable part of a bucket, guarded as a unit.
#[derive(Debug)]
struct BucketState {
    /// Tokens currently available, never above capacity
    tokens: u64,
    /// Instant the last whole refill interval ended
    last_refill: Instant,
}

/// A token bucket with interval-based refill.
///
/// The bucket starts full. Every time a whole `refill_period` elapses,
/// `refill_tokens` are added, capped at `capacity`. Partial periods add nothing.
#[derive(Debug)]
pub struct TokenBucket {
    capacity: u64,
    refill_tokens: u64,
    refill_period: Duration,
    state: Mutex<BucketState>,
}

impl TokenBucket {
    /// Create a full bucket.
    pub fn new(capacity: u64, refill_tokens: u64, refill_period: Duration) -> Self {
        Self::new_at(capacity, refill_tokens, refill_period, Instant::now())
    }

    /// Create a full bucket whose refill clock starts at `now`.
    pub fn new_at(capacity: u64, refill_tokens: u64, refill_period: Duration, now: Instant) -> Self {
        Self {
            capacity,
            refill_tokens,
            refill_period,
            state: Mutex::new(BucketState {
                tokens: capacity,
                last_refill: now,
            }),
        }
    }

    /// Create a bucket shaped by a scope configuration.
    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, config.refill_tokens, config.refill_period)
    }

    /// Try to take `tokens` from the bucket.
    ///
    /// Returns `false` and leaves the bucket untouched if not enough tokens are
    /// available after applying owed refills.
    pub fn try_consume(&self, tokens: u64) -> bool {
        self.try_consume_at(tokens, Instant::now())
    }

    /// Same as [`try_consume`](Self::try_consume) with an explicit clock reading.
    pub fn try_consume_at(&self, tokens: u64, now: Instant) -> bool {
        let mut state = self.state.lock();
        self.refill(&mut state, now);

        if state.tokens >= tokens {
            state.tokens -= tokens;
            true
        } else {
            false
        }
    }

    /// Tokens available right now.
    pub fn available_tokens(&self) -> u64 {
        self.available_tokens_at(Instant::now())
    }

    /// Tokens available at `now`.
    pub fn available_tokens_at(&self, now: Instant) -> u64 {
        let mut state = self.state.lock();
        self.refill(&mut state, now);
        state.tokens
    }

    /// Get the capacity of this bucket.
    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    /// Get the refill period of this bucket.
    pub fn refill_period(&self) -> Duration {
        self.refill_period
    }

    /// Add tokens for every whole period since `last_refill`.
    ///
    /// `last_refill` advances by whole periods only, so the fractional part of
    /// an interval carries over to the next check.
    fn refill(&self, state: &mut BucketState, now: Instant) {
        let elapsed = now.saturating_duration_since(state.last_refill);
        let period = self.refill_period.as_nanos().max(1);
        let elapsed_nanos = elapsed.as_nanos();

        let intervals = elapsed_nanos / period;
        if intervals == 0 {
            return;
        }

        let added = u64::try_from(intervals)
            .unwrap_or(u64::MAX)
            .saturating_mul(self.refill_tokens);
        state.tokens = state.tokens.saturating_add(added).min(self.capacity);

        let remainder = elapsed_nanos % period;
        let remainder = Duration::new(
            (remainder / 1_000_000_000) as u64,
            (remainder % 1_000_000_000) as u32,
        );
        state.last_refill = now - remainder;
    }
}
