//! Rate limiting logic and state management.

mod bucket;
mod key;
mod limiter;
mod pattern;
pub mod period;
mod registry;
mod rules;
mod store;

pub use bucket::TokenBucket;
pub use key::BucketKey;
pub use limiter::{Admission, RateLimiter};
pub use pattern::PathPattern;
pub use registry::RateLimitRegistry;
pub use rules::{ManagementConfig, RateLimitConfig, RateLimitProperties};
pub use store::BucketStore;
