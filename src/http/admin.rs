//! Rate limit management endpoints.
//!
//! Mounted under [`ADMIN_BASE_PATH`] only when `rate_limit.management.enabled`
//! is set. There is no authentication on these routes.

use axum::extract::State;
use axum::routing::{get, post};
use axum::Router;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

use super::response::ApiResponse;
use crate::ratelimit::{RateLimitConfig, RateLimitProperties, RateLimiter};

/// Base path of the management endpoints.
pub const ADMIN_BASE_PATH: &str = "/api/v1/admin/rate-limit";

const RESET_MESSAGE: &str = "All rate limiting buckets have been cleared";

/// Payload of `GET /stats`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStats {
    pub enabled: bool,
    pub active_buckets: usize,
    pub global_config: RateLimitConfig,
    pub endpoint_configs: BTreeMap<String, RateLimitConfig>,
}

/// Payload of `GET /status`.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RateLimitStatus {
    pub enabled: bool,
    pub global_enabled: bool,
    pub endpoint_count: usize,
}

/// Build the management router, relative to [`ADMIN_BASE_PATH`].
pub fn router(limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        .route("/config", get(get_config))
        .route("/stats", get(get_stats))
        .route("/status", get(get_status))
        .route("/reset", post(reset))
        .with_state(limiter)
}

async fn get_config(State(limiter): State<Arc<RateLimiter>>) -> ApiResponse<RateLimitProperties> {
    debug!("Retrieving rate limiting configuration");
    ApiResponse::handled(limiter.registry().properties().clone())
}

async fn get_stats(State(limiter): State<Arc<RateLimiter>>) -> ApiResponse<RateLimitStats> {
    debug!("Retrieving rate limiting statistics");
    let properties = limiter.registry().properties();

    ApiResponse::handled(RateLimitStats {
        enabled: properties.enabled,
        active_buckets: limiter.bucket_count(),
        global_config: properties.global.clone(),
        endpoint_configs: properties.endpoints.clone(),
    })
}

async fn get_status(State(limiter): State<Arc<RateLimiter>>) -> ApiResponse<RateLimitStatus> {
    let registry = limiter.registry();

    ApiResponse::handled(RateLimitStatus {
        enabled: registry.is_enabled(),
        global_enabled: registry.global().enabled,
        endpoint_count: registry.endpoint_count(),
    })
}

async fn reset(State(limiter): State<Arc<RateLimiter>>) -> ApiResponse<&'static str> {
    info!("Resetting all rate limiting buckets");
    limiter.clear();
    ApiResponse::handled(RESET_MESSAGE)
}
