//! Rate limiting middleware.
//!
//! Runs ahead of every routed handler. Denied requests are answered with a
//! 429 and never reach the handler.

use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::debug;

use crate::ratelimit::RateLimiter;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";
pub const X_REAL_IP: &str = "x-real-ip";

/// Client identity used when neither headers nor a peer address are available.
const UNKNOWN_CLIENT: &str = "unknown";

/// The body of a 429 response: `{"status":"error","message":...,"code":429}`.
#[derive(Debug, Clone, Serialize)]
pub struct RateLimitExceeded {
    pub status: &'static str,
    pub message: String,
    pub code: u16,
}

impl RateLimitExceeded {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            message: message.into(),
            code: StatusCode::TOO_MANY_REQUESTS.as_u16(),
        }
    }
}

impl IntoResponse for RateLimitExceeded {
    fn into_response(self) -> Response {
        (StatusCode::TOO_MANY_REQUESTS, Json(self)).into_response()
    }
}

/// Work out who is calling.
///
/// Precedence: first `X-Forwarded-For` entry, then `X-Real-IP`, then the peer
/// address. Both headers are client-controlled, so limits are only as strong
/// as the edge proxy that sets them.
pub fn client_identifier(headers: &HeaderMap, remote: Option<SocketAddr>) -> String {
    if let Some(forwarded) = header_value(headers, X_FORWARDED_FOR) {
        let first = forwarded.split(',').next().unwrap_or(forwarded).trim();
        if !first.is_empty() {
            return first.to_string();
        }
    }

    if let Some(real_ip) = header_value(headers, X_REAL_IP) {
        return real_ip.to_string();
    }

    remote
        .map(|addr| addr.ip().to_string())
        .unwrap_or_else(|| UNKNOWN_CLIENT.to_string())
}

fn header_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
}

/// Admit or reject a request before it reaches its handler.
pub async fn rate_limit_middleware(
    State(limiter): State<Arc<RateLimiter>>,
    request: Request,
    next: Next,
) -> Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);
    let client_id = client_identifier(request.headers(), remote);
    let path = request.uri().path().to_string();

    debug!(client = %client_id, path = %path, "Processing rate limit check");

    let admission = limiter.admit(&client_id, &path);
    if !admission.allowed {
        debug!(client = %client_id, path = %path, "Rejecting request with 429");
        return RateLimitExceeded::new(admission.message).into_response();
    }

    next.run(request).await
}
