//! HTTP server implementation.

use axum::http::StatusCode;
use axum::middleware::from_fn_with_state;
use axum::response::IntoResponse;
use axum::Router;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{error, info};

use super::admin::{self, ADMIN_BASE_PATH};
use super::interceptor::rate_limit_middleware;
use super::response::ErrorResponse;
use crate::employee::{self, EmployeeStore};
use crate::error::{Result, TollgateError};
use crate::ratelimit::RateLimiter;

/// Assemble the application router.
///
/// The rate limiting middleware wraps every route, including the admin
/// routes and the fallback.
pub fn build_router(limiter: Arc<RateLimiter>, employees: Arc<EmployeeStore>) -> Router {
    let mut router = employee::router(employees);

    if limiter.registry().properties().management.enabled {
        info!(path = ADMIN_BASE_PATH, "Rate limit management endpoints enabled");
        router = router.nest(ADMIN_BASE_PATH, admin::router(Arc::clone(&limiter)));
    }

    router
        .fallback(not_found)
        .layer(from_fn_with_state(limiter, rate_limit_middleware))
}

async fn not_found() -> impl IntoResponse {
    ErrorResponse::new(
        StatusCode::NOT_FOUND,
        "Not found",
        "No route matches the requested path",
    )
}

/// HTTP server for the employee API.
pub struct HttpServer {
    /// Address to bind to
    addr: SocketAddr,
    /// The rate limiter instance
    rate_limiter: Arc<RateLimiter>,
    /// Backing employee data
    employees: Arc<EmployeeStore>,
}

impl HttpServer {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, rate_limiter: Arc<RateLimiter>, employees: Arc<EmployeeStore>) -> Self {
        Self {
            addr,
            rate_limiter,
            employees,
        }
    }

    /// Build the router this server will serve.
    pub fn router(&self) -> Router {
        build_router(Arc::clone(&self.rate_limiter), Arc::clone(&self.employees))
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server will shut down when the provided signal resolves.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;

        info!(
            addr = %listener.local_addr()?,
            "Starting HTTP server with graceful shutdown"
        );

        axum::serve(
            listener,
            router.into_make_service_with_connect_info::<SocketAddr>(),
        )
        .with_graceful_shutdown(signal)
        .await
        .map_err(|e| {
            error!(error = %e, "HTTP server failed");
            TollgateError::Server(e.to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{header::CONTENT_TYPE, Request};
    use std::time::Duration;
    use tower::ServiceExt;

    use crate::ratelimit::{ManagementConfig, RateLimitConfig, RateLimitProperties};

    const CLIENT_HEADER: &str = "x-forwarded-for";

    fn app(management: bool) -> Router {
        let properties = RateLimitProperties {
            global: RateLimitConfig::new(20, 20, Duration::from_secs(60))
                .with_error_message("Global rate limit exceeded"),
            management: ManagementConfig {
                enabled: management,
            },
            ..RateLimitProperties::default()
        }
        .with_endpoint(
            "/api/v1/employee/**",
            RateLimitConfig::new(10, 10, Duration::from_secs(60)),
        );
        build_router(
            Arc::new(RateLimiter::new(properties)),
            Arc::new(EmployeeStore::seeded(3)),
        )
    }

    async fn get(router: &Router, uri: &str, client: &str) -> (StatusCode, Vec<u8>, String) {
        let request = Request::builder()
            .uri(uri)
            .header(CLIENT_HEADER, client)
            .body(Body::empty())
            .unwrap();
        let response = router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, body.to_vec(), content_type)
    }

    async fn post(router: &Router, uri: &str) -> StatusCode {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .body(Body::empty())
            .unwrap();
        router.clone().oneshot(request).await.unwrap().status()
    }

    #[tokio::test]
    async fn test_employee_scope_limits_after_ten_requests() {
        let router = app(false);

        for _ in 0..10 {
            let (status, _, _) = get(&router, "/api/v1/employee", "192.168.1.100").await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body, content_type) = get(&router, "/api/v1/employee", "192.168.1.100").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(content_type, "application/json");

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["status"], "error");
        assert_eq!(json["code"], 429);
        assert_eq!(json["message"], "Rate limit exceeded. Please try again later.");
    }

    #[tokio::test]
    async fn test_not_found_employees_still_count() {
        let router = app(false);

        for _ in 0..10 {
            let (status, _, _) = get(&router, "/api/v1/employee/test-id", "192.168.1.200").await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        let (status, _, _) = get(&router, "/api/v1/employee/test-id", "192.168.1.200").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    }

    #[tokio::test]
    async fn test_unmatched_path_uses_global_scope() {
        let router = app(false);

        for _ in 0..20 {
            let (status, _, _) = get(&router, "/api/v1/other-endpoint", "10.0.0.9").await;
            assert_eq!(status, StatusCode::NOT_FOUND);
        }

        let (status, body, _) = get(&router, "/api/v1/other-endpoint", "10.0.0.9").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Global rate limit exceeded");
    }

    #[tokio::test]
    async fn test_clients_are_limited_independently() {
        let router = app(false);

        for _ in 0..10 {
            get(&router, "/api/v1/employee", "172.16.0.1").await;
        }
        let (status, _, _) = get(&router, "/api/v1/employee", "172.16.0.1").await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        let (status, _, _) = get(&router, "/api/v1/employee", "172.16.0.2").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_admin_status_when_enabled() {
        let router = app(true);

        let (status, body, content_type) =
            get(&router, "/api/v1/admin/rate-limit/status", "127.0.0.1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type, "application/json");

        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["data"]["enabled"], true);
    }

    #[tokio::test]
    async fn test_admin_hidden_when_disabled() {
        let router = app(false);

        let (status, _, _) = get(&router, "/api/v1/admin/rate-limit/status", "127.0.0.1").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_reset_restores_exhausted_client() {
        let router = app(true);
        let client = "192.168.1.300";

        for _ in 0..10 {
            get(&router, "/api/v1/employee", client).await;
        }
        let (status, _, _) = get(&router, "/api/v1/employee", client).await;
        assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);

        assert_eq!(post(&router, "/api/v1/admin/rate-limit/reset").await, StatusCode::OK);

        let (status, _, _) = get(&router, "/api/v1/employee", client).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn test_server_binds_and_shuts_down() {
        let server = HttpServer::new(
            "127.0.0.1:0".parse().unwrap(),
            Arc::new(RateLimiter::default()),
            Arc::new(EmployeeStore::new()),
        );
        server.serve_with_shutdown(async {}).await.unwrap();
    }
}
