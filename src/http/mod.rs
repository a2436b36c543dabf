//! HTTP surface: rate limiting middleware, management endpoints and the server.

pub mod admin;
mod interceptor;
mod response;
mod server;

pub use interceptor::{
    client_identifier, rate_limit_middleware, RateLimitExceeded, X_FORWARDED_FOR, X_REAL_IP,
};
pub use response::{ApiResponse, ErrorResponse};
pub use server::{build_router, HttpServer};
