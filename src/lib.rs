//! Tollgate - Per-client HTTP Rate Limiting
//!
//! This crate implements token-bucket rate limiting for an HTTP API. Each
//! client gets an independent bucket per request path, sized by the most
//! specific configured path pattern or by the global defaults.

pub mod config;
pub mod employee;
pub mod error;
pub mod http;
pub mod ratelimit;
