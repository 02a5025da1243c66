//! Middleware for the waitlist API
//!
//! This module provides middleware for request tracing, rate limiting,
//! security headers, verification token extraction and JSON bodies.

pub mod auth;
mod json;
mod rate_limiter;
mod security;
mod tracing;

pub use self::auth::VerifiedToken;
pub use self::json::ApiJson;
pub use self::rate_limiter::{client_ip, enforce_rate_limit, ClientRateLimit};
pub use self::security::{hsts_header, security_headers};
pub use self::tracing::request_tracing;
