//! Email Wallets Waitlist Backend Library
//!
//! Verification token gate, rate limiting and waitlist endpoints for the
//! Email Wallets landing page.

pub mod config;
pub mod db;
pub mod error;
pub mod handlers;
pub mod mail;
pub mod middleware;
pub mod models;
pub mod rate_limit;
pub mod routes;
pub mod state;
pub mod verification;
pub mod waitlist;

use axum::{routing::get, Router};

use middleware::ClientRateLimit;
use state::AppState;

/// Assemble the API router with its request middleware
pub fn build_router(app_state: AppState, mail_rate_limit: ClientRateLimit) -> Router {
    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .merge(routes::verification_routes())
        .merge(routes::waitlist_routes())
        .merge(routes::mail_routes(mail_rate_limit))
        .with_state(app_state)
        .layer(axum::middleware::from_fn(middleware::security_headers))
        .layer(axum::middleware::from_fn(middleware::request_tracing))
}
