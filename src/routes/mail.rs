//! Welcome email routes

use axum::{middleware::from_fn_with_state, routing::post, Router};

use crate::handlers::mail;
use crate::middleware::{enforce_rate_limit, ClientRateLimit};
use crate::state::AppState;

/// Create welcome email routes, rate limited per client IP
pub fn mail_routes(rate_limit: ClientRateLimit) -> Router<AppState> {
    Router::new()
        .route("/api/mail", post(mail::send_welcome_email))
        .route_layer(from_fn_with_state(rate_limit, enforce_rate_limit))
}
