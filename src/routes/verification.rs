//! Verification token routes

use axum::{routing::post, Router};

use crate::handlers::verification;
use crate::state::AppState;

/// Create verification token routes
pub fn verification_routes() -> Router<AppState> {
    Router::new().route(
        "/api/verify-cdp",
        post(verification::issue_verification_token),
    )
}
