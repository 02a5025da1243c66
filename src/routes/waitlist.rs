//! Waitlist routes

use axum::{routing::post, Router};

use crate::handlers::waitlist;
use crate::state::AppState;

/// Create waitlist routes
pub fn waitlist_routes() -> Router<AppState> {
    Router::new()
        .route("/api/check-email", post(waitlist::check_email))
        .route("/api/notion", post(waitlist::join_waitlist))
}
