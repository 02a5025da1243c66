//! Service health handlers

use axum::{extract::State, Json};
use serde::Serialize;

use crate::db;
use crate::state::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: String,
    pub version: String,
}

/// GET / - Service banner
pub async fn root() -> &'static str {
    "Email Wallets Waitlist API Server"
}

/// GET /health - Liveness plus optional database status
///
/// An unreachable database reports `degraded`.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let (status, database) = match &state.db_pool {
        None => ("healthy", "not configured".to_string()),
        Some(pool) => match db::check_health(pool).await {
            Ok(()) => ("healthy", "connected".to_string()),
            Err(e) => ("degraded", format!("error: {}", e)),
        },
    };

    Json(HealthResponse {
        status: status.to_string(),
        database,
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
