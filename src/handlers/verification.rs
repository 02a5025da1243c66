//! Verification token HTTP handlers
//!
//! Mints the token a client presents after completing OTP verification.

use axum::{
    extract::State,
    http::{header, HeaderMap},
    Json,
};

use crate::error::ApiError;
use crate::middleware::ApiJson;
use crate::models::IssueTokenResponse;
use crate::state::AppState;
use crate::verification::VerificationSubject;

/// POST /api/verify-cdp - Issue a verification token for an (email, wallet) pair
pub async fn issue_verification_token(
    State(state): State<AppState>,
    headers: HeaderMap,
    ApiJson(subject): ApiJson<VerificationSubject>,
) -> Result<Json<IssueTokenResponse>, ApiError> {
    let origin = headers
        .get(header::ORIGIN)
        .and_then(|v| v.to_str().ok());

    if !origin_allowed(origin, &state.allowed_origins) {
        tracing::warn!(origin = ?origin, "Rejected token request from unknown origin");
        return Err(ApiError::Forbidden("Unauthorized origin".to_string()));
    }

    let issued = state.verification_keys.issue(&subject)?;

    tracing::info!(expires_at = issued.claims.exp, "Issued verification token");

    Ok(Json(IssueTokenResponse {
        success: true,
        token: issued.token,
        expires_in: issued.expires_in,
    }))
}

/// Origin header must contain one of the allowed fragments
pub fn origin_allowed(origin: Option<&str>, allowed: &[String]) -> bool {
    origin.is_some_and(|o| allowed.iter().any(|fragment| o.contains(fragment.as_str())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn allowed() -> Vec<String> {
        vec!["emailwallets.com".to_string(), "localhost".to_string()]
    }

    #[test]
    fn test_origin_allowed() {
        assert!(origin_allowed(Some("https://emailwallets.com"), &allowed()));
        assert!(origin_allowed(Some("http://localhost:3000"), &allowed()));
        assert!(!origin_allowed(Some("https://evil.example"), &allowed()));
        assert!(!origin_allowed(None, &allowed()));
        assert!(!origin_allowed(Some("https://emailwallets.com"), &[]));
    }
}
