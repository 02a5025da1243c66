//! Waitlist HTTP handlers

use axum::{extract::State, Json};
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::{ApiJson, VerifiedToken};
use crate::models::{CheckEmailRequest, CheckEmailResponse, JoinWaitlistRequest, SuccessResponse};
use crate::state::AppState;
use crate::verification::check_binding;
use crate::waitlist::WaitlistEntry;

/// POST /api/check-email - Report whether an email is already on the waitlist
pub async fn check_email(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CheckEmailRequest>,
) -> Result<Json<CheckEmailResponse>, ApiError> {
    let email = req
        .email
        .filter(|e| !e.trim().is_empty())
        .ok_or_else(|| ApiError::BadRequest("Email is required".to_string()))?;

    let count = state.directory.count_by_email(&email).await?;

    Ok(Json(CheckEmailResponse {
        exists: count > 0,
        count,
    }))
}

/// POST /api/notion - Record a verified signup
pub async fn join_waitlist(
    State(state): State<AppState>,
    VerifiedToken(claims): VerifiedToken,
    ApiJson(req): ApiJson<JoinWaitlistRequest>,
) -> Result<Json<SuccessResponse>, ApiError> {
    req.validate()?;
    let requested = WaitlistEntry::from(req);
    check_binding(&claims, &requested.email, requested.wallet_address.as_deref())?;

    // store the identity that passed OTP, not the request's spelling of it
    let entry = WaitlistEntry {
        email: claims.email,
        name: requested.name,
        wallet_address: Some(claims.wallet_address),
    };

    if state.directory.count_by_email(&entry.email).await? > 0 {
        return Err(ApiError::Conflict(
            "Email already exists in waitlist".to_string(),
        ));
    }

    let directory_id = state.directory.create_entry(&entry).await?;
    tracing::info!(directory_id = %directory_id, "Added signup to waitlist");

    if let Some(archive) = &state.archive {
        // the directory is the system of record
        if let Err(e) = archive.record(&entry, &directory_id).await {
            tracing::warn!(error = %e, "Signup archive write failed (optional)");
        }
    }

    Ok(Json(SuccessResponse { success: true }))
}
