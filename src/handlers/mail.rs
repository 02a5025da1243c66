//! Welcome email HTTP handler

use axum::{extract::State, Json};
use validator::Validate;

use crate::error::ApiError;
use crate::middleware::{ApiJson, VerifiedToken};
use crate::models::{MessageResponse, SendWelcomeRequest};
use crate::state::AppState;
use crate::verification::check_binding;

/// POST /api/mail - Send the welcome email to a verified address
pub async fn send_welcome_email(
    State(state): State<AppState>,
    VerifiedToken(claims): VerifiedToken,
    ApiJson(req): ApiJson<SendWelcomeRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    req.validate()?;
    check_binding(&claims, &req.email, None)?;

    state
        .mailer
        .send_welcome(&req.email, req.firstname.as_deref())
        .await?;

    Ok(Json(MessageResponse {
        message: "Email sent successfully".to_string(),
    }))
}
