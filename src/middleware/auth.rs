//! Verification token middleware
//!
//! Extractor that validates the bearer verification token on gated endpoints.

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use std::sync::Arc;

use crate::error::ApiError;
use crate::verification::{VerificationClaims, VerificationKeys};

/// Claims of a valid verification token from the Authorization header
///
/// Handlers still have to run [`crate::verification::check_binding`] against
/// the identity in their request body.
///
/// # Example
///
/// ```rust,ignore
/// async fn gated_handler(VerifiedToken(claims): VerifiedToken) -> impl IntoResponse {
///     format!("Hello, {}", claims.email)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct VerifiedToken(pub VerificationClaims);

#[async_trait]
impl<S> FromRequestParts<S> for VerifiedToken
where
    Arc<VerificationKeys>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        // missing header is reported exactly like a bad token
        let TypedHeader(Authorization(bearer)) =
            TypedHeader::<Authorization<Bearer>>::from_request_parts(parts, state)
                .await
                .map_err(|_| ApiError::InvalidToken)?;

        let keys = Arc::<VerificationKeys>::from_ref(state);

        let claims = keys.verify(bearer.token()).map_err(|_| {
            tracing::debug!("Rejected verification token");
            ApiError::InvalidToken
        })?;

        Ok(VerifiedToken(claims))
    }
}
