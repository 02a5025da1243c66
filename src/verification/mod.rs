//! Verification token gate
//!
//! Binds an out-of-band OTP confirmation to later privileged requests.
//! - Short-lived HS256 tokens asserting a verified (email, wallet) pair
//! - Undifferentiated rejection of any invalid token
//! - Binding checks against the identity a request claims

mod binding;
mod token;

use serde::Serialize;
use thiserror::Error;
use validator::ValidationErrors;

pub use binding::check_binding;
pub use token::{
    IssuedToken, VerificationClaims, VerificationKeys, VerificationSubject, TOKEN_TTL_SECONDS,
};

/// A single rejected request field
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Verification gate errors
#[derive(Error, Debug)]
pub enum VerificationError {
    #[error("Invalid input")]
    Validation(Vec<FieldViolation>),

    #[error("Failed to generate verification token")]
    SigningFailure,

    /// Covers malformed, forged and expired tokens alike.
    #[error("Invalid or expired verification token")]
    InvalidToken,

    #[error("Verification token does not match the request")]
    BindingMismatch,
}

impl From<ValidationErrors> for VerificationError {
    fn from(errors: ValidationErrors) -> Self {
        VerificationError::Validation(field_violations(&errors))
    }
}

/// Flatten validator output into a stable, field-sorted list
pub fn field_violations(errors: &ValidationErrors) -> Vec<FieldViolation> {
    let mut violations: Vec<FieldViolation> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| FieldViolation {
                field: field.to_string(),
                message: e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string()),
            })
        })
        .collect();

    violations.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.message.cmp(&b.message)));
    violations
}
