//! Centralized API error handling
//!
//! This module provides a unified error type for API responses with proper
//! HTTP status code mapping and JSON error responses.

use axum::{
    extract::rejection::JsonRejection,
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::mail::MailError;
use crate::verification::{field_violations, FieldViolation, VerificationError};
use crate::waitlist::DirectoryError;

/// Message returned for every rejected verification token
pub const INVALID_TOKEN_MESSAGE: &str = "Invalid or expired verification token";

/// API error type with HTTP status code mapping
#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("Invalid input")]
    ValidationError(Vec<FieldViolation>),

    /// Never says why the token was rejected.
    #[error("Invalid or expired verification token")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(String),

    #[error("Verification token does not match the request")]
    BindingMismatch,

    #[error("{0}")]
    Conflict(String),

    #[error("Too many requests from this IP, please try again later.")]
    TooManyRequests { retry_after_secs: u64 },

    #[error("Internal server error: {0}")]
    InternalError(String),

    #[error("External service error: {0}")]
    ExternalServiceError(String),
}

/// JSON error response body
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: ErrorDetails,
}

/// Error details in the response
#[derive(Serialize)]
pub struct ErrorDetails {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldViolation>>,
}

impl ApiError {
    /// Get the error code string
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError(_) => "VALIDATION_ERROR",
            ApiError::InvalidToken => "INVALID_TOKEN",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::BindingMismatch => "BINDING_MISMATCH",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::TooManyRequests { .. } => "TOO_MANY_REQUESTS",
            ApiError::InternalError(_) => "INTERNAL_ERROR",
            ApiError::ExternalServiceError(_) => "EXTERNAL_SERVICE_ERROR",
        }
    }

    /// Get the HTTP status code
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::ValidationError(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::BindingMismatch => StatusCode::FORBIDDEN,
            ApiError::Conflict(_) => StatusCode::CONFLICT,
            ApiError::TooManyRequests { .. } => StatusCode::TOO_MANY_REQUESTS,
            ApiError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::ExternalServiceError(_) => StatusCode::BAD_GATEWAY,
        }
    }

    /// Message safe to send to the client
    fn public_message(&self) -> String {
        match self {
            // upstream error text stays in the logs
            ApiError::InternalError(_) => "Internal server error".to_string(),
            ApiError::ExternalServiceError(_) => "Upstream service failed".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        // Log server errors
        match &self {
            ApiError::InternalError(_) | ApiError::ExternalServiceError(_) => {
                tracing::error!(error = %self, code = %error_code, "Server error occurred");
            }
            _ => {
                tracing::debug!(error = %self, code = %error_code, "Client error occurred");
            }
        }

        let retry_after = match &self {
            ApiError::TooManyRequests { retry_after_secs } => Some(*retry_after_secs),
            _ => None,
        };

        let message = self.public_message();
        let details = match self {
            ApiError::ValidationError(violations) => Some(violations),
            _ => None,
        };

        let body = ErrorResponse {
            error: ErrorDetails {
                code: error_code.to_string(),
                message,
                details,
            },
        };

        let mut response = (status, Json(body)).into_response();
        if let Some(secs) = retry_after {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(secs));
        }
        response
    }
}

// Convenience conversions from domain error types

impl From<VerificationError> for ApiError {
    fn from(err: VerificationError) -> Self {
        match err {
            VerificationError::Validation(violations) => ApiError::ValidationError(violations),
            VerificationError::SigningFailure => {
                ApiError::InternalError("Failed to generate verification token".to_string())
            }
            VerificationError::InvalidToken => ApiError::InvalidToken,
            VerificationError::BindingMismatch => ApiError::BindingMismatch,
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::ValidationError(field_violations(&err))
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let violation = |message: String| {
            ApiError::ValidationError(vec![FieldViolation {
                field: "body".to_string(),
                message,
            }])
        };

        match rejection {
            // wrong JSON types for a field
            JsonRejection::JsonDataError(e) => violation(e.body_text()),
            JsonRejection::JsonSyntaxError(_) => violation("Malformed JSON body".to_string()),
            other => ApiError::BadRequest(other.body_text()),
        }
    }
}

impl From<DirectoryError> for ApiError {
    fn from(err: DirectoryError) -> Self {
        ApiError::ExternalServiceError(err.to_string())
    }
}

impl From<MailError> for ApiError {
    fn from(err: MailError) -> Self {
        ApiError::ExternalServiceError(err.to_string())
    }
}
