// Error types for the sharing and referral API surface.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::services::referral_token::ReferralTokenError;

// =============================================================================
// ERROR TYPES
// =============================================================================

#[derive(Error, Debug)]
pub enum ShareError {
    #[error("Not authorized to share this place")]
    NotAuthorized,

    #[error("Share link not found")]
    NotFound,

    /// Surfaced to external callers identically to NotFound; kept as a
    /// distinct variant for diagnostics and logging.
    #[error("Share link has expired")]
    Expired,

    #[error("Invalid referral token")]
    BadToken,

    #[error("Cannot befriend yourself")]
    SelfReferral,

    #[error("Already connected")]
    AlreadyConnected,

    #[error("Friend request already pending")]
    AlreadyPending,

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Internal server error")]
    InternalError,
}

// =============================================================================
// ERROR CONVERSIONS
// =============================================================================

impl From<ReferralTokenError> for ShareError {
    fn from(_: ReferralTokenError) -> Self {
        // Decode failure means untrusted or stale input, never retryable
        ShareError::BadToken
    }
}

impl From<diesel::result::Error> for ShareError {
    fn from(err: diesel::result::Error) -> Self {
        match err {
            diesel::result::Error::NotFound => ShareError::NotFound,
            _ => ShareError::DatabaseError(err.to_string()),
        }
    }
}

impl From<validator::ValidationErrors> for ShareError {
    fn from(err: validator::ValidationErrors) -> Self {
        ShareError::ValidationError(err.to_string())
    }
}

// =============================================================================
// ERROR RESPONSE
// =============================================================================

#[derive(Debug, Serialize)]
pub struct ShareErrorResponse {
    pub error: String,
    pub code: String,
}

impl ShareError {
    /// Get HTTP status code for error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ShareError::NotAuthorized => StatusCode::FORBIDDEN,

            // Expired links are indistinguishable from unknown ones to the
            // outside world
            ShareError::NotFound | ShareError::Expired => StatusCode::NOT_FOUND,

            ShareError::BadToken
            | ShareError::SelfReferral
            | ShareError::ValidationError(_) => StatusCode::BAD_REQUEST,

            ShareError::AlreadyConnected | ShareError::AlreadyPending => StatusCode::CONFLICT,

            ShareError::DatabaseError(_) | ShareError::InternalError => {
                StatusCode::INTERNAL_SERVER_ERROR
            },
        }
    }

    /// Get error code for API response
    pub fn error_code(&self) -> &'static str {
        match self {
            ShareError::NotAuthorized => "NOT_AUTHORIZED",
            ShareError::NotFound => "NOT_FOUND",
            ShareError::Expired => "NOT_FOUND",
            ShareError::BadToken => "BAD_TOKEN",
            ShareError::SelfReferral => "SELF_REFERRAL",
            ShareError::AlreadyConnected => "ALREADY_CONNECTED",
            ShareError::AlreadyPending => "ALREADY_PENDING",
            ShareError::ValidationError(_) => "VALIDATION_ERROR",
            ShareError::DatabaseError(_) => "DATABASE_ERROR",
            ShareError::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Message safe to show external callers. Expired links masquerade as
    /// not-found; database details stay in the logs.
    fn public_message(&self) -> String {
        match self {
            ShareError::Expired => ShareError::NotFound.to_string(),
            ShareError::DatabaseError(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        if let ShareError::DatabaseError(ref msg) = self {
            tracing::error!("Database error on share endpoint: {}", msg);
        }
        if let ShareError::Expired = self {
            tracing::info!("Expired share link surfaced as not found");
        }

        let status = self.status_code();
        let body = ShareErrorResponse {
            error: self.public_message(),
            code: self.error_code().to_string(),
        };

        (status, Json(body)).into_response()
    }
}

// =============================================================================
// RESULT TYPE
// =============================================================================

pub type ShareResult<T> = Result<T, ShareError>;

// =============================================================================
// TESTS
// =============================================================================
