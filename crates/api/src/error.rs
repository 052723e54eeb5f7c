//! Unified error handling with Sentry integration.
//!
//! Provides a closed `ApiError` taxonomy. Every handler returns
//! `Result<T, ApiError>`; the kind-to-status-and-envelope translation lives
//! only in the `IntoResponse` impl here, so no handler ever builds a failure
//! response by hand. Internal faults are captured to Sentry and reported as
//! a generic message without leaking details.

use axum::{
    Json,
    http::{HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

use crate::services::{AuthError, CartError, TokenError};

/// One failing field from payload validation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldError {
    /// Payload field name as the client sent it.
    pub field: String,
    /// Human-readable description of the violation.
    pub message: String,
}

impl FieldError {
    /// Create a field error.
    #[must_use]
    pub fn new(field: &str, message: &str) -> Self {
        Self {
            field: field.to_owned(),
            message: message.to_owned(),
        }
    }
}

/// Application-level error taxonomy.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Payload failed its field contract.
    #[error("Validation failed")]
    Validation(Vec<FieldError>),

    /// A path or payload identifier could not be parsed.
    #[error("Invalid ID format")]
    MalformedIdentifier,

    /// A uniqueness rule was violated.
    #[error("{0}")]
    Duplicate(String),

    /// Login failed or the authenticated subject no longer exists.
    #[error("{0}")]
    AuthFailure(String),

    /// The bearer token is missing, malformed, or wrongly signed.
    #[error("{0}")]
    TokenInvalid(String),

    /// The bearer token is past its expiry.
    #[error("Token has expired")]
    TokenExpired,

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// No units of the product are available.
    #[error("Product is out of stock")]
    OutOfStock,

    /// The requested quantity exceeds available stock.
    #[error("Only {available} items available")]
    InsufficientStock {
        /// Units the caller could still hold.
        available: u32,
    },

    /// Admission control rejected the request.
    #[error("Too many requests, please try again later")]
    RateLimited {
        /// Seconds until the client may retry.
        retry_after_secs: u64,
    },

    /// An uploaded asset could not be accepted.
    #[error("{0}")]
    UploadFailure(String),

    /// Unexpected fault. The message is logged, never sent to the client.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApiError {
    /// The HTTP status this kind maps to.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Validation(_)
            | Self::MalformedIdentifier
            | Self::Duplicate(_)
            | Self::OutOfStock
            | Self::UploadFailure(_) => StatusCode::BAD_REQUEST,
            Self::AuthFailure(_) | Self::TokenInvalid(_) | Self::TokenExpired => {
                StatusCode::UNAUTHORIZED
            }
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InsufficientStock { .. } => StatusCode::CONFLICT,
            Self::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Capture unexpected faults before the details are dropped
        if matches!(self, Self::Internal(_)) {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_owned(),
            other => other.to_string(),
        };

        let errors = match &self {
            Self::Validation(fields) => fields.clone(),
            _ => Vec::new(),
        };

        let body = Json(json!({
            "success": false,
            "message": message,
            "errors": errors,
        }));

        let mut response = (status, body).into_response();

        if let Self::RateLimited { retry_after_secs } = self
            && let Ok(value) = HeaderValue::from_str(&retry_after_secs.to_string())
        {
            response.headers_mut().insert(RETRY_AFTER, value);
        }

        response
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::InvalidCredentials => Self::AuthFailure(err.to_string()),
            AuthError::UserAlreadyExists => Self::Duplicate("User already exists".to_owned()),
            AuthError::PasswordHash => Self::Internal(err.to_string()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Malformed | TokenError::InvalidSignature => {
                Self::TokenInvalid("Invalid or malformed token".to_owned())
            }
            TokenError::Expired => Self::TokenExpired,
        }
    }
}

impl From<CartError> for ApiError {
    fn from(err: CartError) -> Self {
        match err {
            CartError::ProductNotFound | CartError::CartNotFound | CartError::LineNotFound => {
                Self::NotFound(err.to_string())
            }
            CartError::OutOfStock => Self::OutOfStock,
            CartError::InsufficientStock { available } => Self::InsufficientStock { available },
        }
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;
