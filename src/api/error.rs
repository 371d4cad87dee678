use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::fmt;

use super::ApiResponse;
use crate::errors::IdentityError;

#[derive(Debug)]
pub enum ApiError {
    /// Carries no detail: unknown account, wrong secret, wrong method and
    /// inactive account all render identically.
    AuthFailed,

    /// Same idea for the reset flow: one fixed message for unknown, consumed
    /// and expired tokens.
    InvalidToken,

    Validation(String),

    NotFound(String),

    Conflict(String),

    Unavailable(String),

    Internal(String),
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::AuthFailed => write!(f, "authentication failed"),
            ApiError::InvalidToken => write!(f, "invalid or expired reset token"),
            ApiError::Validation(msg) => write!(f, "Validation error: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            ApiError::Unavailable(msg) => write!(f, "Store unavailable: {}", msg),
            ApiError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_message) = match &self {
            ApiError::AuthFailed => (
                StatusCode::UNAUTHORIZED,
                "authentication failed".to_string(),
            ),
            ApiError::InvalidToken => (
                StatusCode::BAD_REQUEST,
                "invalid or expired reset token".to_string(),
            ),
            ApiError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg.clone()),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg.clone()),
            ApiError::Unavailable(msg) => {
                tracing::error!("Store unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "The record store is temporarily unavailable".to_string(),
                )
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal error occurred".to_string(),
                )
            }
        };

        let body = ApiResponse::<()>::error(error_message);
        (status, Json(body)).into_response()
    }
}

impl From<IdentityError> for ApiError {
    fn from(err: IdentityError) -> Self {
        match err {
            IdentityError::AuthFailure => ApiError::AuthFailed,
            IdentityError::InvalidToken => ApiError::InvalidToken,
            IdentityError::WeakCredential(msg) => ApiError::Validation(msg),
            IdentityError::NotFound => ApiError::NotFound("user not found".to_string()),
            IdentityError::DuplicateEmail => {
                ApiError::Conflict("email address already registered".to_string())
            }
            IdentityError::MissingCredential(kind) => {
                ApiError::Conflict(format!("{kind} credential is not configured"))
            }
            IdentityError::StoreUnavailable(msg) => ApiError::Unavailable(msg),
            IdentityError::Database(msg) | IdentityError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl ApiError {
    pub fn validation(msg: impl Into<String>) -> Self {
        ApiError::Validation(msg.into())
    }

    pub fn user_not_found(id: i32) -> Self {
        ApiError::NotFound(format!("User {} not found", id))
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        ApiError::Internal(msg.into())
    }
}
