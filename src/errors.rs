//! Domain errors shared by the repositories and services.
//!
//! Authentication-path failures collapse into the single
//! [`IdentityError::AuthFailure`] value before they reach any boundary; an
//! external caller cannot tell an unknown account from a wrong secret.

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("user not found")]
    NotFound,

    #[error("email address already registered")]
    DuplicateEmail,

    /// Generic authentication failure: unknown account, inactive account,
    /// wrong secret or wrong method all produce this exact value.
    #[error("authentication failed")]
    AuthFailure,

    #[error("password rejected: {0}")]
    WeakCredential(String),

    #[error("{0} credential is not configured")]
    MissingCredential(&'static str),

    #[error("invalid or expired reset token")]
    InvalidToken,

    /// Transient store fault; the caller may retry.
    #[error("store unavailable: {0}")]
    StoreUnavailable(String),

    /// Non-transient store fault (bad statement, constraint other than the
    /// ones mapped explicitly, corrupted row).
    #[error("database error: {0}")]
    Database(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl IdentityError {
    /// True for faults a caller can meaningfully retry.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}

impl From<DbErr> for IdentityError {
    fn from(err: DbErr) -> Self {
        match err {
            DbErr::Conn(_) | DbErr::ConnectionAcquire(_) => {
                Self::StoreUnavailable(err.to_string())
            }
            _ => Self::Database(err.to_string()),
        }
    }
}

/// Maps a write error, treating a unique-constraint violation as a duplicate
/// email. Used at the insert/update call sites where the only unique column
/// in play is `users.email`.
pub fn map_unique_violation(err: DbErr) -> IdentityError {
    match err.sql_err() {
        Some(SqlErr::UniqueConstraintViolation(_)) => IdentityError::DuplicateEmail,
        _ => IdentityError::from(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auth_failure_display_is_fixed() {
        assert_eq!(IdentityError::AuthFailure.to_string(), "authentication failed");
    }

    #[test]
    fn transient_classification() {
        assert!(IdentityError::StoreUnavailable("pool timed out".into()).is_transient());
        assert!(!IdentityError::Database("syntax".into()).is_transient());
        assert!(!IdentityError::AuthFailure.is_transient());
    }
}
