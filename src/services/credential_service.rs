//! Domain service for credential lifecycle management.
//!
//! Owns the two verification paths (password, facial descriptor), the
//! policy gate on new passwords, and the login-method switch. Every
//! authentication failure leaving this service is the same
//! [`IdentityError::AuthFailure`] value regardless of cause.

use async_trait::async_trait;
use sea_orm::ActiveEnum;
use serde::Serialize;

use crate::config::SecurityConfig;
use crate::entities::users::{self, LoginMethod};
use crate::errors::IdentityError;

/// User record as it crosses the service boundary. No credential material.
#[derive(Debug, Clone, Serialize)]
pub struct UserAccount {
    pub id: i32,
    pub email: String,
    pub display_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
    pub last_login: Option<String>,
    pub login_method: String,
    pub has_password: bool,
    pub facial_enrolled: bool,
}

impl From<users::Model> for UserAccount {
    fn from(model: users::Model) -> Self {
        Self {
            id: model.id,
            email: model.email,
            display_name: model.display_name,
            role: model.role.to_value(),
            is_active: model.is_active,
            created_at: model.created_at,
            updated_at: model.updated_at,
            last_login: model.last_login,
            login_method: model.login_method.to_value(),
            has_password: model.password_hash.is_some(),
            facial_enrolled: model.facial_descriptor.is_some(),
        }
    }
}

/// Minimum policy a new password must meet. Shared with the reset flow,
/// which applies it before a token is consumed.
pub fn validate_password_policy(
    plaintext: &str,
    security: &SecurityConfig,
) -> Result<(), IdentityError> {
    if plaintext.is_empty() {
        return Err(IdentityError::WeakCredential(
            "password must not be empty".to_string(),
        ));
    }

    let min = security.min_password_length;
    if plaintext.chars().count() < min {
        return Err(IdentityError::WeakCredential(format!(
            "password must be at least {min} characters"
        )));
    }

    Ok(())
}

#[async_trait]
pub trait CredentialService: Send + Sync {
    /// Validates, hashes and stores a new password, making the password path
    /// authoritative.
    ///
    /// # Errors
    ///
    /// [`IdentityError::WeakCredential`] if the policy is unmet,
    /// [`IdentityError::NotFound`] if the user does not exist.
    async fn set_password(&self, user_id: i32, plaintext: &str) -> Result<(), IdentityError>;

    /// Verifies a password by email. On success updates `last_login` and
    /// returns the record; every failure (unknown email, inactive account,
    /// no stored hash, mismatch) is the same [`IdentityError::AuthFailure`]
    /// and mutates nothing.
    async fn verify_password(
        &self,
        email: &str,
        plaintext: &str,
    ) -> Result<UserAccount, IdentityError>;

    /// Stores the facial descriptor and registration timestamp. Does not
    /// switch the active login method; a user can enroll while still
    /// authenticating by password.
    async fn enroll_facial(
        &self,
        user_id: i32,
        descriptor: &[f32],
        metadata: Option<String>,
    ) -> Result<(), IdentityError>;

    /// Switches the authoritative credential path.
    ///
    /// # Errors
    ///
    /// [`IdentityError::MissingCredential`] if the target method has no
    /// stored credential. Never destroys the other method's credential.
    async fn set_login_method(
        &self,
        user_id: i32,
        method: LoginMethod,
    ) -> Result<(), IdentityError>;

    /// Compares a candidate descriptor against the enrolled one and owns the
    /// accept/reject decision for the given threshold. Updates `last_login`
    /// on acceptance.
    async fn verify_facial(
        &self,
        user_id: i32,
        candidate: &[f32],
        match_threshold: f32,
    ) -> Result<bool, IdentityError>;
}
