//! Domain service for single-use, time-boxed password-reset tokens.

use async_trait::async_trait;

use crate::errors::IdentityError;

#[async_trait]
pub trait ResetService: Send + Sync {
    /// Requests a reset for an email address. The observable outcome is the
    /// same whether or not the account exists; only a store fault on the
    /// lookup itself can surface.
    async fn issue(&self, email: &str) -> Result<(), IdentityError>;

    /// Redeems a token and applies the new password. Consuming the token and
    /// storing the password commit or fail together.
    ///
    /// # Errors
    ///
    /// [`IdentityError::InvalidToken`] for an unknown, consumed or expired
    /// token; [`IdentityError::WeakCredential`] if the new password fails
    /// policy (the token is not consumed in that case).
    async fn redeem(&self, token: &str, new_password: &str) -> Result<(), IdentityError>;
}
