//! `SeaORM` implementation of the `ResetService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, info, warn};

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::errors::IdentityError;
use crate::services::credential_service::validate_password_policy;
use crate::services::hasher;
use crate::services::notifier::ResetNotifier;
use crate::services::reset_service::ResetService;

pub struct SeaOrmResetService {
    store: Store,
    security: SecurityConfig,
    notifier: Arc<dyn ResetNotifier>,
}

impl SeaOrmResetService {
    #[must_use]
    pub fn new(store: Store, security: SecurityConfig, notifier: Arc<dyn ResetNotifier>) -> Self {
        Self {
            store,
            security,
            notifier,
        }
    }
}

/// Row ids start at 1, so this never matches a real user. Used to keep the
/// unknown-email branch of `issue` on the same store path as the real one.
const NO_SUCH_USER: i32 = -1;

/// 32 random bytes as a 64-char hex string.
fn generate_token() -> String {
    use rand::Rng;

    let mut rng = rand::rng();
    let bytes: [u8; 32] = rng.random();

    bytes.iter().fold(String::with_capacity(64), |mut acc, b| {
        use std::fmt::Write;
        let _ = write!(acc, "{b:02x}");
        acc
    })
}

#[async_trait]
impl ResetService for SeaOrmResetService {
    async fn issue(&self, email: &str) -> Result<(), IdentityError> {
        let user = self.store.user_repo().get_by_email(email).await?;

        // Generated on both branches so the unknown-email path does the same
        // work as the real one.
        let token = generate_token();
        let now = Utc::now();
        let tokens = self.store.token_repo();

        let Some(user) = user else {
            // Equivalent-latency no-op: the issued path does a sweep and a
            // write against the token table, so this branch does a sweep
            // (matching nothing) and an indexed read before answering.
            tokens
                .purge_stale_for_user(NO_SUCH_USER, &now.to_rfc3339())
                .await?;
            let _ = tokens.find(&token).await?;
            debug!("password reset requested for unknown email");
            return Ok(());
        };

        let expires_at =
            (now + chrono::Duration::minutes(self.security.reset_token_ttl_minutes)).to_rfc3339();

        tokens.purge_stale_for_user(user.id, &now.to_rfc3339()).await?;
        tokens.insert(user.id, &token, &expires_at).await?;

        info!(user_id = user.id, "reset token issued");

        // Fire-and-forget: a delivery fault is logged, never surfaced.
        let notifier = self.notifier.clone();
        let recipient = user.email.clone();
        tokio::spawn(async move {
            if let Err(e) = notifier.deliver(&recipient, &token).await {
                warn!(error = %e, "reset notification delivery failed");
            }
        });

        Ok(())
    }

    async fn redeem(&self, token: &str, new_password: &str) -> Result<(), IdentityError> {
        // Policy first; a weak replacement must not consume the token.
        validate_password_policy(new_password, &self.security)?;

        let tokens = self.store.token_repo();
        let row = tokens.find(token).await?.ok_or(IdentityError::InvalidToken)?;

        if row.consumed {
            return Err(IdentityError::InvalidToken);
        }

        let expires_at = chrono::DateTime::parse_from_rfc3339(&row.expires_at)
            .map_err(|e| IdentityError::Database(format!("stored token expiry is corrupt: {e}")))?;
        if expires_at.with_timezone(&Utc) < Utc::now() {
            return Err(IdentityError::InvalidToken);
        }

        // Hash outside the transaction; it is the slow part.
        let hash = hasher::hash_blocking(new_password.to_string(), self.security.clone()).await?;

        // Atomic consume + apply. A concurrent redeem of the same token loses
        // the compare-and-set inside and observes InvalidToken.
        tokens
            .consume_and_set_password(token, row.user_id, &hash)
            .await?;

        info!(user_id = row.user_id, "password reset redeemed");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_are_long_hex_and_unique() {
        let a = generate_token();
        let b = generate_token();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
        assert_ne!(a, b);
    }
}
