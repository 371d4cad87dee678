//! `SeaORM` implementation of the `CredentialService` trait.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::SecurityConfig;
use crate::db::Store;
use crate::entities::users::LoginMethod;
use crate::errors::IdentityError;
use crate::services::credential_service::{
    CredentialService, UserAccount, validate_password_policy,
};
use crate::services::matcher::{self, DescriptorMatcher};
use crate::services::hasher;

pub struct SeaOrmCredentialService {
    store: Store,
    security: SecurityConfig,
    matcher: Arc<dyn DescriptorMatcher>,
    /// Verified against when the email lookup misses, so the unknown-email
    /// path burns the same hashing cost as a real mismatch.
    equalizer_hash: String,
}

impl SeaOrmCredentialService {
    pub async fn new(
        store: Store,
        security: SecurityConfig,
        matcher: Arc<dyn DescriptorMatcher>,
    ) -> Result<Self, IdentityError> {
        let equalizer_hash =
            hasher::hash_blocking("timing-equalizer".to_string(), security.clone()).await?;

        Ok(Self {
            store,
            security,
            matcher,
            equalizer_hash,
        })
    }

    async fn burn_verification(&self, plaintext: &str) -> Result<(), IdentityError> {
        let _ = hasher::verify_blocking(plaintext.to_string(), self.equalizer_hash.clone()).await?;
        Ok(())
    }
}

#[async_trait]
impl CredentialService for SeaOrmCredentialService {
    async fn set_password(&self, user_id: i32, plaintext: &str) -> Result<(), IdentityError> {
        validate_password_policy(plaintext, &self.security)?;

        let repo = self.store.user_repo();
        repo.require_by_id(user_id).await?;

        let hash = hasher::hash_blocking(plaintext.to_string(), self.security.clone()).await?;
        repo.set_password_hash(user_id, &hash).await?;

        info!(user_id, "password credential updated");
        Ok(())
    }

    async fn verify_password(
        &self,
        email: &str,
        plaintext: &str,
    ) -> Result<UserAccount, IdentityError> {
        let repo = self.store.user_repo();

        let Some(user) = repo.get_by_email(email).await? else {
            self.burn_verification(plaintext).await?;
            return Err(IdentityError::AuthFailure);
        };

        let Some(stored) = user.password_hash.clone() else {
            self.burn_verification(plaintext).await?;
            return Err(IdentityError::AuthFailure);
        };

        let matches = hasher::verify_blocking(plaintext.to_string(), stored).await?;
        if !matches || !user.is_active {
            return Err(IdentityError::AuthFailure);
        }

        let updated = repo.touch_last_login(user.id).await?;
        info!(user_id = updated.id, "password authentication succeeded");
        Ok(UserAccount::from(updated))
    }

    async fn enroll_facial(
        &self,
        user_id: i32,
        descriptor: &[f32],
        metadata: Option<String>,
    ) -> Result<(), IdentityError> {
        let expected = self.security.facial_descriptor_len;
        if descriptor.len() != expected {
            return Err(IdentityError::WeakCredential(format!(
                "facial descriptor must have {expected} elements, got {}",
                descriptor.len()
            )));
        }

        let repo = self.store.user_repo();
        repo.require_by_id(user_id).await?;

        let encoded = matcher::encode_descriptor(descriptor)?;
        repo.set_facial_credential(user_id, &encoded, metadata).await?;

        info!(user_id, "facial credential enrolled");
        Ok(())
    }

    async fn set_login_method(
        &self,
        user_id: i32,
        method: LoginMethod,
    ) -> Result<(), IdentityError> {
        let repo = self.store.user_repo();
        let user = repo.require_by_id(user_id).await?;

        match method {
            LoginMethod::Facial if user.facial_descriptor.is_none() => {
                Err(IdentityError::MissingCredential("facial"))
            }
            LoginMethod::Password if user.password_hash.is_none() => {
                Err(IdentityError::MissingCredential("password"))
            }
            _ => {
                repo.set_login_method(user_id, method).await?;
                info!(user_id, ?method, "login method switched");
                Ok(())
            }
        }
    }

    async fn verify_facial(
        &self,
        user_id: i32,
        candidate: &[f32],
        match_threshold: f32,
    ) -> Result<bool, IdentityError> {
        let repo = self.store.user_repo();
        let user = repo.require_by_id(user_id).await?;

        let Some(encoded) = user.facial_descriptor else {
            return Err(IdentityError::MissingCredential("facial"));
        };

        let enrolled = matcher::decode_descriptor(&encoded)?;
        if candidate.len() != enrolled.len() {
            return Ok(false);
        }

        let distance = self.matcher.distance(&enrolled, candidate);
        let accepted = user.is_active && distance <= match_threshold;

        debug!(user_id, distance, match_threshold, accepted, "facial match decision");

        if accepted {
            repo.touch_last_login(user_id).await?;
            info!(user_id, "facial authentication succeeded");
        }

        Ok(accepted)
    }
}
