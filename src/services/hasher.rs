//! One-way password hashing primitive.
//!
//! Argon2id with an explicit, configurable work factor. The salt is generated
//! fresh per call and embedded in the PHC output string, so hashing the same
//! plaintext twice yields two different strings that both verify.

use argon2::{
    Algorithm, Argon2, Params, Version,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use tokio::task;

use crate::config::SecurityConfig;
use crate::errors::IdentityError;

pub fn hash(plaintext: &str, config: &SecurityConfig) -> Result<String, IdentityError> {
    let salt = SaltString::generate(&mut OsRng);

    let params = Params::new(
        config.argon2_memory_cost_kib,
        config.argon2_time_cost,
        config.argon2_parallelism,
        None,
    )
    .map_err(|e| IdentityError::Internal(format!("invalid argon2 params: {e}")))?;

    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    let hash = argon2
        .hash_password(plaintext.as_bytes(), &salt)
        .map_err(|e| IdentityError::Internal(format!("failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

/// Timing-safe comparison against a stored PHC string. A malformed stored
/// hash fails closed: the answer is false, never an error the authentication
/// decision has to handle.
#[must_use]
pub fn verify(plaintext: &str, stored: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored) else {
        return false;
    };

    // Params and salt come out of the PHC string itself.
    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

/// Argon2 is CPU-intensive and would stall the async runtime if run inline.
pub async fn hash_blocking(
    plaintext: String,
    config: SecurityConfig,
) -> Result<String, IdentityError> {
    task::spawn_blocking(move || hash(&plaintext, &config))
        .await
        .map_err(|e| IdentityError::Internal(format!("hashing task panicked: {e}")))?
}

pub async fn verify_blocking(plaintext: String, stored: String) -> Result<bool, IdentityError> {
    task::spawn_blocking(move || verify(&plaintext, &stored))
        .await
        .map_err(|e| IdentityError::Internal(format!("verification task panicked: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fast_config() -> SecurityConfig {
        SecurityConfig {
            argon2_memory_cost_kib: 1024,
            argon2_time_cost: 1,
            argon2_parallelism: 1,
            ..SecurityConfig::default()
        }
    }

    #[test]
    fn round_trip() {
        let config = fast_config();
        let hashed = hash("correct horse battery staple", &config).unwrap();
        assert!(verify("correct horse battery staple", &hashed));
        assert!(!verify("correct horse battery stable", &hashed));
    }

    #[test]
    fn salt_makes_hashes_unique() {
        let config = fast_config();
        let a = hash("same input", &config).unwrap();
        let b = hash("same input", &config).unwrap();
        assert_ne!(a, b);
        assert!(verify("same input", &a));
        assert!(verify("same input", &b));
    }

    #[test]
    fn malformed_stored_hash_fails_closed() {
        assert!(!verify("anything", ""));
        assert!(!verify("anything", "not-a-phc-string"));
        assert!(!verify("anything", "$argon2id$v=19$truncated"));
    }

    #[test]
    fn plaintext_never_appears_in_output() {
        let config = fast_config();
        let hashed = hash("visible-secret", &config).unwrap();
        assert!(!hashed.contains("visible-secret"));
    }
}
