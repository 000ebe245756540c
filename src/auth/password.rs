//! Password hashing and verification.
//!
//! Hashes are Argon2id PHC strings (`$argon2id$v=19$...`) with a random salt,
//! so the same password never produces the same stored value twice.

use crate::errors::ServiceError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

/// Shortest password accepted for an account
pub const MIN_PASSWORD_LENGTH: usize = 5;

/// Hash a plaintext password for storage.
pub fn hash_password(password: &str) -> Result<String, ServiceError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ServiceError::HashError(e.to_string()))
}

/// Check a plaintext password against a stored hash.
///
/// A malformed stored hash never verifies.
pub fn verify_password(password: &str, password_hash: &str) -> bool {
    match PasswordHash::new(password_hash) {
        Ok(parsed) => Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "stored password hash could not be parsed");
            false
        }
    }
}

pub fn validate_password(password: &str) -> Result<(), ServiceError> {
    if password.chars().count() < MIN_PASSWORD_LENGTH {
        return Err(ServiceError::ValidationError(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn hash_and_verify_round_trip() {
        let hash = hash_password("testpass123").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("testpass123", &hash));
        assert!(!verify_password("wrongpass", &hash));
    }

    #[test]
    fn same_password_hashes_differently() {
        let first = hash_password("sample123").unwrap();
        let second = hash_password("sample123").unwrap();
        assert_ne!(first, second);
        assert!(verify_password("sample123", &first));
        assert!(verify_password("sample123", &second));
    }

    #[test]
    fn plaintext_is_never_a_valid_hash() {
        assert!(!verify_password("testpass123", "testpass123"));
        assert!(!verify_password("", ""));
    }

    #[test]
    fn short_passwords_are_rejected() {
        assert_matches!(validate_password("pw"), Err(ServiceError::ValidationError(_)));
        assert_matches!(validate_password("abcd"), Err(ServiceError::ValidationError(_)));
        assert!(validate_password("test123").is_ok());
    }
}
