//! Argon2id password hashing and verification.

use argon2::{
    Argon2,
    password_hash::{
        PasswordHash, PasswordHasher as ArgonHasher, PasswordVerifier, SaltString, rand_core::OsRng,
    },
};

use tokenhub_core::error::AppError;

/// Well-formed Argon2id digest with default parameters that no password
/// is expected to match. Verified against when a login names an unknown
/// email, so both failure paths cost one Argon2 evaluation.
const DUMMY_HASH: &str = "$argon2id$v=19$m=19456,t=2,p=1$Lec53HEHG4HaKu8HAL7EDQ$98R5qk6GX51fEE4a6dQvllxPzfHGDz9E/+YEd2a8/ys";

/// Handles password hashing and verification using Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher;

impl PasswordHasher {
    /// Creates a new password hasher instance.
    pub fn new() -> Self {
        Self
    }

    /// Hashes a plaintext password using Argon2id with a random salt.
    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();

        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::internal(format!("Password hashing failed: {e}")))?;

        Ok(hash.to_string())
    }

    /// Verifies a plaintext password against a stored Argon2id hash.
    ///
    /// Returns `Ok(true)` if the password matches, `Ok(false)` if not.
    pub fn verify_password(&self, password: &str, hash: &str) -> Result<bool, AppError> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|e| AppError::internal(format!("Invalid password hash format: {e}")))?;

        let argon2 = Argon2::default();
        match argon2.verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(AppError::internal(format!(
                "Password verification failed: {e}"
            ))),
        }
    }

    /// Runs one verification against [`DUMMY_HASH`] and discards the result.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify_password(password, DUMMY_HASH);
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hasher = PasswordHasher::new();
        let hash = hasher.hash_password("correct horse 1").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(hasher.verify_password("correct horse 1", &hash).unwrap());
        assert!(!hasher.verify_password("wrong horse 1", &hash).unwrap());
    }

    #[test]
    fn test_salts_differ() {
        let hasher = PasswordHasher::new();
        let a = hasher.hash_password("same-password-1").unwrap();
        let b = hasher.hash_password("same-password-1").unwrap();
        assert_ne!(a, b);
    }

    #[test]
    fn test_dummy_hash_parses_and_rejects() {
        let hasher = PasswordHasher::new();
        assert!(!hasher.verify_password("password1", DUMMY_HASH).unwrap());
    }

    #[test]
    fn test_garbage_hash_is_internal_error() {
        let err = PasswordHasher::new()
            .verify_password("x", "not-a-phc-string")
            .unwrap_err();
        assert_eq!(err.kind, tokenhub_core::ErrorKind::Internal);
    }
}
