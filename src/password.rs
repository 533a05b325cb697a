//! Password hashing and verification.
//!
//! Passwords are hashed with argon2id (memory-hard, salted) and stored in
//! PHC string format. Raw passwords never leave this module's call sites;
//! verification compares against the stored hash only.

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};

/// Hashing failures. Verification failures are not errors, they are `false`.
#[derive(Debug, thiserror::Error)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashingFailed(String),
}

/// Hash a raw password with argon2id and a fresh random salt.
pub fn hash_password(raw: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(raw.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))
}

/// Verify a raw password against a stored PHC-format hash.
///
/// Returns `false` both for a wrong password and for an undecodable hash;
/// login treats every mismatch identically.
pub fn verify_password(raw: &str, stored_hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(stored_hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(raw.as_bytes(), &parsed)
        .is_ok()
}
