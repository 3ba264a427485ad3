//! Password hashing for the identity store
//!
//! Argon2id in PHC string format; the stored hash carries its own salt and
//! parameters, so verification needs nothing but the string. A wrong
//! password is `Ok(false)` — only server-side faults (hashing failure,
//! a corrupted stored hash) surface as errors.

use argon2::password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier};
use argon2::{password_hash::SaltString, Argon2};

use crate::types::{LearngateError, Result};

/// Hash a password for storage, with a fresh random salt
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| LearngateError::Internal(format!("Password hashing failed: {}", e)))
}

/// Check a candidate password against a stored PHC hash.
///
/// A hash that fails to parse means the account record is corrupted; that is
/// a server fault, not a failed login.
pub fn verify_password(password: &str, stored_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        LearngateError::Internal(format!("Stored password hash is malformed: {}", e))
    })?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
