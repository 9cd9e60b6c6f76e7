//! Argon2id password hashing and strength rules.

use crate::{AuthError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

pub const MIN_PASSWORD_LENGTH: usize = 8;

pub const WEAK_PASSWORD_MESSAGE: &str = "Password does not meet strength requirements. \
    Must be at least 8 characters with uppercase, lowercase, number, and special character.";

/// Hashes a password into a PHC string with a random salt.
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::Hashing(e.to_string()))
}

/// Checks a password against a stored PHC string.
///
/// A mismatch is `Ok(false)`; only an unparseable hash is an error.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(hash).map_err(|e| AuthError::Hashing(e.to_string()))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}

/// At least 8 characters with a lowercase letter, an uppercase letter,
/// a digit and one character that is none of those.
pub fn validate_strength(password: &str) -> Result<()> {
    let strong = password.chars().count() >= MIN_PASSWORD_LENGTH
        && password.chars().any(|c| c.is_ascii_lowercase())
        && password.chars().any(|c| c.is_ascii_uppercase())
        && password.chars().any(|c| c.is_ascii_digit())
        && password.chars().any(|c| !c.is_ascii_alphanumeric());

    if strong {
        Ok(())
    } else {
        Err(AuthError::Validation(WEAK_PASSWORD_MESSAGE.to_string()))
    }
}
