//! Password hashing with Argon2id.

use argon2::{
    Argon2, PasswordHash,
    password_hash::{PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use thiserror::Error;

/// Shortest password accepted for new credentials.
pub const MIN_PASSWORD_LEN: usize = 4;

/// Errors that can occur during password operations.
#[derive(Debug, Error)]
pub enum PasswordError {
    /// The candidate password is too short.
    #[error("password must be at least {MIN_PASSWORD_LEN} characters")]
    TooShort,

    /// Failed to hash password.
    #[error("failed to hash password: {0}")]
    HashError(String),

    /// Stored hash is not a PHC string.
    #[error("invalid password hash format")]
    InvalidHash,
}

/// Hashes a new password into a PHC string.
///
/// # Errors
///
/// Returns `PasswordError::TooShort` for passwords under [`MIN_PASSWORD_LEN`]
/// characters and `PasswordError::HashError` if hashing fails.
///
/// # Example
///
/// ```
/// use ifinance_core::auth::hash_password;
///
/// let hash = hash_password("correct horse").unwrap();
/// assert!(hash.starts_with("$argon2id$"));
/// ```
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PasswordError::TooShort);
    }

    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| PasswordError::HashError(e.to_string()))
}

/// Checks a password against a stored hash.
///
/// A mismatch is `Ok(false)`, not an error.
///
/// # Errors
///
/// Returns `PasswordError::InvalidHash` if `hash` cannot be parsed.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed = PasswordHash::new(hash).map_err(|_| PasswordError::InvalidHash)?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
