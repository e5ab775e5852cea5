//! Password hashing and verification
//!
//! Thin wrapper around bcrypt. Plaintext passwords are consumed here and
//! never stored or logged anywhere in the application.

use thiserror::Error;

/// Errors from the hashing primitive
#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Password hashing failed: {0}")]
    HashFailed(String),

    #[error("Password verification failed: {0}")]
    VerifyFailed(String),
}

/// Hash a plaintext password with a fresh salt
pub fn hash(plaintext: &str) -> Result<String, PasswordError> {
    bcrypt::hash(plaintext, bcrypt::DEFAULT_COST).map_err(|e| PasswordError::HashFailed(e.to_string()))
}

/// Verify a plaintext password against a stored digest
pub fn verify(plaintext: &str, digest: &str) -> Result<bool, PasswordError> {
    bcrypt::verify(plaintext, digest).map_err(|e| PasswordError::VerifyFailed(e.to_string()))
}
