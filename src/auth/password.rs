//! argon2 secret hashing

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

use crate::error::BankError;

/// Hash a secret into a PHC string (salt embedded).
pub fn hash_secret(secret: &str) -> Result<String, BankError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(secret.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| {
            tracing::error!(error = %e, "secret hashing failed");
            BankError::internal("failed to hash secret")
        })
}

/// Returns false on mismatch. A malformed stored hash is an internal error.
pub fn verify_secret(secret: &str, stored_hash: &str) -> Result<bool, BankError> {
    let parsed = PasswordHash::new(stored_hash).map_err(|e| {
        tracing::error!(error = %e, "stored secret hash is malformed");
        BankError::internal("invalid stored credential")
    })?;
    Ok(Argon2::default()
        .verify_password(secret.as_bytes(), &parsed)
        .is_ok())
}
