//! Password hashing (argon2, PHC string format).

use crate::error::{StoreError, StoreResult};
use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};

/// Hash `plain` with a fresh random salt.
pub fn hash(plain: &str) -> StoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(plain.as_bytes(), &salt)
        .map_err(|err| StoreError::Password(err.to_string()))?
        .to_string();
    Ok(hash)
}

/// Check `plain` against a stored PHC hash.
///
/// A malformed stored hash is an error; a wrong password is `Ok(false)`.
pub fn verify(plain: &str, stored: &str) -> StoreResult<bool> {
    let parsed = PasswordHash::new(stored).map_err(|err| StoreError::Password(err.to_string()))?;
    Ok(Argon2::default()
        .verify_password(plain.as_bytes(), &parsed)
        .is_ok())
}
