//! Password hashing helpers.
//!
//! Hashes are PHC strings produced by the configured [`Argon2`] instance, so
//! the parameters used at hash time travel with the hash and verification
//! does not depend on the current configuration.

use argon2::{
    Argon2,
    password_hash::{
        Error,
        PasswordHash,
        PasswordHasher,
        PasswordVerifier,
        SaltString,
        rand_core::OsRng,
    },
};

/// Hash `pw` with a fresh random salt.
///
/// # Errors
/// Returns any error reported by the Argon2 hasher.
#[must_use = "handle the result"]
pub fn hash_password(argon2: &Argon2, pw: &str) -> Result<String, Error> {
    let salt = SaltString::generate(&mut OsRng);
    Ok(argon2.hash_password(pw.as_bytes(), &salt)?.to_string())
}

/// Check `pw` against a stored PHC hash.
///
/// A stored value that does not parse as a PHC string never matches.
#[must_use]
pub fn verify_password(hash: &str, pw: &str) -> bool {
    let Ok(parsed_hash) = PasswordHash::new(hash) else {
        return false;
    };
    Argon2::default()
        .verify_password(pw.as_bytes(), &parsed_hash)
        .is_ok()
}
