use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{CoreError, CoreResult};

/// Checks that `hash` is a PHC string argon2 can read.
pub fn validate_hash(hash: &str) -> CoreResult<()> {
    PasswordHash::new(hash)
        .map(|_| ())
        .map_err(|e| CoreError::Config(format!("invalid password hash: {e}")))
}

/// Verifies `password` against a PHC hash. An unreadable hash never matches.
pub fn verify_password(hash: &str, password: &str) -> bool {
    let parsed = match PasswordHash::new(hash) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::error!("Stored password hash is unreadable: {e}");
            return false;
        }
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok()
}

pub fn hash_password(password: &str) -> CoreResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| CoreError::Config(format!("failed to hash password: {e}")))?;

    Ok(hash.to_string())
}

#[cfg(test)]
pub(crate) fn fast_hash(password: &str) -> String {
    use argon2::{Algorithm, Params, Version};

    let params = Params::new(1024, 1, 1, None).unwrap();
    let salt = SaltString::generate(&mut OsRng);
    Argon2::new(Algorithm::Argon2id, Version::V0x13, params)
        .hash_password(password.as_bytes(), &salt)
        .unwrap()
        .to_string()
}
