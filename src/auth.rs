// =============================================================================
// AUTH MODULE
// =============================================================================
// Password hashing and verification with Argon2.
//
// Credentials are never compared in plaintext: registration stores an Argon2
// hash (PHC string with a random salt) and login verifies the supplied
// password against it. Hash verification failure and unknown email produce
// the same error message, so the endpoint cannot be used to enumerate users.
//
// There are no sessions or tokens here; the endpoints simply confirm or deny
// a credential pair and echo the account (minus the hash).
// =============================================================================

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::error::{AppError, AppResult};

/// Minimum accepted password length for new accounts
pub const MIN_PASSWORD_LENGTH: usize = 8;

/// Hash a plaintext password with Argon2 and a fresh random salt.
///
/// # Returns
/// The PHC-format hash string to store, or an error when the password is
/// empty or hashing itself fails.
pub fn hash_password(password: &str) -> AppResult<String> {
    if password.is_empty() {
        return Err(AppError::Internal(
            "Refusing to hash an empty password".to_string(),
        ));
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|err| AppError::Internal(format!("Password hashing failed: {}", err)))?;

    Ok(hash.to_string())
}

/// Verify a plaintext password against a stored Argon2 hash.
///
/// Returns Ok(true) on a match, Ok(false) on a mismatch, and an error only
/// when the stored hash cannot be parsed (corrupt data, not a bad password).
pub fn verify_password(stored_hash: &str, password: &str) -> AppResult<bool> {
    let parsed = PasswordHash::new(stored_hash)
        .map_err(|err| AppError::Internal(format!("Stored password hash is invalid: {}", err)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(err) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            err
        ))),
    }
}

// =============================================================================
// TESTS
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify_round_trip() {
        let hash = hash_password("correct horse battery staple").unwrap();

        // The stored value is a PHC string, never the plaintext
        assert!(hash.starts_with("$argon2"));
        assert!(!hash.contains("correct horse"));

        assert!(verify_password(&hash, "correct horse battery staple").unwrap());
    }

    #[test]
    fn test_wrong_password_is_rejected() {
        let hash = hash_password("hunter22222").unwrap();
        assert!(!verify_password(&hash, "hunter11111").unwrap());
    }

    #[test]
    fn test_salts_are_random() {
        let first = hash_password("same password").unwrap();
        let second = hash_password("same password").unwrap();
        assert_ne!(first, second, "each hash must use a fresh salt");
    }

    #[test]
    fn test_empty_password_is_refused() {
        assert!(hash_password("").is_err());
    }

    #[test]
    fn test_corrupt_stored_hash_is_an_error_not_a_mismatch() {
        assert!(verify_password("not-a-phc-string", "whatever").is_err());
    }
}
