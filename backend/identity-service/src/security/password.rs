/// Password hashing and verification using Argon2id
use crate::error::{IdentityError, Result};
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use zxcvbn::zxcvbn;

/// Hash a password with Argon2id and a fresh random salt.
///
/// Weak passwords are rejected before any hashing happens: length and
/// composition rules first, then a zxcvbn score of at least 3.
pub fn hash_password(password: &str) -> Result<String> {
    validate_password_strength(password)?;

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| IdentityError::Internal(format!("password hashing failed: {e}")))?;

    Ok(hash.to_string())
}

/// Verify a password against its stored PHC hash.
///
/// The comparison is the slow, salted Argon2id verification; a mismatch is
/// `Ok(false)`, anything else wrong with the stored hash is an error.
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed = PasswordHash::new(password_hash)
        .map_err(|e| IdentityError::Internal(format!("stored password hash is malformed: {e}")))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(IdentityError::Internal(format!(
            "password verification failed: {e}"
        ))),
    }
}

fn validate_password_strength(password: &str) -> Result<()> {
    if password.len() < 8 {
        return Err(IdentityError::WeakPassword(
            "must be at least 8 characters".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err(IdentityError::WeakPassword(
            "must contain an uppercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err(IdentityError::WeakPassword(
            "must contain a lowercase letter".to_string(),
        ));
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err(IdentityError::WeakPassword(
            "must contain a digit".to_string(),
        ));
    }
    if !password.chars().any(|c| !c.is_alphanumeric()) {
        return Err(IdentityError::WeakPassword(
            "must contain a special character".to_string(),
        ));
    }

    let entropy = zxcvbn(password, &[])
        .map_err(|e| IdentityError::Internal(format!("entropy estimation failed: {e}")))?;
    if entropy.score() < 3 {
        return Err(IdentityError::WeakPassword(
            "too guessable, pick a stronger password".to_string(),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let password = "Vf9#kQz2!mXr7";
        let hash = hash_password(password).expect("hashing should succeed");
        assert!(verify_password(password, &hash).unwrap());
    }

    #[test]
    fn test_wrong_password_does_not_verify() {
        let hash = hash_password("Vf9#kQz2!mXr7").unwrap();
        assert!(!verify_password("Wr0ng#Guess!x", &hash).unwrap());
    }

    #[test]
    fn test_same_password_hashes_differently() {
        // Fresh salt per hash.
        let h1 = hash_password("Vf9#kQz2!mXr7").unwrap();
        let h2 = hash_password("Vf9#kQz2!mXr7").unwrap();
        assert_ne!(h1, h2);
    }

    #[test]
    fn test_rejects_short_password() {
        assert!(matches!(
            hash_password("Vf9#kQ!"),
            Err(IdentityError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_rejects_password_without_digit() {
        assert!(matches!(
            hash_password("Strong#Password!"),
            Err(IdentityError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_rejects_password_without_special_char() {
        assert!(matches!(
            hash_password("StrongPassword123"),
            Err(IdentityError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_rejects_guessable_password() {
        assert!(matches!(
            hash_password("Password123!"),
            Err(IdentityError::WeakPassword(_))
        ));
    }

    #[test]
    fn test_malformed_stored_hash_is_an_error() {
        assert!(verify_password("whatever", "not-a-phc-hash").is_err());
    }
}
