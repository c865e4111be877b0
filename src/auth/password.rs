//! Password hashing (Argon2id) and credential input validation.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;
const SPECIAL_CHARACTERS: &str = "!@#$%^&*";

#[derive(Error, Debug)]
pub enum PasswordError {
    #[error("Failed to hash password: {0}")]
    HashingFailed(String),

    #[error("Failed to verify password: {0}")]
    VerificationFailed(String),

    #[error("Password task failed: {0}")]
    TaskFailed(String),
}

/// Hash a password into a PHC string suitable for storage.
pub fn hash_password(password: &str) -> Result<String, PasswordError> {
    let salt = SaltString::generate(&mut OsRng);

    let password_hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;

    Ok(password_hash.to_string())
}

/// Verify a password against a stored hash. A mismatch is `Ok(false)`.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, PasswordError> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| PasswordError::VerificationFailed(e.to_string()))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(PasswordError::VerificationFailed(e.to_string())),
    }
}

/// [`hash_password`] on the blocking pool. Argon2 is deliberately slow and
/// must not hold up the async workers.
pub async fn hash_password_blocking(password: String) -> Result<String, PasswordError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
}

/// [`verify_password`] on the blocking pool.
pub async fn verify_password_blocking(password: String, hash: String) -> Result<bool, PasswordError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| PasswordError::TaskFailed(e.to_string()))?
}

/// Every unmet strength rule, in a fixed order. Empty means acceptable.
pub fn password_strength_errors(password: &str) -> Vec<&'static str> {
    let mut errors = Vec::new();

    if password.chars().count() < MIN_PASSWORD_LENGTH {
        errors.push("Password must be at least 8 characters");
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        errors.push("Password must contain uppercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        errors.push("Password must contain lowercase letter");
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        errors.push("Password must contain number");
    }
    if !password.chars().any(|c| SPECIAL_CHARACTERS.contains(c)) {
        errors.push("Password must contain special character (!@#$%^&*)");
    }

    errors
}

/// `local@domain.tld`: no whitespace, one `@`, and a dot inside the domain
/// with something on both sides.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }

    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }

    match domain.rsplit_once('.') {
        Some((host, tld)) => !host.is_empty() && !tld.is_empty(),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_and_verify() {
        let hash = hash_password("Abc12345!").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("Abc12345!", &hash).unwrap());
        assert!(!verify_password("Abc12345?", &hash).unwrap());
    }

    #[test]
    fn same_password_hashes_differently() {
        let a = hash_password("Abc12345!").unwrap();
        let b = hash_password("Abc12345!").unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn blocking_pool_wrappers_agree_with_the_direct_calls() {
        let hash = hash_password_blocking("Abc12345!".to_string()).await.unwrap();
        assert!(verify_password("Abc12345!", &hash).unwrap());
        assert!(verify_password_blocking("Abc12345!".to_string(), hash.clone()).await.unwrap());
        assert!(!verify_password_blocking("Abc12345?".to_string(), hash).await.unwrap());
        assert!(verify_password_blocking("x".to_string(), "not-a-phc-string".to_string())
            .await
            .is_err());
    }

    #[test]
    fn malformed_hash_is_an_error() {
        assert!(verify_password("Abc12345!", "not-a-phc-string").is_err());
    }

    #[test]
    fn strength_rules() {
        assert!(password_strength_errors("Abc12345!").is_empty());
        assert_eq!(
            password_strength_errors("abc"),
            vec![
                "Password must be at least 8 characters",
                "Password must contain uppercase letter",
                "Password must contain number",
                "Password must contain special character (!@#$%^&*)",
            ]
        );
    }

    #[test]
    fn email_shapes() {
        assert!(is_valid_email("a@acme.com"));
        assert!(is_valid_email("first.last@sub.acme.io"));
        assert!(!is_valid_email("a@acme"));
        assert!(!is_valid_email("@acme.com"));
        assert!(!is_valid_email("a@.com"));
        assert!(!is_valid_email("a@acme."));
        assert!(!is_valid_email("a b@acme.com"));
        assert!(!is_valid_email("a@b@acme.com"));
    }
}
