//! Sales rep sign-in.
//!
//! Every rep shares one password, stored as an argon2 PHC hash. The rep's
//! email only identifies whose customers to show; it is checked for shape,
//! not against a directory.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

use rep_portal_core::{Email, EmailError};

/// Errors that can occur during rep sign-in.
#[derive(Debug, Error)]
pub enum AuthError {
    /// Invalid email format.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Wrong password.
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Password hashing error.
    #[error("password hashing error")]
    PasswordHash,
}

/// Check a login attempt and return the rep's normalized identity.
///
/// # Errors
///
/// Returns `AuthError::InvalidEmail` for a malformed email and
/// `AuthError::InvalidCredentials` if the password does not match.
pub fn authenticate_rep(
    email: &str,
    password: &SecretString,
    password_hash: &SecretString,
) -> Result<Email, AuthError> {
    let email = Email::parse(email)?.normalized();
    verify_password(password.expose_secret(), password_hash.expose_secret())?;
    Ok(email)
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `AuthError::PasswordHash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|_| AuthError::PasswordHash)
}

/// Verify a password against a hash.
///
/// # Errors
///
/// Returns `AuthError::InvalidCredentials` if the hash is unreadable or the
/// password does not match.
pub fn verify_password(password: &str, hash: &str) -> Result<(), AuthError> {
    let parsed_hash = PasswordHash::new(hash.trim()).map_err(|_| AuthError::InvalidCredentials)?;
    let argon2 = Argon2::default();

    argon2
        .verify_password(password.as_bytes(), &parsed_hash)
        .map_err(|_| AuthError::InvalidCredentials)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("correct horse battery staple").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("correct horse battery staple", &hash).is_ok());
        assert!(matches!(
            verify_password("wrong", &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_hashes_are_salted() {
        assert_ne!(hash_password("same").unwrap(), hash_password("same").unwrap());
    }

    #[test]
    fn test_authenticate_rep_normalizes_email() {
        let hash = SecretString::from(hash_password("s3cret-rep-pw").unwrap());
        let rep = authenticate_rep(" Rep.One@X.com ", &SecretString::from("s3cret-rep-pw"), &hash).unwrap();
        assert_eq!(rep.as_str(), "rep.one@x.com");
    }

    #[test]
    fn test_authenticate_rep_rejects_bad_input() {
        let hash = SecretString::from(hash_password("s3cret-rep-pw").unwrap());
        assert!(matches!(
            authenticate_rep("not-an-email", &SecretString::from("s3cret-rep-pw"), &hash),
            Err(AuthError::InvalidEmail(_))
        ));
        assert!(matches!(
            authenticate_rep("rep@x.com", &SecretString::from("guess"), &hash),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_garbage_hash_is_invalid_credentials() {
        assert!(matches!(
            verify_password("anything", "not-a-phc-string"),
            Err(AuthError::InvalidCredentials)
        ));
    }
}
