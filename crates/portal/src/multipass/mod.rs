//! Shopify Multipass token issuance.
//!
//! A Multipass token signs a sales rep into a customer's storefront account
//! without the customer's password. The wire format is fixed by Shopify:
//!
//! ```text
//! base64url_nopad( IV[16] || AES-128-CBC(json claim) || HMAC-SHA256(IV || ciphertext)[32] )
//! ```
//!
//! Both keys come from one shared secret (see [`KeyMaterial`]). Shopify
//! derives them the same way, so every split point here must stay
//! bit-for-bit identical or the storefront rejects the token.
//!
//! # Example
//!
//! ```rust,ignore
//! let issuer = MultipassIssuer::new(&config.multipass);
//! let claim = IdentityClaim::new(customer.email.clone());
//! let token = issuer.issue(claim)?;
//! let url = issuer.login_url(&token);
//! ```

mod claim;
mod keys;
mod token;

pub use claim::{CLAIM_MAX_AGE_SECS, IdentityClaim};
pub use keys::{ENCRYPTION_KEY_LEN, KeyMaterial, SIGNING_KEY_LEN};
pub use token::{IV_LEN, MultipassIssuer, MultipassToken, TAG_LEN};

use thiserror::Error;

/// Errors that can occur while issuing or decoding a Multipass token.
#[derive(Debug, Error)]
pub enum MultipassError {
    /// No shared secret configured.
    #[error("Multipass secret is not configured")]
    MissingSecret,

    /// The SHA-256 digest could not be split into keys.
    #[error("Key derivation failed")]
    KeyDerivation,

    /// Cipher or MAC could not be initialized with the derived keys.
    #[error("Cipher initialization failed")]
    Cipher,

    /// The claim could not be serialized.
    #[error("Claim serialization failed: {0}")]
    Serialize(#[source] serde_json::Error),

    /// The claim is too old (or dated in the future) to be issued.
    #[error("Identity claim is stale (age {age_secs}s)")]
    StaleClaim {
        /// Claim age in seconds at issuance time (negative if in the future).
        age_secs: i64,
    },

    /// The `return_to` target is not a storefront-relative path.
    #[error("Invalid return_to path: {0}")]
    InvalidReturnTo(String),

    /// Token is not valid URL-safe base64.
    #[error("Token is not valid base64url")]
    InvalidEncoding,

    /// Token is too short or the ciphertext is not block aligned.
    #[error("Token has invalid length {0}")]
    InvalidLength(usize),

    /// HMAC verification failed.
    #[error("Token signature mismatch")]
    InvalidSignature,

    /// Decrypted data has invalid padding.
    #[error("Token padding is invalid")]
    InvalidPadding,

    /// Decrypted data is not a valid claim.
    #[error("Token payload is invalid: {0}")]
    InvalidPayload(#[source] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(
            MultipassError::StaleClaim { age_secs: 90 }.to_string(),
            "Identity claim is stale (age 90s)"
        );
        assert_eq!(
            MultipassError::InvalidLength(12).to_string(),
            "Token has invalid length 12"
        );
        assert_eq!(
            MultipassError::MissingSecret.to_string(),
            "Multipass secret is not configured"
        );
    }
}
