//! Key derivation from the shared Multipass secret.

use secrecy::zeroize::Zeroize;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};

use super::MultipassError;

/// Length of the AES-128 encryption key.
pub const ENCRYPTION_KEY_LEN: usize = 16;

/// Length of the HMAC signing key.
///
/// Shopify uses the second half of a 32-byte SHA-256 digest, so the key is
/// 16 bytes. Not configurable.
pub const SIGNING_KEY_LEN: usize = 16;

/// Encryption and signing keys derived from the shared secret.
///
/// `SHA-256(secret)` is split in two: bytes `0..16` are the encryption key,
/// bytes `16..32` the signing key. Key bytes are wiped on drop.
pub struct KeyMaterial {
    encryption_key: [u8; ENCRYPTION_KEY_LEN],
    signing_key: [u8; SIGNING_KEY_LEN],
}

impl KeyMaterial {
    /// Derive both keys from the shared secret.
    ///
    /// # Errors
    ///
    /// Returns `MultipassError::MissingSecret` if the secret is empty.
    pub fn derive(secret: &SecretString) -> Result<Self, MultipassError> {
        let secret = secret.expose_secret();
        if secret.is_empty() {
            return Err(MultipassError::MissingSecret);
        }

        let mut digest = Sha256::digest(secret.as_bytes());
        let (encryption, signing) = digest.split_at(ENCRYPTION_KEY_LEN);

        let encryption_key = <[u8; ENCRYPTION_KEY_LEN]>::try_from(encryption);
        let signing_key = <[u8; SIGNING_KEY_LEN]>::try_from(signing);
        digest.as_mut_slice().zeroize();

        match (encryption_key, signing_key) {
            (Ok(encryption_key), Ok(signing_key)) => Ok(Self {
                encryption_key,
                signing_key,
            }),
            _ => Err(MultipassError::KeyDerivation),
        }
    }

    /// The 16-byte AES-128 key.
    #[must_use]
    pub const fn encryption_key(&self) -> &[u8; ENCRYPTION_KEY_LEN] {
        &self.encryption_key
    }

    /// The 16-byte HMAC-SHA256 key.
    #[must_use]
    pub const fn signing_key(&self) -> &[u8; SIGNING_KEY_LEN] {
        &self.signing_key
    }
}

impl Drop for KeyMaterial {
    fn drop(&mut self) {
        self.encryption_key.zeroize();
        self.signing_key.zeroize();
    }
}

impl std::fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("encryption_key", &"[REDACTED]")
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}
