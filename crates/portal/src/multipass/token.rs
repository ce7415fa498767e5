//! Token sealing and verification.

use aes::cipher::{BlockDecryptMut, BlockEncryptMut, KeyIvInit, block_padding::Pkcs7};
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use rand::RngCore;
use secrecy::SecretString;
use sha2::Sha256;
use tracing::instrument;

use crate::config::MultipassConfig;

use super::{IdentityClaim, KeyMaterial, MultipassError};

type Aes128CbcEnc = cbc::Encryptor<aes::Aes128>;
type Aes128CbcDec = cbc::Decryptor<aes::Aes128>;
type HmacSha256 = Hmac<Sha256>;

/// Length of the random initialization vector prefix.
pub const IV_LEN: usize = 16;

/// Length of the HMAC-SHA256 tag suffix.
pub const TAG_LEN: usize = 32;

const BLOCK_LEN: usize = 16;

/// An issued Multipass token (URL-safe base64, no padding).
///
/// `Debug` is redacted: a token is a bearer credential for the customer's
/// account until it expires on the Shopify side.
#[derive(Clone, PartialEq, Eq)]
pub struct MultipassToken(String);

impl MultipassToken {
    /// The encoded token.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for MultipassToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("MultipassToken([REDACTED])")
    }
}

/// Issues and verifies Multipass tokens for one storefront.
///
/// Keys are re-derived from the configured secret on every call; nothing is
/// cached between issuances.
#[derive(Clone)]
pub struct MultipassIssuer {
    secret: SecretString,
    storefront_domain: String,
}

impl std::fmt::Debug for MultipassIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipassIssuer")
            .field("secret", &"[REDACTED]")
            .field("storefront_domain", &self.storefront_domain)
            .finish()
    }
}

impl MultipassIssuer {
    /// Create an issuer from the Multipass configuration.
    #[must_use]
    pub fn new(config: &MultipassConfig) -> Self {
        Self {
            secret: config.secret.clone(),
            storefront_domain: config.storefront_domain.clone(),
        }
    }

    /// Storefront domain tokens are redeemed on.
    #[must_use]
    pub fn storefront_domain(&self) -> &str {
        &self.storefront_domain
    }

    /// Encrypt and sign a claim.
    ///
    /// The claim is consumed; a fresh one must be built for every token.
    ///
    /// # Errors
    ///
    /// Returns `MultipassError::StaleClaim` if the claim is older than
    /// [`CLAIM_MAX_AGE_SECS`](super::CLAIM_MAX_AGE_SECS), or a key/cipher
    /// error if the secret is unusable.
    #[instrument(skip_all)]
    pub fn issue(&self, claim: IdentityClaim) -> Result<MultipassToken, MultipassError> {
        self.issue_at(&claim, Utc::now())
    }

    fn issue_at(
        &self,
        claim: &IdentityClaim,
        now: DateTime<Utc>,
    ) -> Result<MultipassToken, MultipassError> {
        claim.ensure_fresh(now)?;

        let keys = KeyMaterial::derive(&self.secret)?;
        let payload = serde_json::to_vec(claim).map_err(MultipassError::Serialize)?;

        let mut iv = [0u8; IV_LEN];
        rand::rng().fill_bytes(&mut iv);

        let token = seal(&keys, &iv, &payload)?;
        tracing::debug!(payload_len = payload.len(), "Issued Multipass token");
        Ok(token)
    }

    /// Verify and decrypt a token back into its claim.
    ///
    /// The tag is checked (in constant time) before anything is decrypted.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is not base64url, has an impossible
    /// length, fails signature verification, or does not decrypt to a claim.
    pub fn decode(&self, token: &str) -> Result<IdentityClaim, MultipassError> {
        let bytes = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| MultipassError::InvalidEncoding)?;

        let len = bytes.len();
        if len < IV_LEN + BLOCK_LEN + TAG_LEN || (len - IV_LEN - TAG_LEN) % BLOCK_LEN != 0 {
            return Err(MultipassError::InvalidLength(len));
        }

        let keys = KeyMaterial::derive(&self.secret)?;
        let (signed, tag) = bytes.split_at(len - TAG_LEN);

        let mut mac =
            HmacSha256::new_from_slice(keys.signing_key()).map_err(|_| MultipassError::Cipher)?;
        mac.update(signed);
        mac.verify_slice(tag)
            .map_err(|_| MultipassError::InvalidSignature)?;

        let (iv, ciphertext) = signed.split_at(IV_LEN);
        let plaintext = Aes128CbcDec::new_from_slices(keys.encryption_key(), iv)
            .map_err(|_| MultipassError::Cipher)?
            .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
            .map_err(|_| MultipassError::InvalidPadding)?;

        serde_json::from_slice(&plaintext).map_err(MultipassError::InvalidPayload)
    }

    /// Storefront URL that redeems the token.
    #[must_use]
    pub fn login_url(&self, token: &MultipassToken) -> String {
        format!(
            "https://{}/account/login/multipass/{}",
            self.storefront_domain,
            token.as_str()
        )
    }
}

/// Build `IV || ciphertext || tag` and encode it.
fn seal(
    keys: &KeyMaterial,
    iv: &[u8; IV_LEN],
    payload: &[u8],
) -> Result<MultipassToken, MultipassError> {
    let ciphertext = Aes128CbcEnc::new_from_slices(keys.encryption_key(), iv)
        .map_err(|_| MultipassError::Cipher)?
        .encrypt_padded_vec_mut::<Pkcs7>(payload);

    let mut mac =
        HmacSha256::new_from_slice(keys.signing_key()).map_err(|_| MultipassError::Cipher)?;
    mac.update(iv);
    mac.update(&ciphertext);
    let tag = mac.finalize().into_bytes();

    let mut raw = Vec::with_capacity(IV_LEN + ciphertext.len() + TAG_LEN);
    raw.extend_from_slice(iv);
    raw.extend_from_slice(&ciphertext);
    raw.extend_from_slice(&tag);

    Ok(MultipassToken(URL_SAFE_NO_PAD.encode(raw)))
}
