//! The identity claim carried inside a Multipass token.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};

use rep_portal_core::Email;

use super::MultipassError;

/// Maximum age of a claim at issuance time.
pub const CLAIM_MAX_AGE_SECS: i64 = 60;

/// Tolerated clock skew for claims dated slightly in the future.
const CLAIM_FUTURE_SKEW_SECS: i64 = 5;

/// Plaintext payload encrypted into a Multipass token.
///
/// Serialized as `{"email": ..., "created_at": ...}` in that order, which is
/// what Shopify expects. `created_at` is stamped when the claim is built and
/// cannot be set by callers.
#[derive(Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaim {
    email: Email,
    #[serde(with = "iso8601_millis")]
    created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    return_to: Option<String>,
}

impl IdentityClaim {
    /// Build a claim for `email`, issued now.
    #[must_use]
    pub fn new(email: Email) -> Self {
        Self {
            email,
            created_at: Utc::now().trunc_subsecs(3),
            return_to: None,
        }
    }

    /// Land the customer on a storefront path after sign-in.
    ///
    /// # Errors
    ///
    /// Returns `MultipassError::InvalidReturnTo` unless `path` is a
    /// storefront-relative path (starts with a single `/`).
    pub fn with_return_to(mut self, path: &str) -> Result<Self, MultipassError> {
        let path = path.trim();
        if !path.starts_with('/') || path.starts_with("//") || path.contains('\\') {
            return Err(MultipassError::InvalidReturnTo(path.to_string()));
        }
        self.return_to = Some(path.to_string());
        Ok(self)
    }

    /// Customer the token signs in as.
    #[must_use]
    pub const fn email(&self) -> &Email {
        &self.email
    }

    /// When the claim was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Storefront path to land on after sign-in.
    #[must_use]
    pub fn return_to(&self) -> Option<&str> {
        self.return_to.as_deref()
    }

    /// Check the claim is fresh enough to issue at `now`.
    pub(super) fn ensure_fresh(&self, now: DateTime<Utc>) -> Result<(), MultipassError> {
        let age_secs = (now - self.created_at).num_seconds();
        if age_secs > CLAIM_MAX_AGE_SECS || age_secs < -CLAIM_FUTURE_SKEW_SECS {
            return Err(MultipassError::StaleClaim { age_secs });
        }
        Ok(())
    }

    #[cfg(test)]
    pub(super) fn backdated(email: Email, created_at: DateTime<Utc>) -> Self {
        Self {
            email,
            created_at,
            return_to: None,
        }
    }
}

/// ISO-8601 with millisecond precision and a `Z` suffix
/// (`2025-01-31T09:15:00.000Z`).
mod iso8601_millis {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}
