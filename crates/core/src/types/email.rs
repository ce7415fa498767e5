//! Email address type.
//!
//! Customer records and representative identities are both keyed by email.
//! Comparisons between the two are case-insensitive, so the canonical form
//! used for matching is trimmed and lower-cased (see [`Email::normalized`]).

use core::fmt;

use serde::{Deserialize, Serialize};

/// Errors that can occur when parsing an [`Email`].
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum EmailError {
    /// The input string is empty (after trimming).
    #[error("email cannot be empty")]
    Empty,
    /// The input string is too long.
    #[error("email must be at most {max} characters")]
    TooLong {
        /// Maximum allowed length.
        max: usize,
    },
    /// The input does not contain an @ symbol.
    #[error("email must contain an @ symbol")]
    MissingAtSymbol,
    /// The local part (before @) is empty.
    #[error("email local part cannot be empty")]
    EmptyLocalPart,
    /// The domain part (after @) is empty.
    #[error("email domain cannot be empty")]
    EmptyDomain,
    /// The input contains whitespace inside the address.
    #[error("email cannot contain whitespace")]
    ContainsWhitespace,
}

/// An email address.
///
/// Surrounding whitespace is stripped on parse; the original casing is
/// kept so the address can be handed to Shopify exactly as stored there.
///
/// ## Constraints
///
/// - Length: 1-254 characters (RFC 5321 limit)
/// - Must contain an @ symbol with a non-empty local part and domain
/// - No inner whitespace
///
/// ## Examples
///
/// ```
/// use rep_portal_core::Email;
///
/// assert!(Email::parse("user@example.com").is_ok());
/// assert!(Email::parse("  user@example.com\n").is_ok());
///
/// assert!(Email::parse("").is_err());
/// assert!(Email::parse("no-at-symbol").is_err());
/// assert!(Email::parse("@domain.com").is_err());
/// assert!(Email::parse("user@").is_err());
///
/// let rep = Email::parse("Rep.One@X.com").unwrap().normalized();
/// assert_eq!(rep.as_str(), "rep.one@x.com");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Maximum length of an email address (RFC 5321).
    pub const MAX_LENGTH: usize = 254;

    /// Parse an `Email` from a string.
    ///
    /// # Errors
    ///
    /// Returns an error if the trimmed input:
    /// - Is empty
    /// - Is longer than 254 characters
    /// - Does not contain an @ symbol
    /// - Has an empty local part or domain
    /// - Contains whitespace
    pub fn parse(s: &str) -> Result<Self, EmailError> {
        let s = s.trim();

        if s.is_empty() {
            return Err(EmailError::Empty);
        }

        if s.len() > Self::MAX_LENGTH {
            return Err(EmailError::TooLong {
                max: Self::MAX_LENGTH,
            });
        }

        if s.chars().any(char::is_whitespace) {
            return Err(EmailError::ContainsWhitespace);
        }

        let at_pos = s.rfind('@').ok_or(EmailError::MissingAtSymbol)?;

        if at_pos == 0 {
            return Err(EmailError::EmptyLocalPart);
        }

        if at_pos == s.len() - 1 {
            return Err(EmailError::EmptyDomain);
        }

        Ok(Self(s.to_owned()))
    }

    /// Returns the lower-cased form used for case-insensitive matching.
    #[must_use]
    pub fn normalized(&self) -> Self {
        Self(self.0.to_lowercase())
    }

    /// Returns the email address as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Email {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Email {
    type Err = EmailError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for Email {
    type Error = EmailError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl AsRef<str> for Email {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_emails() {
        assert!(Email::parse("user@example.com").is_ok());
        assert!(Email::parse("user.name+tag@example.com").is_ok());
        assert!(Email::parse("user@subdomain.example.co.uk").is_ok());
        assert!(Email::parse("a@b.c").is_ok());
    }

    #[test]
    fn test_parse_trims_surrounding_whitespace() {
        let email = Email::parse("  rep@example.com\r\n").unwrap();
        assert_eq!(email.as_str(), "rep@example.com");
    }

    #[test]
    fn test_parse_empty() {
        assert_eq!(Email::parse(""), Err(EmailError::Empty));
        assert_eq!(Email::parse("   "), Err(EmailError::Empty));
    }

    #[test]
    fn test_parse_too_long() {
        let long = format!("{}@example.com", "a".repeat(250));
        assert!(matches!(
            Email::parse(&long),
            Err(EmailError::TooLong { .. })
        ));
    }

    #[test]
    fn test_parse_inner_whitespace() {
        assert_eq!(
            Email::parse("rep one@example.com"),
            Err(EmailError::ContainsWhitespace)
        );
    }

    #[test]
    fn test_parse_missing_parts() {
        assert_eq!(Email::parse("no-at-symbol"), Err(EmailError::MissingAtSymbol));
        assert_eq!(Email::parse("@domain.com"), Err(EmailError::EmptyLocalPart));
        assert_eq!(Email::parse("user@"), Err(EmailError::EmptyDomain));
    }

    #[test]
    fn test_normalized_keeps_original() {
        let email = Email::parse("Rep.One@Example.COM").unwrap();
        assert_eq!(email.normalized().as_str(), "rep.one@example.com");
        assert_eq!(email.as_str(), "Rep.One@Example.COM");
    }

    #[test]
    fn test_normalized_equality() {
        let a = Email::parse("REP@x.com").unwrap();
        let b = Email::parse("rep@X.COM").unwrap();
        assert_eq!(a.normalized(), b.normalized());
        assert_ne!(a, b);
    }

    #[test]
    fn test_deserialize_validates() {
        let parsed: Email = serde_json::from_str("\"user@example.com\"").unwrap();
        assert_eq!(parsed.as_str(), "user@example.com");

        assert!(serde_json::from_str::<Email>("\"not-an-email\"").is_err());
    }
}
