//! Portal configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `PORTAL_BASE_URL` - Public URL of the portal (decides Secure cookies)
//! - `SHOPIFY_STORE` - Shopify store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ADMIN_ACCESS_TOKEN` - Admin API access token (HIGH PRIVILEGE)
//! - `MULTIPASS_SECRET` - Shared Multipass secret from the Shopify admin
//! - `SALES_REP_PASSWORD_HASH` - argon2 PHC hash of the sales rep password
//!
//! ## Optional
//! - `PORTAL_HOST` - Bind address (default: 127.0.0.1)
//! - `PORTAL_PORT` - Listen port (default: 10000)
//! - `SHOPIFY_API_VERSION` - API version (default: 2025-01)
//! - `SHOPIFY_ADMIN_ENDPOINT` - Full GraphQL endpoint URL override
//! - `SHOPIFY_CUSTOM_DOMAIN` - Storefront domain that redeems Multipass
//!   tokens (default: `SHOPIFY_STORE`)
//! - `ROSTER_PAGE_SIZE` - Customers per Admin API page (default: 100, max 250)
//! - `ROSTER_MAX_TOTAL` - Upper bound on customers fetched per roster (default: 1000)
//! - `ROSTER_ASSIGNMENT_NAMESPACE` - Metafield namespace (default: custom)
//! - `ROSTER_ASSIGNMENT_KEY` - Metafield key (default: `sales_reps`)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT`, `SENTRY_SAMPLE_RATE`, `SENTRY_TRACES_SAMPLE_RATE`

use std::collections::HashMap;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use secrecy::{ExposeSecret, SecretString};
use thiserror::Error;

const MIN_MULTIPASS_SECRET_LENGTH: usize = 16;
const MIN_ENTROPY_BITS_PER_CHAR: f64 = 3.3;
const DEFAULT_API_VERSION: &str = "2025-01";

/// Largest `first:` argument the Admin API accepts on a connection.
pub const MAX_PAGE_SIZE: u32 = 250;
/// Default customers per page.
pub const DEFAULT_PAGE_SIZE: u32 = 100;
/// Default roster ceiling.
pub const DEFAULT_MAX_TOTAL: usize = 1000;

/// Blocklist of common placeholder patterns (case-insensitive)
const PLACEHOLDER_PATTERNS: &[&str] = &[
    "your-",
    "changeme",
    "replace",
    "placeholder",
    "example",
    "password",
    "xxx",
    "todo",
    "fixme",
    "insert",
    "enter-",
    "put-your",
    "add-your",
];

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
    #[error("Insecure secret in {0}: {1}")]
    InsecureSecret(String, String),
}

/// Portal application configuration.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL for the portal
    pub base_url: String,
    /// Shopify Admin API configuration
    pub shopify: ShopifyAdminConfig,
    /// Multipass signing configuration
    pub multipass: MultipassConfig,
    /// Roster retrieval limits
    pub roster: RosterConfig,
    /// argon2 PHC hash of the shared sales rep password
    pub rep_password_hash: SecretString,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate for performance monitoring (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

/// Shopify Admin API configuration.
///
/// Implements `Debug` manually to redact the HIGH PRIVILEGE access token.
#[derive(Clone)]
pub struct ShopifyAdminConfig {
    /// Shopify store domain (e.g., your-store.myshopify.com)
    pub store: String,
    /// Shopify API version (e.g., 2025-01)
    pub api_version: String,
    /// Admin API access token (HIGH PRIVILEGE - full store access)
    pub access_token: SecretString,
    /// Full GraphQL endpoint, overriding the one built from `store`
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for ShopifyAdminConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ShopifyAdminConfig")
            .field("store", &self.store)
            .field("api_version", &self.api_version)
            .field("access_token", &"[REDACTED]")
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

impl ShopifyAdminConfig {
    /// Admin GraphQL endpoint URL.
    #[must_use]
    pub fn graphql_endpoint(&self) -> String {
        self.endpoint.clone().unwrap_or_else(|| {
            format!(
                "https://{}/admin/api/{}/graphql.json",
                self.store, self.api_version
            )
        })
    }

    /// Load the Admin API configuration on its own (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the store or access token is missing, or the
    /// endpoint override is not a valid URL.
    pub fn from_env() -> Result<Self, ConfigError> {
        let endpoint = get_optional_env("SHOPIFY_ADMIN_ENDPOINT")
            .map(|raw| {
                url::Url::parse(&raw)
                    .map(|_| raw)
                    .map_err(|e| ConfigError::InvalidEnvVar("SHOPIFY_ADMIN_ENDPOINT".to_string(), e.to_string()))
            })
            .transpose()?;

        Ok(Self {
            store: get_required_env("SHOPIFY_STORE")?,
            api_version: get_env_or_default("SHOPIFY_API_VERSION", DEFAULT_API_VERSION),
            access_token: get_validated_secret("SHOPIFY_ADMIN_ACCESS_TOKEN")?,
            endpoint,
        })
    }
}

/// Multipass signing configuration.
///
/// Implements `Debug` manually to redact the shared secret.
#[derive(Clone)]
pub struct MultipassConfig {
    /// Shared Multipass secret
    pub secret: SecretString,
    /// Storefront domain that redeems tokens (e.g., shop.example.com)
    pub storefront_domain: String,
}

impl std::fmt::Debug for MultipassConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MultipassConfig")
            .field("secret", &"[REDACTED]")
            .field("storefront_domain", &self.storefront_domain)
            .finish()
    }
}

impl MultipassConfig {
    /// Load the Multipass configuration on its own (used by the CLI).
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the secret is missing, too short or looks
    /// like a placeholder, or no storefront domain can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        let secret = get_validated_secret("MULTIPASS_SECRET")?;
        validate_min_length(&secret, MIN_MULTIPASS_SECRET_LENGTH, "MULTIPASS_SECRET")?;

        let storefront_domain = match get_optional_env("SHOPIFY_CUSTOM_DOMAIN") {
            Some(domain) => domain,
            None => get_required_env("SHOPIFY_STORE")?,
        };

        Ok(Self {
            secret,
            storefront_domain: normalize_domain(&storefront_domain),
        })
    }
}

/// Roster retrieval configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterConfig {
    /// Customers requested per page
    pub page_size: u32,
    /// Maximum customers collected per roster
    pub max_total: usize,
    /// Namespace of the assignment metafield
    pub assignment_namespace: String,
    /// Key of the assignment metafield
    pub assignment_key: String,
}

impl Default for RosterConfig {
    fn default() -> Self {
        Self {
            page_size: DEFAULT_PAGE_SIZE,
            max_total: DEFAULT_MAX_TOTAL,
            assignment_namespace: "custom".to_string(),
            assignment_key: "sales_reps".to_string(),
        }
    }
}

impl RosterConfig {
    /// Load roster limits from environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidEnvVar` if a limit is not a number or is
    /// out of range.
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let page_size = parse_env("ROSTER_PAGE_SIZE", defaults.page_size)?;
        if page_size == 0 || page_size > MAX_PAGE_SIZE {
            return Err(ConfigError::InvalidEnvVar(
                "ROSTER_PAGE_SIZE".to_string(),
                format!("must be between 1 and {MAX_PAGE_SIZE} (got {page_size})"),
            ));
        }

        let max_total = parse_env("ROSTER_MAX_TOTAL", defaults.max_total)?;
        if max_total == 0 {
            return Err(ConfigError::InvalidEnvVar(
                "ROSTER_MAX_TOTAL".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        Ok(Self {
            page_size,
            max_total,
            assignment_namespace: get_env_or_default(
                "ROSTER_ASSIGNMENT_NAMESPACE",
                &defaults.assignment_namespace,
            ),
            assignment_key: get_env_or_default("ROSTER_ASSIGNMENT_KEY", &defaults.assignment_key),
        })
    }
}

impl PortalConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing, invalid, or
    /// if secrets fail validation (placeholder detection, entropy check).
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("PORTAL_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("PORTAL_HOST".to_string(), e.to_string()))?;
        let port = parse_env("PORTAL_PORT", 10000_u16)?;
        let base_url = get_required_env("PORTAL_BASE_URL")?;
        url::Url::parse(&base_url)
            .map_err(|e| ConfigError::InvalidEnvVar("PORTAL_BASE_URL".to_string(), e.to_string()))?;

        let shopify = ShopifyAdminConfig::from_env()?;
        let multipass = MultipassConfig::from_env()?;
        let roster = RosterConfig::from_env()?;
        let rep_password_hash = get_password_hash("SALES_REP_PASSWORD_HASH")?;

        let sentry_dsn = get_optional_env("SENTRY_DSN");
        let sentry_environment = get_optional_env("SENTRY_ENVIRONMENT");
        let sentry_sample_rate = get_optional_env("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(1.0);
        let sentry_traces_sample_rate = get_optional_env("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(0.1);

        Ok(Self {
            host,
            port,
            base_url,
            shopify,
            multipass,
            roster,
            rep_password_hash,
            sentry_dsn,
            sentry_environment,
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the portal is served over HTTPS.
    #[must_use]
    pub fn is_secure(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable (empty counts as unset).
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|value| !value.trim().is_empty())
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    get_optional_env(key).unwrap_or_else(|| default.to_string())
}

/// Parse an optional environment variable, falling back to `default`.
fn parse_env<T>(key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    get_optional_env(key).map_or(Ok(default), |raw| parse_value(key, &raw))
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

/// Strip a scheme and trailing slashes from a domain setting.
fn normalize_domain(raw: &str) -> String {
    let raw = raw.trim();
    let raw = raw
        .strip_prefix("https://")
        .or_else(|| raw.strip_prefix("http://"))
        .unwrap_or(raw);
    raw.trim_end_matches('/').to_string()
}

/// Validate that a secret meets a minimum length.
fn validate_min_length(secret: &SecretString, min: usize, var_name: &str) -> Result<(), ConfigError> {
    let value = secret.expose_secret();
    if value.len() < min {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("must be at least {min} characters (got {})", value.len()),
        ));
    }
    Ok(())
}

/// Calculate Shannon entropy in bits per character.
fn shannon_entropy(s: &str) -> f64 {
    if s.is_empty() {
        return 0.0;
    }

    let mut freq: HashMap<char, usize> = HashMap::new();
    for c in s.chars() {
        *freq.entry(c).or_insert(0) += 1;
    }

    #[allow(clippy::cast_precision_loss)] // String length will never exceed f64 precision
    let len = s.chars().count() as f64;
    freq.values()
        .map(|&count| {
            #[allow(clippy::cast_precision_loss)] // Character count will never exceed f64 precision
            let p = count as f64 / len;
            -p * p.log2()
        })
        .sum()
}

/// Validate that a secret is not a placeholder and has sufficient entropy.
fn validate_secret_strength(secret: &str, var_name: &str) -> Result<(), ConfigError> {
    let lower = secret.to_lowercase();

    if let Some(pattern) = PLACEHOLDER_PATTERNS.iter().find(|p| lower.contains(*p)) {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!("appears to be a placeholder (contains '{pattern}')"),
        ));
    }

    let entropy = shannon_entropy(secret);
    if entropy < MIN_ENTROPY_BITS_PER_CHAR {
        return Err(ConfigError::InsecureSecret(
            var_name.to_string(),
            format!(
                "entropy too low ({entropy:.2} bits/char, need >= {MIN_ENTROPY_BITS_PER_CHAR:.1}). Use a randomly generated secret."
            ),
        ));
    }

    Ok(())
}

/// Load and validate a secret from environment.
fn get_validated_secret(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_secret_strength(&value, key)?;
    Ok(SecretString::from(value))
}

/// Load an argon2 PHC string and check it parses.
fn get_password_hash(key: &str) -> Result<SecretString, ConfigError> {
    let value = get_required_env(key)?;
    validate_password_hash(&value, key)?;
    Ok(SecretString::from(value))
}

fn validate_password_hash(value: &str, var_name: &str) -> Result<(), ConfigError> {
    argon2::PasswordHash::new(value.trim())
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidEnvVar(var_name.to_string(), format!("not a PHC hash: {e}")))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_shannon_entropy_empty() {
        assert!((shannon_entropy("") - 0.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_shannon_entropy_two_chars() {
        let entropy = shannon_entropy("ab");
        assert!((entropy - 1.0).abs() < 0.01);
    }

    #[test]
    fn test_hex_multipass_secret_passes_strength_check() {
        assert!(validate_secret_strength("9c1f4e7a2b6d8053e4a1c7f2d9b30e6a", "MULTIPASS_SECRET").is_ok());
    }

    #[test]
    fn test_validate_secret_strength_placeholder() {
        let err = validate_secret_strength("your-multipass-key", "MULTIPASS_SECRET").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_validate_secret_strength_low_entropy() {
        let err = validate_secret_strength("aaaaaaaaaaaaaaaaaaaaaaaa", "TEST_VAR").unwrap_err();
        assert!(matches!(err, ConfigError::InsecureSecret(_, _)));
    }

    #[test]
    fn test_multipass_secret_min_length() {
        let short = SecretString::from("9c1f4e7a");
        assert!(validate_min_length(&short, MIN_MULTIPASS_SECRET_LENGTH, "MULTIPASS_SECRET").is_err());

        let ok = SecretString::from("9c1f4e7a2b6d8053");
        assert!(validate_min_length(&ok, MIN_MULTIPASS_SECRET_LENGTH, "MULTIPASS_SECRET").is_ok());
    }

    #[test]
    fn test_parse_value() {
        assert_eq!(parse_value::<u32>("ROSTER_PAGE_SIZE", " 50 ").unwrap(), 50);
        let err = parse_value::<u32>("ROSTER_PAGE_SIZE", "fifty").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidEnvVar(key, _) if key == "ROSTER_PAGE_SIZE"));
    }

    #[test]
    fn test_normalize_domain() {
        assert_eq!(normalize_domain("https://b2b.example.com/"), "b2b.example.com");
        assert_eq!(normalize_domain("shop.myshopify.com"), "shop.myshopify.com");
    }

    #[test]
    fn test_validate_password_hash() {
        let phc = "$argon2id$v=19$m=19456,t=2,p=1$c29tZXNhbHRzb21lc2FsdA$R1jUTbs5UqRwzDmhoQkbuLq+h4pqdm79W9yfbwqbQ1o";
        assert!(validate_password_hash(phc, "SALES_REP_PASSWORD_HASH").is_ok());
        assert!(validate_password_hash("plaintext", "SALES_REP_PASSWORD_HASH").is_err());
    }

    #[test]
    fn test_roster_defaults() {
        let roster = RosterConfig::default();
        assert_eq!(roster.page_size, 100);
        assert_eq!(roster.max_total, 1000);
        assert_eq!(roster.assignment_namespace, "custom");
        assert_eq!(roster.assignment_key, "sales_reps");
    }

    #[test]
    fn test_graphql_endpoint() {
        let mut config = ShopifyAdminConfig {
            store: "test.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_test"),
            endpoint: None,
        };
        assert_eq!(
            config.graphql_endpoint(),
            "https://test.myshopify.com/admin/api/2025-01/graphql.json"
        );

        config.endpoint = Some("http://127.0.0.1:9999/graphql".to_string());
        assert_eq!(config.graphql_endpoint(), "http://127.0.0.1:9999/graphql");
    }

    #[test]
    fn test_shopify_admin_config_debug_redacts_secrets() {
        let config = ShopifyAdminConfig {
            store: "test.myshopify.com".to_string(),
            api_version: "2025-01".to_string(),
            access_token: SecretString::from("shpat_super_secret_token"),
            endpoint: None,
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("test.myshopify.com"));
        assert!(debug_output.contains("[REDACTED]"));
        assert!(!debug_output.contains("shpat_super_secret_token"));
    }

    #[test]
    fn test_multipass_config_debug_redacts_secret() {
        let config = MultipassConfig {
            secret: SecretString::from("9c1f4e7a2b6d8053e4a1c7f2d9b30e6a"),
            storefront_domain: "b2b.example.com".to_string(),
        };

        let debug_output = format!("{config:?}");
        assert!(debug_output.contains("b2b.example.com"));
        assert!(!debug_output.contains("9c1f4e7a2b6d8053e4a1c7f2d9b30e6a"));
    }
}
