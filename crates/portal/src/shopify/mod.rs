//! Shopify Admin API client (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **This module holds the Shopify Admin API access token.** The portal only
//! reads customers with it, but the token itself can usually do far more, so
//! it never leaves the server and is redacted from every `Debug` output.
//!
//! # Architecture
//!
//! - `graphql_client` request envelope, sent with `reqwest`
//! - Direct API calls to Shopify on every request (no local sync)
//! - Rate limiting and auth failures surface as typed errors
//!
//! # Example
//!
//! ```rust,ignore
//! use rep_portal::shopify::AdminClient;
//!
//! let client = AdminClient::new(&config.shopify, &config.roster)?;
//! let page = client.get_customer_page(100, None).await?;
//! ```

mod admin;

pub use admin::AdminClient;

use thiserror::Error;

/// Errors that can occur when interacting with Shopify Admin API.
#[derive(Debug, Error)]
pub enum AdminShopifyError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Shopify answered with an unexpected HTTP status.
    #[error("Unexpected status {0}")]
    Status(u16),

    /// GraphQL query returned errors.
    #[error("GraphQL errors: {}", format_graphql_errors(.0))]
    GraphQL(Vec<GraphQLError>),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// A GraphQL error returned by the Shopify Admin API.
#[derive(Debug, Clone)]
pub struct GraphQLError {
    /// Error message.
    pub message: String,
    /// Source locations in the query.
    pub locations: Vec<GraphQLErrorLocation>,
    /// Path to the error in the response.
    pub path: Vec<serde_json::Value>,
}

/// Location in a GraphQL query where an error occurred.
#[derive(Debug, Clone)]
pub struct GraphQLErrorLocation {
    /// Line number (1-indexed).
    pub line: i64,
    /// Column number (1-indexed).
    pub column: i64,
}

impl GraphQLError {
    /// An error without location information.
    #[must_use]
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: vec![],
            path: vec![],
        }
    }
}

fn format_graphql_errors(errors: &[GraphQLError]) -> String {
    errors
        .iter()
        .map(|e| e.message.clone())
        .collect::<Vec<_>>()
        .join("; ")
}
