//! Shopify Admin API GraphQL client authenticated with a static access token.

use std::sync::Arc;
use std::time::Duration;

use graphql_client::GraphQLQuery;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, de::DeserializeOwned};

use crate::config::{RosterConfig, ShopifyAdminConfig};

use super::{AdminShopifyError, GraphQLError, GraphQLErrorLocation};

mod customers;
pub mod queries;

/// Request timeout for Admin API calls.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Shopify Admin API GraphQL client.
///
/// Cheap to clone; clones share one connection pool.
///
/// # Security
///
/// The access token has HIGH PRIVILEGE access to the store. It is only ever
/// sent to the configured Admin endpoint.
#[derive(Clone)]
pub struct AdminClient {
    inner: Arc<AdminClientInner>,
}

struct AdminClientInner {
    client: reqwest::Client,
    endpoint: String,
    access_token: SecretString,
    assignment_namespace: String,
    assignment_key: String,
}

impl std::fmt::Debug for AdminClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdminClient")
            .field("endpoint", &self.inner.endpoint)
            .field("access_token", &"[REDACTED]")
            .finish_non_exhaustive()
    }
}

/// GraphQL response wrapper.
#[derive(Debug, Deserialize)]
struct GraphQLResponse<T> {
    data: Option<T>,
    errors: Option<Vec<GraphQLErrorResponse>>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorResponse {
    message: String,
    #[serde(default)]
    locations: Vec<GraphQLErrorLocationResponse>,
    #[serde(default)]
    path: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct GraphQLErrorLocationResponse {
    line: i64,
    column: i64,
}

impl AdminClient {
    /// Create a new Admin API client.
    ///
    /// # Arguments
    ///
    /// * `config` - Shopify Admin API configuration
    /// * `roster` - Which metafield carries the rep assignment
    ///
    /// # Errors
    ///
    /// Returns `AdminShopifyError::Http` if the HTTP client cannot be built.
    pub fn new(config: &ShopifyAdminConfig, roster: &RosterConfig) -> Result<Self, AdminShopifyError> {
        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()?;

        Ok(Self {
            inner: Arc::new(AdminClientInner {
                client,
                endpoint: config.graphql_endpoint(),
                access_token: config.access_token.clone(),
                assignment_namespace: roster.assignment_namespace.clone(),
                assignment_key: roster.assignment_key.clone(),
            }),
        })
    }

    /// Execute a GraphQL query.
    async fn execute<Q: GraphQLQuery>(
        &self,
        variables: Q::Variables,
    ) -> Result<Q::ResponseData, AdminShopifyError>
    where
        Q::ResponseData: DeserializeOwned,
    {
        let body = Q::build_query(variables);

        let response = self
            .inner
            .client
            .post(&self.inner.endpoint)
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .header("Content-Type", "application/json")
            .json(&body)
            .send()
            .await?;

        let status = response.status();

        // Check for rate limiting
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.parse().ok())
                .unwrap_or(60);
            return Err(AdminShopifyError::RateLimited(retry_after));
        }

        // Check for unauthorized
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(AdminShopifyError::Unauthorized(
                "Invalid access token or missing read_customers scope".to_string(),
            ));
        }

        if !status.is_success() {
            return Err(AdminShopifyError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        let graphql_response: GraphQLResponse<Q::ResponseData> = serde_json::from_slice(&bytes)?;

        // Check for GraphQL errors
        if let Some(errors) = graphql_response.errors
            && !errors.is_empty()
        {
            let converted_errors: Vec<GraphQLError> = errors
                .into_iter()
                .map(|e| GraphQLError {
                    message: e.message,
                    locations: e
                        .locations
                        .into_iter()
                        .map(|l| GraphQLErrorLocation {
                            line: l.line,
                            column: l.column,
                        })
                        .collect(),
                    path: e.path,
                })
                .collect();
            return Err(AdminShopifyError::GraphQL(converted_errors));
        }

        graphql_response
            .data
            .ok_or_else(|| AdminShopifyError::GraphQL(vec![GraphQLError::message("No data in response")]))
    }
}
