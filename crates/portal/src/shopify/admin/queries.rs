//! GraphQL query definitions for the Shopify Admin API.
//!
//! The portal sends a single query, so its request/response types are
//! written out in the shape `#[derive(GraphQLQuery)]` would produce instead
//! of generating them from the full Admin schema dump.

use graphql_client::{GraphQLQuery, QueryBody};

// =============================================================================
// Customer roster
// =============================================================================

/// One page of the customer roster with the assignment metafield.
pub struct GetCustomerRoster;

pub mod get_customer_roster {
    use serde::{Deserialize, Serialize};

    pub const OPERATION_NAME: &str = "GetCustomerRoster";
    pub const QUERY: &str = r"query GetCustomerRoster($first: Int!, $after: String, $namespace: String!, $key: String!) {
  customers(first: $first, after: $after) {
    pageInfo {
      hasNextPage
      endCursor
    }
    nodes {
      displayName
      note
      defaultEmailAddress {
        emailAddress
      }
      defaultAddress {
        company
      }
      metafield(namespace: $namespace, key: $key) {
        value
      }
    }
  }
}";

    #[derive(Debug, Clone, Serialize)]
    pub struct Variables {
        pub first: i64,
        pub after: Option<String>,
        pub namespace: String,
        pub key: String,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct ResponseData {
        pub customers: GetCustomerRosterCustomers,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct GetCustomerRosterCustomers {
        #[serde(rename = "pageInfo")]
        pub page_info: GetCustomerRosterCustomersPageInfo,
        pub nodes: Vec<GetCustomerRosterCustomersNodes>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct GetCustomerRosterCustomersPageInfo {
        #[serde(rename = "hasNextPage")]
        pub has_next_page: bool,
        #[serde(rename = "endCursor")]
        pub end_cursor: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct GetCustomerRosterCustomersNodes {
        #[serde(rename = "displayName")]
        pub display_name: String,
        pub note: Option<String>,
        #[serde(rename = "defaultEmailAddress")]
        pub default_email_address: Option<GetCustomerRosterCustomersNodesDefaultEmailAddress>,
        #[serde(rename = "defaultAddress")]
        pub default_address: Option<GetCustomerRosterCustomersNodesDefaultAddress>,
        pub metafield: Option<GetCustomerRosterCustomersNodesMetafield>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct GetCustomerRosterCustomersNodesDefaultEmailAddress {
        #[serde(rename = "emailAddress")]
        pub email_address: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct GetCustomerRosterCustomersNodesDefaultAddress {
        pub company: Option<String>,
    }

    #[derive(Debug, Clone, Deserialize)]
    pub struct GetCustomerRosterCustomersNodesMetafield {
        pub value: String,
    }
}

impl GraphQLQuery for GetCustomerRoster {
    type Variables = get_customer_roster::Variables;
    type ResponseData = get_customer_roster::ResponseData;

    fn build_query(variables: Self::Variables) -> QueryBody<Self::Variables> {
        QueryBody {
            variables,
            query: get_customer_roster::QUERY,
            operation_name: get_customer_roster::OPERATION_NAME,
        }
    }
}
