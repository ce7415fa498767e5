//! Customer roster pages from the Admin API.

use tracing::{instrument, warn};

use rep_portal_core::{CustomerRecord, Email};

use crate::roster::{CustomerPage, CustomerPageSource, PageCursor, PageInfo};

use super::AdminClient;
use super::super::AdminShopifyError;
use super::queries::{GetCustomerRoster, get_customer_roster};

impl AdminClient {
    /// Get one page of customers with their rep assignment.
    ///
    /// # Arguments
    ///
    /// * `first` - Number of customers to return
    /// * `after` - Cursor for pagination
    ///
    /// # Errors
    ///
    /// Returns an error if the API request fails or returns an error response.
    #[instrument(skip(self, after), fields(has_cursor = after.is_some()))]
    pub async fn get_customer_page(
        &self,
        first: u32,
        after: Option<&PageCursor>,
    ) -> Result<CustomerPage, AdminShopifyError> {
        let variables = get_customer_roster::Variables {
            first: i64::from(first),
            after: after.map(|c| c.as_str().to_string()),
            namespace: self.inner.assignment_namespace.clone(),
            key: self.inner.assignment_key.clone(),
        };

        let response = self.execute::<GetCustomerRoster>(variables).await?;

        Ok(convert_customer_page(response.customers))
    }
}

impl CustomerPageSource for AdminClient {
    type Error = AdminShopifyError;

    async fn fetch_page(
        &self,
        first: u32,
        after: Option<&PageCursor>,
    ) -> Result<CustomerPage, AdminShopifyError> {
        self.get_customer_page(first, after).await
    }
}

// =============================================================================
// Conversions
// =============================================================================

fn convert_customer_page(customers: get_customer_roster::GetCustomerRosterCustomers) -> CustomerPage {
    CustomerPage {
        received: customers.nodes.len(),
        customers: customers
            .nodes
            .into_iter()
            .filter_map(convert_customer)
            .collect(),
        page_info: PageInfo {
            has_next_page: customers.page_info.has_next_page,
            end_cursor: customers.page_info.end_cursor.map(PageCursor::new),
        },
    }
}

/// Adapt one customer node. Customers without a usable email cannot sign in
/// through Multipass and are left out.
fn convert_customer(node: get_customer_roster::GetCustomerRosterCustomersNodes) -> Option<CustomerRecord> {
    let raw_email = node
        .default_email_address
        .and_then(|e| e.email_address)
        .unwrap_or_default();

    let email = match Email::parse(&raw_email) {
        Ok(email) => email,
        Err(e) => {
            warn!(display_name = %node.display_name, error = %e, "Skipping customer without usable email");
            return None;
        }
    };

    let mut record = CustomerRecord::new(email)
        .with_assignment(node.metafield.as_ref().map(|m| m.value.as_str()));
    record.display_name = non_blank(Some(node.display_name));
    record.customer_number = non_blank(node.note);
    record.company = non_blank(node.default_address.and_then(|a| a.company));

    Some(record)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
