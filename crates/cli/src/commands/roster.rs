//! Roster check command.
//!
//! Runs the same roster fetch and assignment filter as `GET /customers`,
//! which is handy for checking a rep's metafield entries.
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE`, `SHOPIFY_ADMIN_ACCESS_TOKEN` - Admin API access
//! - `ROSTER_*` - Page size, ceiling and assignment metafield

use std::io::Write;

use rep_portal::config::{RosterConfig, ShopifyAdminConfig};
use rep_portal::roster::{AssignmentResolver, CustomerRepository, RosterLimits, search};
use rep_portal::shopify::AdminClient;
use rep_portal_core::Email;

use super::CommandError;

/// Print the customers assigned to `rep`, one per line.
pub async fn list(rep: &str, query: Option<&str>) -> Result<(), CommandError> {
    dotenvy::dotenv().ok();

    let rep = Email::parse(rep)?;
    let shopify = ShopifyAdminConfig::from_env()?;
    let roster_config = RosterConfig::from_env()?;

    let client = AdminClient::new(&shopify, &roster_config)?;
    let repository = CustomerRepository::new(client, RosterLimits::try_from(&roster_config)?);

    tracing::info!(endpoint = %shopify.graphql_endpoint(), "Fetching roster...");
    let roster = repository.fetch_all().await?;
    let total = roster.len();

    let assigned = AssignmentResolver::new(rep.as_str()).assigned_to(roster);
    let customers = match query {
        Some(q) => search(assigned, q),
        None => assigned,
    };

    let mut stdout = std::io::stdout().lock();
    for customer in &customers {
        writeln!(
            stdout,
            "{}\t{}\t{}\t{}",
            customer.email,
            customer.display_name.as_deref().unwrap_or("-"),
            customer.company.as_deref().unwrap_or("-"),
            customer.customer_number.as_deref().unwrap_or("-"),
        )?;
    }

    tracing::info!("{} of {} customers assigned to {}", customers.len(), total, rep);
    Ok(())
}
