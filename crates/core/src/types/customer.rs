//! Customer roster record.

use serde::{Deserialize, Serialize};

use super::assignment::AssignedReps;
use super::email::Email;

/// One customer from a roster snapshot.
///
/// Records are immutable once fetched; every request that needs the roster
/// fetches a fresh one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    /// Customer email, unique within a roster snapshot.
    pub email: Email,
    /// Display name as shown in Shopify.
    pub display_name: Option<String>,
    /// Customer number (kept in the Shopify customer note).
    pub customer_number: Option<String>,
    /// Company from the default address.
    pub company: Option<String>,
    /// Representatives assigned to this customer.
    #[serde(default, skip_serializing_if = "AssignedReps::is_empty")]
    pub assigned_reps: AssignedReps,
}

impl CustomerRecord {
    /// Create a record with only an email and no assignment.
    #[must_use]
    pub fn new(email: Email) -> Self {
        Self {
            email,
            display_name: None,
            customer_number: None,
            company: None,
            assigned_reps: AssignedReps::default(),
        }
    }

    /// Set the assignment parsed from the raw metafield text.
    #[must_use]
    pub fn with_assignment(mut self, raw: Option<&str>) -> Self {
        self.assigned_reps = AssignedReps::from_field(raw);
        self
    }

    /// Whether any searchable field contains `needle` (case-insensitive).
    ///
    /// Searches display name, company, email and customer number. An empty
    /// needle matches every record.
    #[must_use]
    pub fn matches_search(&self, needle: &str) -> bool {
        let needle = needle.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }

        [
            self.display_name.as_deref(),
            self.company.as_deref(),
            Some(self.email.as_str()),
            self.customer_number.as_deref(),
        ]
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
    }
}
