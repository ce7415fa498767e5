//! Which roster records a representative may act on.

use rep_portal_core::CustomerRecord;

/// Resolves roster membership for one representative.
///
/// The identity is normalized once (trimmed, lower-cased); each record's
/// assignment was normalized when it was adapted from Shopify, so the check
/// is an exact set lookup. An empty identity is assigned nothing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssignmentResolver {
    rep: String,
}

impl AssignmentResolver {
    /// Resolver for the representative identified by `rep`.
    #[must_use]
    pub fn new(rep: &str) -> Self {
        Self {
            rep: rep.trim().to_lowercase(),
        }
    }

    /// The normalized representative identity.
    #[must_use]
    pub fn rep(&self) -> &str {
        &self.rep
    }

    /// Whether `record` lists this representative.
    #[must_use]
    pub fn is_assigned(&self, record: &CustomerRecord) -> bool {
        record.assigned_reps.contains(&self.rep)
    }

    /// Keep only the records assigned to this representative, preserving order.
    #[must_use]
    pub fn assigned_to(&self, records: Vec<CustomerRecord>) -> Vec<CustomerRecord> {
        records
            .into_iter()
            .filter(|record| self.is_assigned(record))
            .collect()
    }

    /// Find the assigned record with `email` (case-insensitive).
    #[must_use]
    pub fn find_assigned<'a>(&self, records: &'a [CustomerRecord], email: &str) -> Option<&'a CustomerRecord> {
        let email = email.trim();
        records
            .iter()
            .find(|record| record.email.as_str().eq_ignore_ascii_case(email))
            .filter(|record| self.is_assigned(record))
    }
}

/// Filter `records` by a free-text query, preserving order.
///
/// Matches display name, company, email and customer number
/// case-insensitively. A blank query keeps everything.
#[must_use]
pub fn search(records: Vec<CustomerRecord>, query: &str) -> Vec<CustomerRecord> {
    if query.trim().is_empty() {
        return records;
    }
    records
        .into_iter()
        .filter(|record| record.matches_search(query))
        .collect()
}
