//! Normalized set of representative identities assigned to a customer.
//!
//! Shopify stores the assignment as a free-text metafield. Editors separate
//! entries with newlines, commas or semicolons (often mixed), so the raw
//! value is split on all three, each entry trimmed and lower-cased, and
//! empty entries dropped. Membership is exact on the normalized form.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// Delimiters accepted between identities in the raw assignment text.
pub const ASSIGNMENT_DELIMITERS: [char; 3] = ['\n', ',', ';'];

/// Set of representative identities permitted to act on a customer.
///
/// ```
/// use rep_portal_core::AssignedReps;
///
/// let reps = AssignedReps::parse("Rep.One@x.com; rep.two@x.com\nrep.three@x.com");
/// assert!(reps.contains("REP.ONE@X.COM"));
/// assert!(reps.contains(" rep.two@x.com "));
/// assert!(!reps.contains("rep"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AssignedReps(BTreeSet<String>);

impl AssignedReps {
    /// Parse the raw metafield text.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        Self(
            raw.split(ASSIGNMENT_DELIMITERS)
                .map(normalize)
                .filter(|entry| !entry.is_empty())
                .collect(),
        )
    }

    /// Parse an optional metafield value; absent means nobody is assigned.
    #[must_use]
    pub fn from_field(raw: Option<&str>) -> Self {
        raw.map(Self::parse).unwrap_or_default()
    }

    /// Whether `identity` (compared trimmed and case-insensitively) is in the set.
    #[must_use]
    pub fn contains(&self, identity: &str) -> bool {
        let identity = normalize(identity);
        !identity.is_empty() && self.0.contains(&identity)
    }

    /// Returns `true` if no representative is assigned.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of distinct assigned identities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

fn normalize(entry: &str) -> String {
    entry.trim().to_lowercase()
}
