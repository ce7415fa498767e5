//! Session-related types for rep authentication.

use serde::{Deserialize, Serialize};

use rep_portal_core::Email;

/// Session-stored rep identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentRep {
    /// Lower-cased rep email; matched against customer assignments.
    pub email: Email,
}

/// Session keys for rep authentication data.
pub mod keys {
    /// Key for storing the current logged-in rep.
    pub const CURRENT_REP: &str = "current_rep";
}
