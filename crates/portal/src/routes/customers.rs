//! The signed-in rep's customers.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::{Deserialize, Serialize};

use rep_portal_core::{CustomerRecord, Email};

use crate::error::AppError;
use crate::middleware::RequireRep;
use crate::roster::{AssignmentResolver, search};
use crate::state::AppState;

/// Query parameters for the customer list.
#[derive(Debug, Default, Deserialize)]
pub struct CustomersQuery {
    /// Free-text filter over name, company, email and customer number.
    #[serde(default)]
    pub q: Option<String>,
}

/// Customer list response.
#[derive(Debug, Serialize)]
pub struct CustomersResponse {
    pub rep: Email,
    pub count: usize,
    pub customers: Vec<CustomerRecord>,
}

/// List the customers assigned to the signed-in rep.
///
/// The roster is fetched fresh; a failed fetch is a `502`, never an empty list.
pub async fn index(
    State(state): State<AppState>,
    RequireRep(rep): RequireRep,
    Query(query): Query<CustomersQuery>,
) -> Result<Json<CustomersResponse>, AppError> {
    let roster = state.roster().fetch_all().await?;
    let total = roster.len();

    let assigned = AssignmentResolver::new(rep.email.as_str()).assigned_to(roster);
    let customers = match query.q.as_deref() {
        Some(q) => search(assigned, q),
        None => assigned,
    };

    tracing::debug!(rep = %rep.email, total, assigned = customers.len(), "Customer list resolved");

    Ok(Json(CustomersResponse {
        rep: rep.email,
        count: customers.len(),
        customers,
    }))
}
