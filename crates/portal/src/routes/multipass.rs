//! Sign the rep into a customer's storefront account.

use axum::{
    Form,
    extract::State,
    response::Redirect,
};
use serde::Deserialize;

use crate::error::AppError;
use crate::middleware::RequireRep;
use crate::multipass::IdentityClaim;
use crate::roster::AssignmentResolver;
use crate::state::AppState;

/// Customer selection form.
#[derive(Debug, Deserialize)]
pub struct GoForm {
    /// Email of the customer to sign in as.
    pub email: String,
    /// Optional storefront path to land on.
    #[serde(default)]
    pub return_to: Option<String>,
}

/// Issue a Multipass token for an assigned customer and redirect to it.
///
/// The roster is refetched so a rep can't sign in as a customer that was
/// unassigned since the list was shown.
pub async fn go(
    State(state): State<AppState>,
    RequireRep(rep): RequireRep,
    Form(form): Form<GoForm>,
) -> Result<Redirect, AppError> {
    if form.email.trim().is_empty() {
        return Err(AppError::BadRequest("customer email is required".to_string()));
    }

    let roster = state.roster().fetch_all().await?;
    let resolver = AssignmentResolver::new(rep.email.as_str());
    let customer = resolver.find_assigned(&roster, &form.email).ok_or_else(|| {
        tracing::warn!(rep = %rep.email, "Multipass refused for unassigned customer");
        AppError::Forbidden("customer is not assigned to you".to_string())
    })?;

    let mut claim = IdentityClaim::new(customer.email.clone());
    if let Some(path) = form.return_to.as_deref().filter(|p| !p.trim().is_empty()) {
        claim = claim
            .with_return_to(path)
            .map_err(|e| AppError::BadRequest(e.to_string()))?;
    }

    let token = state.multipass().issue(claim)?;
    tracing::info!(rep = %rep.email, customer = %customer.email, "Multipass sign-in issued");

    Ok(Redirect::to(&state.multipass().login_url(&token)))
}
