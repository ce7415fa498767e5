//! Rep sign-in and sign-out.

use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use secrecy::SecretString;
use serde::Deserialize;
use tower_sessions::Session;

use crate::error::{AppError, set_sentry_user};
use crate::models::{CurrentRep, session_keys};
use crate::services::authenticate_rep;
use crate::state::AppState;

/// Login form data.
#[derive(Deserialize)]
pub struct LoginForm {
    pub email: String,
    pub password: String,
}

/// Handle login form submission.
///
/// On success the session id is cycled before the rep is stored, so a
/// pre-login session id can't be reused.
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Result<Response, AppError> {
    let password = SecretString::from(form.password);

    let email = authenticate_rep(&form.email, &password, &state.config().rep_password_hash)
        .inspect_err(|e| tracing::warn!(error = %e, "Rep sign-in rejected"))?;

    session.cycle_id().await?;
    session
        .insert(session_keys::CURRENT_REP, CurrentRep { email: email.clone() })
        .await?;

    set_sentry_user(email.as_str());
    tracing::info!(rep = %email, "Rep signed in");

    Ok(Redirect::to("/customers").into_response())
}

/// Handle logout.
pub async fn logout(session: Session) -> Response {
    if let Err(e) = session.flush().await {
        tracing::error!("Failed to flush session: {}", e);
    }

    Redirect::to("/auth/login").into_response()
}
