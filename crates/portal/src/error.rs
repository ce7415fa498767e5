//! Unified error handling for the portal.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::multipass::MultipassError;
use crate::roster::RosterError;
use crate::services::AuthError;
use crate::shopify::AdminShopifyError;

/// Application-level error type for the portal.
#[derive(Debug, Error)]
pub enum AppError {
    /// Roster could not be fetched in full.
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    /// Shopify client could not be set up.
    #[error("Shopify error: {0}")]
    Shopify(#[from] AdminShopifyError),

    /// Multipass token could not be issued.
    #[error("Multipass error: {0}")]
    Multipass(#[from] MultipassError),

    /// Sign-in failed.
    #[error("Authentication failed: {0}")]
    Auth(#[from] AuthError),

    /// Session store failure.
    #[error("Session error: {0}")]
    Session(#[from] tower_sessions::session::Error),

    /// User lacks permission.
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Bad request from client.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    const fn status(&self) -> StatusCode {
        match self {
            Self::Roster(_) | Self::Shopify(_) => StatusCode::BAD_GATEWAY,
            Self::Auth(AuthError::InvalidCredentials | AuthError::InvalidEmail(_)) => {
                StatusCode::UNAUTHORIZED
            }
            Self::Forbidden(_) => StatusCode::FORBIDDEN,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Multipass(_)
            | Self::Auth(AuthError::PasswordHash)
            | Self::Session(_)
            | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Portal request error"
            );
        }

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Roster(_) | Self::Shopify(_) => "Customer roster unavailable".to_string(),
            Self::Auth(_) => "Invalid email or password".to_string(),
            _ if status.is_server_error() => "Internal server error".to_string(),
            _ => self.to_string(),
        };

        (status, message).into_response()
    }
}

/// Set the Sentry user context to the signed-in rep.
pub fn set_sentry_user(email: &str) {
    sentry::configure_scope(|scope| {
        scope.set_user(Some(sentry::User {
            email: Some(email.to_string()),
            ..Default::default()
        }));
    });
}
