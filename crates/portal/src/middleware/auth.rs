//! Authentication extractors.

use axum::{
    extract::FromRequestParts,
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Response},
};
use tower_sessions::Session;

use crate::models::{CurrentRep, session_keys};

/// Extractor that requires a signed-in rep.
///
/// Rejects with `401 Unauthorized` when there is no session or no rep in it.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(RequireRep(rep): RequireRep) -> impl IntoResponse {
///     format!("Hello, {}!", rep.email)
/// }
/// ```
pub struct RequireRep(pub CurrentRep);

/// Rejection for [`RequireRep`].
pub struct RepAuthRejection;

impl IntoResponse for RepAuthRejection {
    fn into_response(self) -> Response {
        (StatusCode::UNAUTHORIZED, "Sign in required").into_response()
    }
}

impl<S> FromRequestParts<S> for RequireRep
where
    S: Send + Sync,
{
    type Rejection = RepAuthRejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Get the session from extensions (set by SessionManagerLayer)
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or(RepAuthRejection)?;

        let rep: CurrentRep = session
            .get(session_keys::CURRENT_REP)
            .await
            .ok()
            .flatten()
            .ok_or(RepAuthRejection)?;

        Ok(Self(rep))
    }
}
