//! Session middleware configuration.
//!
//! Sessions live in memory: they only hold the signed-in rep's email, and a
//! restart signing everyone out is acceptable.

use tower_sessions::{Expiry, MemoryStore, SessionManagerLayer};

use crate::config::PortalConfig;

/// Session cookie name.
pub const SESSION_COOKIE_NAME: &str = "rep_portal_session";

/// Session expiry time in seconds (12 hours of inactivity).
const SESSION_EXPIRY_SECONDS: i64 = 12 * 60 * 60;

/// Create the session layer with an in-memory store.
#[must_use]
pub fn create_session_layer(config: &PortalConfig) -> SessionManagerLayer<MemoryStore> {
    SessionManagerLayer::new(MemoryStore::default())
        .with_name(SESSION_COOKIE_NAME)
        .with_expiry(Expiry::OnInactivity(
            tower_sessions::cookie::time::Duration::seconds(SESSION_EXPIRY_SECONDS),
        ))
        .with_secure(config.is_secure())
        // Lax so the post-redirect GET after login keeps the cookie
        .with_same_site(tower_sessions::cookie::SameSite::Lax)
        .with_http_only(true)
        .with_path("/")
}
