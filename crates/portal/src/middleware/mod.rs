//! HTTP middleware.

pub mod auth;
pub mod session;

pub use auth::RequireRep;
pub use session::{SESSION_COOKIE_NAME, create_session_layer};
