//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//!
//! # Auth (shared rep password)
//! POST /auth/login             - Sign in (form: email, password)
//! POST /auth/logout            - Sign out
//!
//! # Customers (fresh roster per request)
//! GET  /customers?q=           - Customers assigned to the signed-in rep
//!
//! # Multipass
//! POST /go                     - Sign in as an assigned customer (form: email)
//! ```

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

pub mod auth;
pub mod customers;
pub mod multipass;

/// Create auth routes.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
}

/// Create all routes for the portal.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth_routes())
        .route("/customers", get(customers::index))
        .route("/go", post(multipass::go))
}

/// Liveness health check endpoint.
async fn health() -> &'static str {
    "ok"
}
