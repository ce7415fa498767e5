//! Sales rep portal library.
//!
//! Lets a signed-in sales rep list the Shopify customers assigned to them
//! and sign into one of those customers' storefront accounts through
//! Shopify Multipass.
//!
//! - [`multipass`] - key derivation and token issuance
//! - [`roster`] - paginated roster retrieval and rep assignment
//! - [`shopify`] - Admin API client feeding the roster
//! - [`routes`] - the HTTP surface wiring them together

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod middleware;
pub mod models;
pub mod multipass;
pub mod roster;
pub mod routes;
pub mod services;
pub mod shopify;
pub mod state;

use axum::Router;
use tower_http::trace::TraceLayer;

use state::AppState;

/// Build the portal router with sessions, request tracing and Sentry.
pub fn app(state: AppState) -> Router {
    let session_layer = middleware::create_session_layer(state.config());

    Router::new()
        .merge(routes::routes())
        .layer(session_layer)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
        // Sentry layers (outermost for full request coverage)
        .layer(sentry_tower::NewSentryLayer::new_from_top())
        .layer(sentry_tower::SentryHttpLayer::new().enable_transaction())
}
