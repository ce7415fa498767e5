//! Business logic services.

pub mod auth;

pub use auth::{AuthError, authenticate_rep, hash_password, verify_password};
