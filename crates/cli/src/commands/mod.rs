//! CLI subcommands.

pub mod password;
pub mod roster;
pub mod token;

use thiserror::Error;

use rep_portal::{
    config::ConfigError, multipass::MultipassError, roster::RosterError,
    services::AuthError, shopify::AdminShopifyError,
};
use rep_portal_core::EmailError;

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Configuration missing or invalid.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Invalid email argument.
    #[error("Invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// Token could not be issued or decoded.
    #[error("Multipass error: {0}")]
    Multipass(#[from] MultipassError),

    /// Shopify client could not be set up.
    #[error("Shopify error: {0}")]
    Shopify(#[from] AdminShopifyError),

    /// Roster fetch failed.
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    /// Password could not be hashed.
    #[error("Password error: {0}")]
    Password(#[from] AuthError),

    /// Nothing was read from stdin.
    #[error("No password given on stdin")]
    EmptyPassword,

    /// Reading stdin or writing stdout failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
