//! Session models.

pub mod session;

pub use session::{CurrentRep, keys as session_keys};
