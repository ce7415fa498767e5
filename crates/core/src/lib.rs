//! Sales rep portal core - shared domain types.
//!
//! This crate provides the types shared by the portal service and the CLI:
//! - `portal` - Roster sync, assignment filtering and Multipass sign-in
//! - `cli` - Command-line tools for tokens, rosters and password hashes
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no HTTP clients, no
//! cryptography. This keeps it lightweight and allows it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Validated emails, roster records and assignment sets

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
