//! Core types for the sales rep portal.
//!
//! This module provides type-safe wrappers for the roster domain.

pub mod assignment;
pub mod customer;
pub mod email;

pub use assignment::{ASSIGNMENT_DELIMITERS, AssignedReps};
pub use customer::CustomerRecord;
pub use email::{Email, EmailError};
