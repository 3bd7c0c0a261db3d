//! Core types shared across Roster facilities
//!
//! - **Correlation types**: SessionId
//! - **Schema constants**: Canonical field keys and event names for structured logging

pub mod correlation;
pub mod schema;

pub use correlation::SessionId;
