//! Roster Store - SQLite persistence for the student-record sandbox
//!
//! Provides:
//! - In-memory SQLite connection management and typed configuration
//! - Schema application through a checksummed migration ledger
//! - Compilation of typed queries, updates, and deletes to parameterised SQL
//! - The `Engine` and its unit-of-work `Session`

pub mod config;
pub mod db;
pub mod engine;
pub mod errors;
pub mod migrations;
pub mod repo;
pub mod session;
pub mod sql;

// Re-export key types
pub use config::{EnrolledDatePolicy, StoreConfig, StoreTarget};
pub use engine::Engine;
pub use errors::Result;
pub use session::{ObjectKey, Session};
