//! Roster Core - domain model for the student-record ORM sandbox
//!
//! This crate provides:
//! - The `Student` record and the dynamic `Value`/`Row` types query results are built from
//! - Declarative table schemas with fail-fast validation and DDL rendering
//! - Typed query, predicate, and update-expression builders
//! - The structured error facility (`ExError`) and domain errors (`RosterError`)
//! - The structured logging facility used by every storage operation

pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod query;
pub mod schema;

#[doc(hidden)]
pub use roster_core_types as core_types;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, RosterError};
pub use model::{Row, Student, Value};
pub use query::{Aggregate, Assignment, Column, Direction, Predicate, Query, UpdateExpr};
pub use schema::TableSchema;
