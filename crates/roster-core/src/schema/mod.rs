//! Declarative table schemas
//!
//! A `TableSchema` is pure metadata: columns, named constraints, secondary
//! indexes. It is validated before any DDL is generated, so a malformed
//! declaration never reaches storage.

pub mod column;
pub mod ddl;
pub mod table;
pub mod validation;

pub use column::{ColumnDef, SqlType};
pub use table::{CheckExpr, IndexDef, TableConstraint, TableSchema};
pub use validation::validate;
