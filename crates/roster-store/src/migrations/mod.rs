//! Migration framework
//!
//! Provides:
//! - Migrations generated from validated table declarations
//! - A runner with a `schema_version` ledger and SHA-256 checksums
//! - Idempotent application; changed SQL under an applied id is rejected

mod checksums;
mod runner;

pub use checksums::compute_checksum;
pub use runner::{applied_migrations, apply_migrations};

use roster_core::schema::TableSchema;

use crate::errors::Result;

/// One unit of DDL recorded in the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Migration {
    pub id: String,
    pub sql: String,
}

impl Migration {
    pub fn new(id: impl Into<String>, sql: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            sql: sql.into(),
        }
    }

    /// Migration creating a table and its indexes
    ///
    /// Validates the declaration first; nothing is generated for a
    /// malformed schema.
    pub fn create_table(schema: &TableSchema) -> Result<Self> {
        let ddl = schema.to_ddl()?;
        Ok(Self::new(format!("001_create_{}", schema.name()), ddl))
    }
}
