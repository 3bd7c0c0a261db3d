//! Engine - one connection, one schema, one configuration
//!
//! Sessions mutably borrow the engine, so at most one is active at a time.

use std::time::Instant;

use roster_core::query::Column;
use roster_core::schema::{validate, SqlType, TableSchema};
use roster_core::{log_op_end, log_op_error, log_op_start, RosterError};
use rusqlite::Connection;

use crate::config::StoreConfig;
use crate::db;
use crate::errors::Result;
use crate::migrations::{apply_migrations, Migration};
use crate::session::Session;

pub struct Engine {
    conn: Connection,
    schema: TableSchema,
    config: StoreConfig,
}

impl Engine {
    /// Open the configured target with the `students` schema
    pub fn open(config: StoreConfig) -> Result<Self> {
        Self::with_schema(config, TableSchema::students())
    }

    /// Default configuration: in-memory, enrollment stamped per insert
    pub fn open_in_memory() -> Result<Self> {
        Self::open(StoreConfig::default())
    }

    /// Open with a caller-supplied table declaration
    ///
    /// The table may be named freely but must declare exactly the `Student`
    /// columns, since sessions read and write whole records. Nothing is
    /// checked until `create_all`.
    pub fn with_schema(config: StoreConfig, schema: TableSchema) -> Result<Self> {
        let conn = db::open(&config)?;
        Ok(Self {
            conn,
            schema,
            config,
        })
    }

    /// Validate the schema and apply its DDL through the migration ledger
    ///
    /// Idempotent for an unchanged declaration.
    ///
    /// # Errors
    ///
    /// Returns `InvalidSchema` before any DDL runs if the declaration is
    /// malformed or its columns do not match `Student`, and `ChecksumMismatch`
    /// if a different DDL was already applied under the same migration id.
    pub fn create_all(&mut self) -> Result<()> {
        log_op_start!("create_all", table = self.schema.name());
        let start = Instant::now();

        let result = validate(&self.schema)
            .map_err(Into::into)
            .and_then(|()| student_columns_declared(&self.schema))
            .and_then(|()| Migration::create_table(&self.schema))
            .and_then(|migration| apply_migrations(&mut self.conn, &[migration]));
        result.map_err(|e| {
            log_op_error!(
                "create_all",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "create_all",
            duration_ms = start.elapsed().as_millis() as u64,
            table = self.schema.name()
        );
        Ok(())
    }

    /// Start a unit of work
    pub fn session(&mut self) -> Session<'_> {
        Session::new(&mut self.conn, &self.schema, &self.config)
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// Raw connection, for inspection outside a session
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}

/// Every `Column` declared with a compatible type, and nothing else
fn student_columns_declared(schema: &TableSchema) -> Result<()> {
    let invalid = |reason: String| RosterError::InvalidSchema {
        table: schema.name().to_string(),
        reason,
    };

    for column in Column::ALL {
        let declared = schema
            .get_column(column.name())
            .ok_or_else(|| invalid(format!("missing column {}", column.name())))?;
        let compatible = match (declared.sql_type, column.sql_type()) {
            (SqlType::Varchar(_), SqlType::Varchar(_)) => true,
            (declared, expected) => declared == expected,
        };
        if !compatible {
            return Err(invalid(format!(
                "column {} is declared {:?}, expected {:?}",
                column.name(),
                declared.sql_type,
                column.sql_type()
            ))
            .into());
        }
    }

    if schema.columns().len() != Column::ALL.len() {
        return Err(invalid("declares columns a student record does not have".to_string()).into());
    }
    Ok(())
}
