//! Row-level writes for Student records

use chrono::NaiveDateTime;
use roster_core::query::Column;
use roster_core::schema::TableSchema;
use roster_core::{Student, Value};
use rusqlite::{params_from_iter, Connection};

use crate::errors::{from_rusqlite_with_schema, Result};
use crate::sql::{CompiledSql, SqlValue};

/// SQLite repository for Students
///
/// Every call takes a plain `&Connection`; a `Transaction` derefs to one, so
/// the same functions serve inside and outside the session's transaction.
pub struct StudentRepo;

impl StudentRepo {
    /// Insert one record and return its rowid
    ///
    /// An unset `id` is left out of the statement so storage assigns one. An
    /// unset `enrolled_date` is written as `enrolled_default`.
    pub fn insert(
        conn: &Connection,
        schema: &TableSchema,
        student: &Student,
        enrolled_default: NaiveDateTime,
    ) -> Result<i64> {
        let mut columns = Vec::with_capacity(Column::ALL.len());
        let mut values = Vec::with_capacity(Column::ALL.len());
        for column in Column::ALL {
            let value = match (column, student.get(column)) {
                (Column::Id, Value::Null) => continue,
                (Column::EnrolledDate, Value::Null) => Value::DateTime(enrolled_default),
                (_, value) => value,
            };
            columns.push(column.name());
            values.push(value);
        }

        let placeholders = vec!["?"; columns.len()].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}) VALUES ({})",
            schema.name(),
            columns.join(", "),
            placeholders
        );

        conn.execute(&sql, params_from_iter(values.iter().map(SqlValue)))
            .map_err(|e| from_rusqlite_with_schema(e, schema))?;

        Ok(conn.last_insert_rowid())
    }

    /// Write only the given columns of the row with primary key `id`
    ///
    /// Returns the number of rows changed (0 when the row is gone).
    pub fn update_columns(
        conn: &Connection,
        schema: &TableSchema,
        id: i64,
        changes: &[(Column, Value)],
    ) -> Result<usize> {
        if changes.is_empty() {
            return Ok(0);
        }

        let set_list = changes
            .iter()
            .map(|(column, _)| format!("{} = ?", column))
            .collect::<Vec<_>>()
            .join(", ");
        let sql = format!(
            "UPDATE {} SET {} WHERE {} = ?",
            schema.name(),
            set_list,
            Column::Id
        );

        let id = Value::Integer(id);
        let params = changes
            .iter()
            .map(|(_, value)| SqlValue(value))
            .chain(std::iter::once(SqlValue(&id)));

        conn.execute(&sql, params_from_iter(params))
            .map_err(|e| from_rusqlite_with_schema(e, schema))
    }

    /// Delete the row with primary key `id`
    pub fn delete(conn: &Connection, schema: &TableSchema, id: i64) -> Result<usize> {
        let sql = format!("DELETE FROM {} WHERE {} = ?", schema.name(), Column::Id);
        conn.execute(&sql, [id])
            .map_err(|e| from_rusqlite_with_schema(e, schema))
    }

    /// Run a compiled UPDATE or DELETE and return the affected row count
    pub fn execute(conn: &Connection, schema: &TableSchema, compiled: &CompiledSql) -> Result<usize> {
        conn.execute(
            &compiled.sql,
            params_from_iter(compiled.params.iter().map(SqlValue)),
        )
        .map_err(|e| from_rusqlite_with_schema(e, schema))
    }
}
