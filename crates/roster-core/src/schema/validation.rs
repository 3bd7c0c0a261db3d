//! Fail-fast validation of table declarations

use std::collections::HashSet;

use super::column::SqlType;
use super::table::{CheckExpr, TableConstraint, TableSchema};
use crate::errors::{Result, RosterError};

/// Validate a table declaration before any DDL is generated
///
/// # Errors
///
/// Returns `InvalidSchema` for structural problems (bad identifiers, duplicate
/// names, missing or repeated primary key, inverted ranges) and
/// `UnknownColumn` when a constraint or index names a column the table lacks.
pub fn validate(schema: &TableSchema) -> Result<()> {
    let table = schema.name();
    let invalid = |reason: String| RosterError::InvalidSchema {
        table: table.to_string(),
        reason,
    };

    if !is_identifier(table) {
        return Err(invalid(format!("table name {:?} is not an identifier", table)));
    }
    if schema.columns().is_empty() {
        return Err(invalid("no columns declared".to_string()));
    }

    let mut column_names = HashSet::new();
    for column in schema.columns() {
        if !is_identifier(&column.name) {
            return Err(invalid(format!(
                "column name {:?} is not an identifier",
                column.name
            )));
        }
        if !column_names.insert(column.name.as_str()) {
            return Err(invalid(format!("duplicate column {}", column.name)));
        }
        if column.sql_type == SqlType::Varchar(0) {
            return Err(invalid(format!(
                "column {} has a maximum length of zero",
                column.name
            )));
        }
    }

    let mut object_names = HashSet::new();
    let mut primary_keys = 0;
    for constraint in schema.constraints() {
        if !is_identifier(constraint.name()) {
            return Err(invalid(format!(
                "constraint name {:?} is not an identifier",
                constraint.name()
            )));
        }
        if !object_names.insert(constraint.name().to_string()) {
            return Err(invalid(format!("duplicate name {}", constraint.name())));
        }
        for column in constraint.columns() {
            if !column_names.contains(column) {
                return Err(RosterError::UnknownColumn {
                    table: table.to_string(),
                    column: column.to_string(),
                });
            }
        }

        match constraint {
            TableConstraint::PrimaryKey { .. } => primary_keys += 1,
            TableConstraint::Unique { columns, .. } if columns.is_empty() => {
                return Err(invalid(format!(
                    "unique constraint {} names no columns",
                    constraint.name()
                )));
            }
            TableConstraint::Check {
                expr: CheckExpr::Between { column, min, max },
                ..
            } => {
                if min > max {
                    return Err(invalid(format!(
                        "check {} has inverted range {}..{}",
                        constraint.name(),
                        min,
                        max
                    )));
                }
                let is_integer = schema
                    .get_column(column)
                    .map(|c| c.sql_type == SqlType::Integer)
                    .unwrap_or(false);
                if !is_integer {
                    return Err(invalid(format!(
                        "check {} applies a numeric range to non-integer column {}",
                        constraint.name(),
                        column
                    )));
                }
            }
            TableConstraint::Unique { .. } => {}
        }
    }

    // Implicit length checks share the constraint namespace
    for column in schema.columns() {
        if let Some(name) = column.length_constraint_name() {
            if !object_names.insert(name.clone()) {
                return Err(invalid(format!("duplicate name {}", name)));
            }
        }
    }

    match primary_keys {
        0 => return Err(invalid("no primary key declared".to_string())),
        1 => {}
        n => return Err(invalid(format!("{} primary keys declared", n))),
    }

    for index in schema.indexes() {
        if !is_identifier(&index.name) {
            return Err(invalid(format!(
                "index name {:?} is not an identifier",
                index.name
            )));
        }
        if !object_names.insert(index.name.clone()) {
            return Err(invalid(format!("duplicate name {}", index.name)));
        }
        if index.columns.is_empty() {
            return Err(invalid(format!("index {} names no columns", index.name)));
        }
        if let Some(column) = index
            .columns
            .iter()
            .find(|c| !column_names.contains(c.as_str()))
        {
            return Err(RosterError::UnknownColumn {
                table: table.to_string(),
                column: column.clone(),
            });
        }
    }

    Ok(())
}

/// Plain SQL identifier: ASCII letters, digits, underscore; no leading digit
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
