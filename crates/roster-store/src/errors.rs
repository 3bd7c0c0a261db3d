//! Error handling for roster-store
//!
//! Wraps roster-core ExError with store-specific helpers

use roster_core::errors::{ExError, ExErrorKind};
use roster_core::schema::TableSchema;
use rusqlite::ErrorCode;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error
pub fn migration_error(migration_id: &str, reason: &str) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_message(format!("Migration {} failed: {}", migration_id, reason))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    ExError::new(ExErrorKind::ChecksumMismatch)
        .with_op("migration_checksum")
        .with_entity_id(migration_id)
        .with_message(format!(
            "Checksum mismatch for migration {}: expected {}, got {}",
            migration_id, expected, actual
        ))
}

/// Create a database error from rusqlite::Error
///
/// Constraint failures become `ConstraintViolation`; the raw SQLite detail
/// (`students.email`, or a CHECK constraint's name) is kept as the constraint.
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    match constraint_detail(&err) {
        Some((message, detail)) => ExError::new(ExErrorKind::ConstraintViolation)
            .with_op("sqlite")
            .with_constraint(detail)
            .with_message(message),
        None => ExError::new(ExErrorKind::Persistence)
            .with_op("sqlite")
            .with_message(err.to_string()),
    }
}

/// Like `from_rusqlite`, but names the violated constraint using the schema
/// declaration (`students.email` becomes `unique_email`).
pub fn from_rusqlite_with_schema(err: rusqlite::Error, schema: &TableSchema) -> ExError {
    let Some((message, detail)) = constraint_detail(&err) else {
        return from_rusqlite(err);
    };

    let constraint = if message.starts_with("UNIQUE constraint failed") {
        detail
            .split(", ")
            .next()
            .and_then(|qualified| qualified.rsplit('.').next())
            .and_then(|column| schema.unique_constraint_for(column))
            .map(str::to_string)
            .unwrap_or(detail)
    } else if message.starts_with("NOT NULL constraint failed") {
        match detail.rsplit('.').next() {
            Some(column) => format!("{}_not_null", column),
            None => detail,
        }
    } else {
        detail
    };

    ExError::new(ExErrorKind::ConstraintViolation)
        .with_op("sqlite")
        .with_entity_id(schema.name())
        .with_constraint(constraint)
        .with_message(message)
}

/// `(full message, text after "constraint failed: ")` for constraint errors
fn constraint_detail(err: &rusqlite::Error) -> Option<(String, String)> {
    match err {
        rusqlite::Error::SqliteFailure(ffi_err, message)
            if ffi_err.code == ErrorCode::ConstraintViolation =>
        {
            let message = message.clone().unwrap_or_else(|| err.to_string());
            let detail = message
                .split_once("constraint failed: ")
                .map(|(_, rest)| rest.to_string())
                .unwrap_or_else(|| message.clone());
            Some((message, detail))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::ffi;

    fn constraint_error(message: &str) -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            ffi::Error {
                code: ErrorCode::ConstraintViolation,
                extended_code: ffi::SQLITE_CONSTRAINT_UNIQUE,
            },
            Some(message.to_string()),
        )
    }

    #[test]
    fn test_unique_failure_named_from_schema() {
        let schema = TableSchema::students();
        let err = from_rusqlite_with_schema(
            constraint_error("UNIQUE constraint failed: students.email"),
            &schema,
        );
        assert_eq!(err.kind(), ExErrorKind::ConstraintViolation);
        assert_eq!(err.constraint(), Some("unique_email"));
    }

    #[test]
    fn test_check_failure_keeps_declared_name() {
        let schema = TableSchema::students();
        let err = from_rusqlite_with_schema(
            constraint_error("CHECK constraint failed: grade_between_1_and_12"),
            &schema,
        );
        assert_eq!(err.constraint(), Some("grade_between_1_and_12"));
    }

    #[test]
    fn test_non_constraint_failure_is_persistence() {
        let err = from_rusqlite(rusqlite::Error::QueryReturnedNoRows);
        assert_eq!(err.kind(), ExErrorKind::Persistence);
        assert_eq!(err.constraint(), None);
    }
}
