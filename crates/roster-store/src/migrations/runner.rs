//! Migration runner
//!
//! Applies migrations in order, each in its own transaction together with its
//! ledger row.

use crate::errors::{checksum_mismatch, from_rusqlite, migration_error, Result};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::Migration;
use rusqlite::{Connection, OptionalExtension};

/// Apply all pending migrations to the database
pub fn apply_migrations(conn: &mut Connection, migrations: &[Migration]) -> Result<()> {
    create_schema_version_table(conn)?;

    for migration in migrations {
        apply_migration(conn, migration)?;
    }

    Ok(())
}

/// `(migration_id, checksum)` pairs in application order
pub fn applied_migrations(conn: &Connection) -> Result<Vec<(String, String)>> {
    create_schema_version_table(conn)?;

    let mut stmt = conn
        .prepare("SELECT migration_id, checksum FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(rows)
}

fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT NOT NULL
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Apply a single migration unless already recorded
fn apply_migration(conn: &mut Connection, migration: &Migration) -> Result<()> {
    let checksum = compute_checksum(&migration.sql);

    let recorded: Option<String> = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?",
            [&migration.id],
            |row| row.get(0),
        )
        .optional()
        .map_err(from_rusqlite)?;

    if let Some(recorded) = recorded {
        if recorded != checksum {
            return Err(checksum_mismatch(&migration.id, &recorded, &checksum));
        }
        tracing::debug!(migration_id = %migration.id, "migration already applied");
        return Ok(());
    }

    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(&migration.sql)
        .map_err(|e| migration_error(&migration.id, &e.to_string()))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?, ?, ?)",
        rusqlite::params![migration.id, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    tracing::info!(migration_id = %migration.id, "migration applied");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::schema::TableSchema;

    fn students_migration() -> Migration {
        Migration::create_table(&TableSchema::students()).unwrap()
    }

    #[test]
    fn test_apply_migrations() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn, &[students_migration()]).unwrap();

        let applied = applied_migrations(&conn).unwrap();
        assert_eq!(applied.len(), 1);
        assert_eq!(applied[0].0, "001_create_students");
    }

    #[test]
    fn test_idempotency() {
        let mut conn = Connection::open_in_memory().unwrap();
        apply_migrations(&mut conn, &[students_migration()]).unwrap();
        apply_migrations(&mut conn, &[students_migration()]).unwrap();
        assert_eq!(applied_migrations(&conn).unwrap().len(), 1);
    }

    #[test]
    fn test_failed_sql_leaves_no_ledger_row() {
        let mut conn = Connection::open_in_memory().unwrap();
        let broken = Migration::new("002_broken", "CREATE TABLE (;");
        assert!(apply_migrations(&mut conn, &[broken]).is_err());
        assert!(applied_migrations(&conn).unwrap().is_empty());
    }
}
