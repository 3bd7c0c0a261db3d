//! Integration tests for schema application through the migration ledger

mod common;

use roster_core::schema::{ColumnDef, IndexDef, SqlType, TableConstraint};
use roster_core::{ExErrorKind, TableSchema};
use roster_store::migrations::{applied_migrations, apply_migrations, compute_checksum, Migration};
use roster_store::{Engine, StoreConfig};
use rusqlite::Connection;

#[test]
fn test_create_all_is_idempotent() {
    let mut engine = common::engine();
    engine.create_all().unwrap();

    let applied = applied_migrations(engine.connection()).unwrap();
    assert_eq!(applied.len(), 1);

    let ddl = TableSchema::students().to_ddl().unwrap();
    assert_eq!(applied[0].1, compute_checksum(&ddl));
}

#[test]
fn test_changed_ddl_under_same_id_is_rejected() {
    let mut conn = Connection::open_in_memory().unwrap();
    let original = Migration::create_table(&TableSchema::students()).unwrap();
    apply_migrations(&mut conn, &[original.clone()]).unwrap();

    let altered = Migration::new(
        original.id.clone(),
        format!("{}CREATE INDEX IF NOT EXISTS index_grade ON students (grade);\n", original.sql),
    );
    let err = apply_migrations(&mut conn, &[altered]).unwrap_err();

    assert_eq!(err.kind(), ExErrorKind::ChecksumMismatch);
    assert_eq!(err.entity_id(), Some("001_create_students"));
}

#[test]
fn test_schema_objects_exist_after_create_all() {
    let engine = common::engine();
    let names: Vec<String> = engine
        .connection()
        .prepare("SELECT name FROM sqlite_master WHERE tbl_name = 'students' ORDER BY name")
        .unwrap()
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<_, _>>()
        .unwrap();

    assert!(names.contains(&"students".to_string()));
    assert!(names.contains(&"index_name".to_string()));
}

#[test]
fn test_unknown_index_column_rejected_before_ddl() {
    let schema = TableSchema::new("pupils")
        .column(ColumnDef::new("id", SqlType::Integer))
        .constraint(TableConstraint::PrimaryKey {
            name: "pupils_pk".to_string(),
            column: "id".to_string(),
        })
        .index(IndexDef::new("index_surname", &["surname"]));

    let mut engine = Engine::with_schema(StoreConfig::default(), schema).unwrap();
    let err = engine.create_all().unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::InvalidSchema);

    let tables: i64 = engine
        .connection()
        .query_row(
            "SELECT count(*) FROM sqlite_master WHERE name = 'pupils'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 0);
}
