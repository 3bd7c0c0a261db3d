// Schema declarations are rejected before any DDL is produced

use roster_core::errors::{ExError, ExErrorKind, RosterError};
use roster_core::schema::{
    validate, CheckExpr, ColumnDef, IndexDef, SqlType, TableConstraint, TableSchema,
};

fn minimal() -> TableSchema {
    TableSchema::new("people")
        .column(ColumnDef::new("id", SqlType::Integer))
        .column(ColumnDef::new("age", SqlType::Integer))
        .constraint(TableConstraint::PrimaryKey {
            name: "people_pk".to_string(),
            column: "id".to_string(),
        })
}

fn reason(err: RosterError) -> String {
    match err {
        RosterError::InvalidSchema { reason, .. } => reason,
        other => panic!("expected InvalidSchema, got {:?}", other),
    }
}

#[test]
fn test_minimal_schema_valid() {
    assert!(validate(&minimal()).is_ok());
}

#[test]
fn test_missing_primary_key_rejected() {
    let schema = TableSchema::new("people").column(ColumnDef::new("id", SqlType::Integer));
    let err = validate(&schema).unwrap_err();
    assert!(reason(err).contains("no primary key"));
}

#[test]
fn test_second_primary_key_rejected() {
    let schema = minimal().constraint(TableConstraint::PrimaryKey {
        name: "people_pk2".to_string(),
        column: "age".to_string(),
    });
    assert!(reason(validate(&schema).unwrap_err()).contains("2 primary keys"));
}

#[test]
fn test_constraint_on_unknown_column_rejected() {
    let schema = minimal().constraint(TableConstraint::Unique {
        name: "unique_email".to_string(),
        columns: vec!["email".to_string()],
    });
    assert_eq!(
        validate(&schema).unwrap_err(),
        RosterError::UnknownColumn {
            table: "people".to_string(),
            column: "email".to_string(),
        }
    );
}

#[test]
fn test_inverted_check_range_rejected() {
    let schema = minimal().constraint(TableConstraint::Check {
        name: "age_range".to_string(),
        expr: CheckExpr::Between {
            column: "age".to_string(),
            min: 12,
            max: 1,
        },
    });
    assert!(reason(validate(&schema).unwrap_err()).contains("inverted range"));
}

#[test]
fn test_range_check_on_text_column_rejected() {
    let schema = minimal()
        .column(ColumnDef::new("nick", SqlType::Text))
        .constraint(TableConstraint::Check {
            name: "nick_range".to_string(),
            expr: CheckExpr::Between {
                column: "nick".to_string(),
                min: 1,
                max: 2,
            },
        });
    assert!(reason(validate(&schema).unwrap_err()).contains("non-integer"));
}

#[test]
fn test_zero_length_varchar_rejected() {
    let schema = minimal().column(ColumnDef::new("code", SqlType::Varchar(0)));
    assert!(reason(validate(&schema).unwrap_err()).contains("maximum length of zero"));
}

#[test]
fn test_duplicate_names_across_constraints_and_indexes_rejected() {
    let schema = minimal().index(IndexDef::new("people_pk", &["age"]));
    assert!(reason(validate(&schema).unwrap_err()).contains("duplicate name"));
}

#[test]
fn test_index_on_unknown_column_rejected() {
    let schema = minimal().index(IndexDef::new("index_name", &["name"]));
    assert!(matches!(
        validate(&schema),
        Err(RosterError::UnknownColumn { .. })
    ));
}

#[test]
fn test_non_identifier_column_rejected() {
    let schema = minimal().column(ColumnDef::new("age; DROP TABLE people", SqlType::Integer));
    assert!(reason(validate(&schema).unwrap_err()).contains("not an identifier"));
}

#[test]
fn test_to_ddl_fails_fast_on_invalid_schema() {
    let schema = TableSchema::new("people").column(ColumnDef::new("id", SqlType::Integer));
    let err: ExError = schema.to_ddl().unwrap_err().into();
    assert_eq!(err.kind(), ExErrorKind::InvalidSchema);
    assert_eq!(err.entity_id(), Some("people"));
}

mod range_checks {
    use super::*;
    use proptest::prelude::*;

    fn with_range(min: i64, max: i64) -> TableSchema {
        minimal().constraint(TableConstraint::Check {
            name: "age_range".to_string(),
            expr: CheckExpr::Between {
                column: "age".to_string(),
                min,
                max,
            },
        })
    }

    proptest! {
        #[test]
        fn ordered_ranges_validate(a in -1000i64..1000, b in -1000i64..1000) {
            let (min, max) = if a <= b { (a, b) } else { (b, a) };
            prop_assert!(validate(&with_range(min, max)).is_ok());
        }

        #[test]
        fn inverted_ranges_rejected(min in -1000i64..1000, gap in 1i64..1000) {
            prop_assert!(validate(&with_range(min, min - gap)).is_err());
        }
    }
}
