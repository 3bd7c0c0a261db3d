use roster_core::errors::{ExError, ExErrorKind, RosterError};

#[test]
fn test_unknown_object_maps_to_not_found() {
    let ex_err: ExError = RosterError::UnknownObject { key: 7 }.into();

    assert_eq!(ex_err.kind(), ExErrorKind::NotFound);
    assert_eq!(ex_err.code(), "ERR_NOT_FOUND");
    assert_eq!(ex_err.entity_id(), Some("7"));
}

#[test]
fn test_deleted_distinct_from_not_found() {
    let ex_err: ExError = RosterError::ObjectDeleted { key: 3 }.into();

    assert_eq!(ex_err.kind(), ExErrorKind::Deleted);
    assert_ne!(ex_err.kind(), ExErrorKind::NotFound);
}

#[test]
fn test_type_mismatch_keeps_message() {
    let ex_err: ExError = RosterError::TypeMismatch {
        column: "grade".to_string(),
        expected: "INTEGER".to_string(),
        got: "text".to_string(),
    }
    .into();

    assert_eq!(ex_err.code(), "ERR_TYPE_MISMATCH");
    assert!(ex_err.message().contains("grade"));
    assert!(!ex_err.is_constraint_violation());
}

#[test]
fn test_invalid_query_is_invalid_input() {
    let ex_err: ExError = RosterError::InvalidQuery {
        reason: "empty".to_string(),
    }
    .into();
    assert_eq!(ex_err.kind(), ExErrorKind::InvalidInput);
}

#[test]
fn test_error_kind_code_mapping() {
    let kinds = vec![
        (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
        (ExErrorKind::ConstraintViolation, "ERR_CONSTRAINT_VIOLATION"),
        (ExErrorKind::ChecksumMismatch, "ERR_CHECKSUM_MISMATCH"),
        (ExErrorKind::InvalidSchema, "ERR_INVALID_SCHEMA"),
    ];

    for (kind, expected_code) in kinds {
        assert_eq!(kind.code(), expected_code);
    }
}
