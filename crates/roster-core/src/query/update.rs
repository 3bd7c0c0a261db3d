use crate::errors::{Result, RosterError};
use crate::model::Value;
use crate::schema::SqlType;

use super::Column;

/// Right-hand side of a `SET` clause
///
/// `Literal` is a value computed by the caller. `Offset` is evaluated by
/// storage for each matching row against that row's current value.
#[derive(Debug, Clone, PartialEq)]
pub enum UpdateExpr {
    Literal(Value),
    Offset { column: Column, delta: i64 },
}

/// One `column = expr` pair of a bulk update
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Column,
    pub expr: UpdateExpr,
}

impl Assignment {
    pub fn new(column: Column, expr: UpdateExpr) -> Self {
        Self { column, expr }
    }

    /// # Errors
    ///
    /// Returns `TypeMismatch` when the expression's type does not fit the
    /// target column, and `InvalidValue` for a null into a non-null column
    /// or any assignment to the primary key.
    pub fn validate(&self) -> Result<()> {
        let target = self.column;
        if target == Column::Id {
            return Err(RosterError::InvalidValue {
                column: target.name().to_string(),
                reason: "primary key cannot be bulk-assigned".to_string(),
            });
        }

        match &self.expr {
            UpdateExpr::Literal(Value::Null) if !target.nullable() => {
                Err(RosterError::InvalidValue {
                    column: target.name().to_string(),
                    reason: "column is not nullable".to_string(),
                })
            }
            UpdateExpr::Literal(Value::Null) => Ok(()),
            UpdateExpr::Literal(value) if !target.sql_type().accepts(value) => {
                Err(RosterError::TypeMismatch {
                    column: target.name().to_string(),
                    expected: target.sql_type().to_string(),
                    got: value.type_name().to_string(),
                })
            }
            UpdateExpr::Literal(_) => Ok(()),
            UpdateExpr::Offset { column, .. } => {
                for c in [target, *column] {
                    if c.sql_type() != SqlType::Integer {
                        return Err(RosterError::TypeMismatch {
                            column: c.name().to_string(),
                            expected: SqlType::Integer.to_string(),
                            got: c.sql_type().to_string(),
                        });
                    }
                }
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increment_is_offset_not_literal() {
        let assignment = Column::Grade.set_expr(Column::Grade.plus(1));
        assert_eq!(
            assignment.expr,
            UpdateExpr::Offset {
                column: Column::Grade,
                delta: 1
            }
        );
        assert!(assignment.validate().is_ok());
    }

    #[test]
    fn test_offset_on_text_column_rejected() {
        let assignment = Column::Name.set_expr(Column::Name.plus(1));
        assert!(matches!(
            assignment.validate(),
            Err(RosterError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_null_into_required_column_rejected() {
        assert!(Column::Email.set(Value::Null).validate().is_err());
        assert!(Column::EnrolledDate.set(Value::Null).validate().is_ok());
    }

    #[test]
    fn test_primary_key_not_assignable() {
        assert!(Column::Id.set(5).validate().is_err());
    }
}
