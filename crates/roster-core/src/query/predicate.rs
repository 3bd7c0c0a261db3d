use crate::errors::{Result, RosterError};
use crate::model::Value;

use super::Column;

/// Binary comparison operator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl CompareOp {
    pub fn as_sql(&self) -> &'static str {
        match self {
            CompareOp::Eq => "=",
            CompareOp::Ne => "<>",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
        }
    }
}

/// Row filter
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Compare {
        column: Column,
        op: CompareOp,
        value: Value,
    },
    Like {
        column: Column,
        pattern: String,
    },
    IsNull(Column),
    And(Vec<Predicate>),
    Or(Vec<Predicate>),
    Not(Box<Predicate>),
}

impl Predicate {
    pub fn compare(column: Column, op: CompareOp, value: impl Into<Value>) -> Self {
        Predicate::Compare {
            column,
            op,
            value: value.into(),
        }
    }

    /// Conjunction, flattening nested `And`s
    pub fn and(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::And(mut left), Predicate::And(right)) => {
                left.extend(right);
                Predicate::And(left)
            }
            (Predicate::And(mut left), right) => {
                left.push(right);
                Predicate::And(left)
            }
            (left, right) => Predicate::And(vec![left, right]),
        }
    }

    pub fn or(self, other: Predicate) -> Self {
        match (self, other) {
            (Predicate::Or(mut left), right) => {
                left.push(right);
                Predicate::Or(left)
            }
            (left, right) => Predicate::Or(vec![left, right]),
        }
    }

    pub fn negate(self) -> Self {
        Predicate::Not(Box::new(self))
    }

    /// Check operand types against the columns they are compared with
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` for a comparison against a value of another
    /// type, and `InvalidQuery` for `LIKE` on a non-text column, a comparison
    /// with null, or an empty conjunction/disjunction.
    pub fn validate(&self) -> Result<()> {
        match self {
            Predicate::Compare { column, value, .. } => {
                if value.is_null() {
                    return Err(RosterError::InvalidQuery {
                        reason: format!("comparison of {} with null; use is_null", column),
                    });
                }
                if !column.sql_type().accepts(value) {
                    return Err(RosterError::TypeMismatch {
                        column: column.name().to_string(),
                        expected: column.sql_type().to_string(),
                        got: value.type_name().to_string(),
                    });
                }
                Ok(())
            }
            Predicate::Like { column, .. } => {
                if column.sql_type().is_textual() {
                    Ok(())
                } else {
                    Err(RosterError::InvalidQuery {
                        reason: format!("LIKE on non-text column {}", column),
                    })
                }
            }
            Predicate::IsNull(_) => Ok(()),
            Predicate::And(parts) | Predicate::Or(parts) => {
                if parts.is_empty() {
                    return Err(RosterError::InvalidQuery {
                        reason: "empty predicate group".to_string(),
                    });
                }
                parts.iter().try_for_each(Predicate::validate)
            }
            Predicate::Not(inner) => inner.validate(),
        }
    }
}
