use crate::model::Value;
use crate::schema::SqlType;

use super::predicate::{CompareOp, Predicate};
use super::update::{Assignment, UpdateExpr};
use super::{Direction, OrderBy};

/// Columns of the `students` table
///
/// Query and update builders only accept these, so every column name that
/// reaches SQL text comes from `Column::name`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Name,
    Email,
    Grade,
    Birthday,
    EnrolledDate,
}

impl Column {
    /// Declaration order
    pub const ALL: [Column; 6] = [
        Column::Id,
        Column::Name,
        Column::Email,
        Column::Grade,
        Column::Birthday,
        Column::EnrolledDate,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Column::Id => "id",
            Column::Name => "name",
            Column::Email => "email",
            Column::Grade => "grade",
            Column::Birthday => "birthday",
            Column::EnrolledDate => "enrolled_date",
        }
    }

    pub fn sql_type(&self) -> SqlType {
        match self {
            Column::Id | Column::Grade => SqlType::Integer,
            Column::Name => SqlType::Text,
            Column::Email => SqlType::Varchar(55),
            Column::Birthday | Column::EnrolledDate => SqlType::DateTime,
        }
    }

    pub fn nullable(&self) -> bool {
        matches!(self, Column::EnrolledDate)
    }

    pub fn from_name(name: &str) -> Option<Column> {
        Column::ALL.into_iter().find(|c| c.name() == name)
    }

    // ----- predicates -----

    pub fn is(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Eq, value)
    }

    pub fn is_not(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Ne, value)
    }

    pub fn less_than(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Lt, value)
    }

    pub fn at_most(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Le, value)
    }

    pub fn greater_than(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Gt, value)
    }

    pub fn at_least(self, value: impl Into<Value>) -> Predicate {
        Predicate::compare(self, CompareOp::Ge, value)
    }

    /// SQL `LIKE`: `%` matches any run, `_` one character
    pub fn like(self, pattern: impl Into<String>) -> Predicate {
        Predicate::Like {
            column: self,
            pattern: pattern.into(),
        }
    }

    pub fn is_null(self) -> Predicate {
        Predicate::IsNull(self)
    }

    // ----- ordering -----

    pub fn asc(self) -> OrderBy {
        OrderBy {
            column: self,
            direction: Direction::Asc,
        }
    }

    pub fn desc(self) -> OrderBy {
        OrderBy {
            column: self,
            direction: Direction::Desc,
        }
    }

    // ----- updates -----

    /// `column = value`
    pub fn set(self, value: impl Into<Value>) -> Assignment {
        Assignment::new(self, UpdateExpr::Literal(value.into()))
    }

    /// `column = <expression evaluated per row>`
    pub fn set_expr(self, expr: UpdateExpr) -> Assignment {
        Assignment::new(self, expr)
    }

    /// `column + delta`, evaluated by storage against each row's current value
    pub fn plus(self, delta: i64) -> UpdateExpr {
        UpdateExpr::Offset {
            column: self,
            delta,
        }
    }

    /// `column - delta`
    pub fn minus(self, delta: i64) -> UpdateExpr {
        self.plus(-delta)
    }
}

impl std::fmt::Display for Column {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_round_trips_every_column() {
        for column in Column::ALL {
            assert_eq!(Column::from_name(column.name()), Some(column));
        }
        assert_eq!(Column::from_name("age"), None);
    }

    #[test]
    fn test_only_enrolled_date_nullable() {
        let nullable: Vec<_> = Column::ALL.into_iter().filter(|c| c.nullable()).collect();
        assert_eq!(nullable, vec![Column::EnrolledDate]);
    }
}
