use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use super::Value;
use crate::errors::{Result, RosterError};
use crate::query::Column;

/// Student - the one record type of the `students` table
///
/// `id` is `None` until storage assigns one. Only objects inserted through a
/// session's tracked path ever see that assignment; bulk-saved objects keep
/// `None` forever.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: Option<i64>,
    pub name: String,
    /// At most 55 characters, unique across the table
    pub email: String,
    /// Between 1 and 12 inclusive
    pub grade: i64,
    pub birthday: NaiveDateTime,
    /// Filled from the configured default policy when left as `None`
    pub enrolled_date: Option<NaiveDateTime>,
}

impl Student {
    /// Create a new, not yet persisted Student
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        grade: i64,
        birthday: NaiveDateTime,
    ) -> Self {
        Self {
            id: None,
            name: name.into(),
            email: email.into(),
            grade,
            birthday,
            enrolled_date: None,
        }
    }

    /// Set an explicit enrollment date, overriding the storage default
    pub fn with_enrolled_date(mut self, at: NaiveDateTime) -> Self {
        self.enrolled_date = Some(at);
        self
    }

    /// Read a field by column
    pub fn get(&self, column: Column) -> Value {
        match column {
            Column::Id => self.id.into(),
            Column::Name => self.name.clone().into(),
            Column::Email => self.email.clone().into(),
            Column::Grade => self.grade.into(),
            Column::Birthday => self.birthday.into(),
            Column::EnrolledDate => self.enrolled_date.into(),
        }
    }

    /// Assign a field by column
    ///
    /// # Errors
    ///
    /// Returns `TypeMismatch` when the value's type does not fit the column.
    pub fn set(&mut self, column: Column, value: Value) -> Result<()> {
        match (column, value) {
            (Column::Id, Value::Integer(v)) => self.id = Some(v),
            (Column::Id, Value::Null) => self.id = None,
            (Column::Name, Value::Text(v)) => self.name = v,
            (Column::Email, Value::Text(v)) => self.email = v,
            (Column::Grade, Value::Integer(v)) => self.grade = v,
            (Column::Birthday, Value::DateTime(v)) => self.birthday = v,
            (Column::EnrolledDate, Value::DateTime(v)) => self.enrolled_date = Some(v),
            (Column::EnrolledDate, Value::Null) => self.enrolled_date = None,
            (column, other) => {
                return Err(RosterError::TypeMismatch {
                    column: column.name().to_string(),
                    expected: column.sql_type().to_string(),
                    got: other.type_name().to_string(),
                })
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for Student {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.id {
            Some(id) => write!(f, "Student {}: ", id)?,
            None => write!(f, "Student None: ")?,
        }
        write!(f, "{}, Grade {}", self.name, self.grade)
    }
}

/// Midnight on the given calendar day
///
/// # Errors
///
/// Returns `InvalidValue` for a date that does not exist.
pub fn date(year: i32, month: u32, day: u32) -> Result<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .ok_or_else(|| RosterError::InvalidValue {
            column: "birthday".to_string(),
            reason: format!("{:04}-{:02}-{:02} is not a calendar date", year, month, day),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn turing() -> Student {
        Student::new(
            "Alan Turing",
            "alan.turing@sherborne.edu",
            11,
            date(1912, 6, 23).unwrap(),
        )
    }

    #[test]
    fn test_display_before_and_after_id_assignment() {
        let mut student = turing();
        assert_eq!(student.to_string(), "Student None: Alan Turing, Grade 11");

        student.id = Some(2);
        assert_eq!(student.to_string(), "Student 2: Alan Turing, Grade 11");
    }

    #[test]
    fn test_set_rejects_wrong_type() {
        let mut student = turing();
        let err = student
            .set(Column::Grade, Value::from("eleven"))
            .unwrap_err();
        assert!(matches!(err, RosterError::TypeMismatch { .. }));
        assert_eq!(student.grade, 11);
    }

    #[test]
    fn test_get_set_round_trip_per_column() {
        let mut student = turing();
        student.set(Column::Grade, Value::from(12)).unwrap();
        assert_eq!(student.get(Column::Grade), Value::Integer(12));
        assert_eq!(student.get(Column::Id), Value::Null);
    }

    #[test]
    fn test_date_rejects_impossible_day() {
        assert!(date(1912, 2, 30).is_err());
        assert!(date(1879, 3, 14).is_ok());
    }

    #[test]
    fn test_serializes_with_null_id() {
        let json = serde_json::to_value(turing()).unwrap();
        assert!(json["id"].is_null());
        assert_eq!(json["grade"], 11);
    }
}
