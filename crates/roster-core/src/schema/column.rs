use crate::model::Value;

/// Storage type of a column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Integer,
    Text,
    /// Text with a maximum length in characters, enforced by a check constraint
    Varchar(usize),
    DateTime,
}

impl SqlType {
    /// Whether a non-null value can be stored in a column of this type
    pub fn accepts(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (SqlType::Integer, Value::Integer(_))
                | (SqlType::Text | SqlType::Varchar(_), Value::Text(_))
                | (SqlType::DateTime, Value::DateTime(_))
        )
    }

    pub fn is_textual(&self) -> bool {
        matches!(self, SqlType::Text | SqlType::Varchar(_))
    }
}

impl std::fmt::Display for SqlType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SqlType::Integer => write!(f, "INTEGER"),
            SqlType::Text => write!(f, "VARCHAR"),
            SqlType::Varchar(n) => write!(f, "VARCHAR({})", n),
            SqlType::DateTime => write!(f, "DATETIME"),
        }
    }
}

/// One column of a table declaration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: String,
    pub sql_type: SqlType,
    pub nullable: bool,
}

impl ColumnDef {
    pub fn new(name: impl Into<String>, sql_type: SqlType) -> Self {
        Self {
            name: name.into(),
            sql_type,
            nullable: false,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Name of the implicit length check emitted for `Varchar` columns
    pub fn length_constraint_name(&self) -> Option<String> {
        match self.sql_type {
            SqlType::Varchar(_) => Some(format!("{}_max_length", self.name)),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_varchar_accepts_text_only() {
        assert!(SqlType::Varchar(55).accepts(&Value::from("a@b.edu")));
        assert!(!SqlType::Varchar(55).accepts(&Value::from(3)));
        assert!(!SqlType::Integer.accepts(&Value::Null));
    }

    #[test]
    fn test_length_constraint_only_for_varchar() {
        assert_eq!(
            ColumnDef::new("email", SqlType::Varchar(55)).length_constraint_name(),
            Some("email_max_length".to_string())
        );
        assert_eq!(
            ColumnDef::new("grade", SqlType::Integer).length_constraint_name(),
            None
        );
    }
}
