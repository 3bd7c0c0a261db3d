use chrono::{Local, NaiveDateTime};

use super::column::ColumnDef;
use crate::query::Column;

/// Boolean expression allowed inside a named CHECK constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckExpr {
    /// `column BETWEEN min AND max`, inclusive on both ends
    Between { column: String, min: i64, max: i64 },
}

impl CheckExpr {
    pub fn column(&self) -> &str {
        match self {
            CheckExpr::Between { column, .. } => column,
        }
    }
}

/// Named table-level constraint
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableConstraint {
    PrimaryKey { name: String, column: String },
    Unique { name: String, columns: Vec<String> },
    Check { name: String, expr: CheckExpr },
}

impl TableConstraint {
    pub fn name(&self) -> &str {
        match self {
            TableConstraint::PrimaryKey { name, .. }
            | TableConstraint::Unique { name, .. }
            | TableConstraint::Check { name, .. } => name,
        }
    }

    /// Columns the constraint refers to
    pub fn columns(&self) -> Vec<&str> {
        match self {
            TableConstraint::PrimaryKey { column, .. } => vec![column.as_str()],
            TableConstraint::Unique { columns, .. } => columns.iter().map(String::as_str).collect(),
            TableConstraint::Check { expr, .. } => vec![expr.column()],
        }
    }
}

/// Secondary (non-unique) index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexDef {
    pub name: String,
    pub columns: Vec<String>,
}

impl IndexDef {
    pub fn new(name: impl Into<String>, columns: &[&str]) -> Self {
        Self {
            name: name.into(),
            columns: columns.iter().map(|c| c.to_string()).collect(),
        }
    }
}

/// Declaration of one table
///
/// `loaded_at` is captured once when the declaration is built; storage only
/// uses it as a column default under the schema-load enrollment policy.
#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    columns: Vec<ColumnDef>,
    constraints: Vec<TableConstraint>,
    indexes: Vec<IndexDef>,
    loaded_at: NaiveDateTime,
}

impl TableSchema {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            constraints: Vec::new(),
            indexes: Vec::new(),
            loaded_at: Local::now().naive_local(),
        }
    }

    pub fn column(mut self, column: ColumnDef) -> Self {
        self.columns.push(column);
        self
    }

    pub fn constraint(mut self, constraint: TableConstraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    pub fn index(mut self, index: IndexDef) -> Self {
        self.indexes.push(index);
        self
    }

    /// The `students` table
    ///
    /// Primary key `id_pk`, unique `email`, grade range check, index on `name`.
    pub fn students() -> Self {
        let mut schema = TableSchema::new("students");
        for column in Column::ALL {
            let mut def = ColumnDef::new(column.name(), column.sql_type());
            if column.nullable() {
                def = def.nullable();
            }
            schema = schema.column(def);
        }

        schema
            .constraint(TableConstraint::PrimaryKey {
                name: "id_pk".to_string(),
                column: Column::Id.name().to_string(),
            })
            .constraint(TableConstraint::Unique {
                name: "unique_email".to_string(),
                columns: vec![Column::Email.name().to_string()],
            })
            .constraint(TableConstraint::Check {
                name: "grade_between_1_and_12".to_string(),
                expr: CheckExpr::Between {
                    column: Column::Grade.name().to_string(),
                    min: 1,
                    max: 12,
                },
            })
            .index(IndexDef::new("index_name", &[Column::Name.name()]))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    pub fn constraints(&self) -> &[TableConstraint] {
        &self.constraints
    }

    pub fn indexes(&self) -> &[IndexDef] {
        &self.indexes
    }

    pub fn loaded_at(&self) -> NaiveDateTime {
        self.loaded_at
    }

    pub fn get_column(&self, name: &str) -> Option<&ColumnDef> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Primary key column name, if declared
    pub fn primary_key(&self) -> Option<&str> {
        self.constraints.iter().find_map(|c| match c {
            TableConstraint::PrimaryKey { column, .. } => Some(column.as_str()),
            _ => None,
        })
    }

    /// Name of the constraint that enforces uniqueness of `column`, if any
    pub fn unique_constraint_for(&self, column: &str) -> Option<&str> {
        self.constraints.iter().find_map(|c| match c {
            TableConstraint::Unique { name, columns } if columns.iter().any(|c| c == column) => {
                Some(name.as_str())
            }
            TableConstraint::PrimaryKey { name, column: pk } if pk == column => Some(name.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::SqlType;

    #[test]
    fn test_students_declares_all_columns_in_order() {
        let schema = TableSchema::students();
        let names: Vec<_> = schema.columns().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["id", "name", "email", "grade", "birthday", "enrolled_date"]
        );
        assert_eq!(
            schema.get_column("email").map(|c| c.sql_type),
            Some(SqlType::Varchar(55))
        );
    }

    #[test]
    fn test_students_constraint_lookup() {
        let schema = TableSchema::students();
        assert_eq!(schema.primary_key(), Some("id"));
        assert_eq!(schema.unique_constraint_for("email"), Some("unique_email"));
        assert_eq!(schema.unique_constraint_for("id"), Some("id_pk"));
        assert_eq!(schema.unique_constraint_for("name"), None);
    }

    #[test]
    fn test_loaded_at_fixed_per_declaration() {
        let schema = TableSchema::students();
        let first = schema.loaded_at();
        let clone = schema.clone();
        assert_eq!(clone.loaded_at(), first);
    }
}
