//! DDL rendering for validated schemas

use super::column::SqlType;
use super::table::{CheckExpr, TableConstraint, TableSchema};
use super::validation::validate;
use crate::errors::Result;

impl TableSchema {
    /// Render `CREATE TABLE` and `CREATE INDEX` statements
    ///
    /// Output is deterministic for a given declaration, so it can be
    /// checksummed.
    ///
    /// # Errors
    ///
    /// Returns the validation error if the declaration is malformed.
    pub fn to_ddl(&self) -> Result<String> {
        validate(self)?;

        let mut lines: Vec<String> = Vec::new();
        for column in self.columns() {
            let mut line = format!("    {} {}", column.name, column.sql_type);
            if !column.nullable {
                line.push_str(" NOT NULL");
            }
            lines.push(line);
        }

        for constraint in self.constraints() {
            let body = match constraint {
                TableConstraint::PrimaryKey { column, .. } => format!("PRIMARY KEY ({})", column),
                TableConstraint::Unique { columns, .. } => {
                    format!("UNIQUE ({})", columns.join(", "))
                }
                TableConstraint::Check {
                    expr: CheckExpr::Between { column, min, max },
                    ..
                } => format!("CHECK ({} BETWEEN {} AND {})", column, min, max),
            };
            lines.push(format!("    CONSTRAINT {} {}", constraint.name(), body));
        }

        for column in self.columns() {
            if let (SqlType::Varchar(max), Some(name)) =
                (column.sql_type, column.length_constraint_name())
            {
                lines.push(format!(
                    "    CONSTRAINT {} CHECK (length({}) <= {})",
                    name, column.name, max
                ));
            }
        }

        let mut ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} (\n{}\n);\n",
            self.name(),
            lines.join(",\n")
        );

        for index in self.indexes() {
            ddl.push_str(&format!(
                "CREATE INDEX IF NOT EXISTS {} ON {} ({});\n",
                index.name,
                self.name(),
                index.columns.join(", ")
            ));
        }

        Ok(ddl)
    }
}
