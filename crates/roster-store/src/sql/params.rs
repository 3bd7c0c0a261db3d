use roster_core::schema::SqlType;
use roster_core::Value;
use rusqlite::types::{ToSqlOutput, ValueRef};
use rusqlite::{Row, ToSql};

/// Borrowing adapter binding a `Value` as a SQLite parameter
pub struct SqlValue<'a>(pub &'a Value);

impl ToSql for SqlValue<'_> {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        match self.0 {
            Value::Null => Ok(ToSqlOutput::Borrowed(ValueRef::Null)),
            Value::Integer(v) => Ok(ToSqlOutput::from(*v)),
            Value::Text(v) => Ok(ToSqlOutput::Borrowed(ValueRef::Text(v.as_bytes()))),
            Value::DateTime(v) => v.to_sql(),
        }
    }
}

/// Read column `index` of `row` as a value of the given storage type
pub fn read_value(row: &Row<'_>, index: usize, sql_type: SqlType) -> rusqlite::Result<Value> {
    let value = match sql_type {
        SqlType::Integer => row.get::<_, Option<i64>>(index)?.into(),
        SqlType::Text | SqlType::Varchar(_) => row.get::<_, Option<String>>(index)?.into(),
        SqlType::DateTime => row.get::<_, Option<chrono::NaiveDateTime>>(index)?.into(),
    };
    Ok(value)
}
