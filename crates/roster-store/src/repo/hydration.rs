//! Hydration layer - reads rows back into records and tuples

use roster_core::query::{Aggregate, Column, Projection};
use roster_core::schema::{SqlType, TableSchema};
use roster_core::{Row, Student};
use rusqlite::{params_from_iter, Connection, OptionalExtension};

use crate::errors::{from_rusqlite, Result};
use crate::sql::{read_value, CompiledSql, SqlValue};

/// Build a Student from a row selected in `Column::ALL` order
pub fn student_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Student> {
    Ok(Student {
        id: Some(row.get(0)?),
        name: row.get(1)?,
        email: row.get(2)?,
        grade: row.get(3)?,
        birthday: row.get(4)?,
        enrolled_date: row.get(5)?,
    })
}

/// Run an entity SELECT and map every row to a Student
pub fn load_students(conn: &Connection, compiled: &CompiledSql) -> Result<Vec<Student>> {
    let mut stmt = conn.prepare(&compiled.sql).map_err(from_rusqlite)?;
    let students = stmt
        .query_map(
            params_from_iter(compiled.params.iter().map(SqlValue)),
            student_from_row,
        )
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(students)
}

/// Run a projection or aggregate SELECT, reading each column by `types`
pub fn load_rows(
    conn: &Connection,
    compiled: &CompiledSql,
    types: &[SqlType],
) -> Result<Vec<Row>> {
    let mut stmt = conn.prepare(&compiled.sql).map_err(from_rusqlite)?;
    let rows = stmt
        .query_map(
            params_from_iter(compiled.params.iter().map(SqlValue)),
            |row| {
                types
                    .iter()
                    .enumerate()
                    .map(|(i, ty)| read_value(row, i, *ty))
                    .collect::<rusqlite::Result<Vec<_>>>()
                    .map(Row::new)
            },
        )
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    Ok(rows)
}

/// Run a single-integer query such as `SELECT count(*) ...`
pub fn load_count(conn: &Connection, compiled: &CompiledSql) -> Result<i64> {
    conn.query_row(
        &compiled.sql,
        params_from_iter(compiled.params.iter().map(SqlValue)),
        |row| row.get(0),
    )
    .map_err(from_rusqlite)
}

/// Current stored state of one row, `None` once it is gone
pub fn find_by_id(conn: &Connection, schema: &TableSchema, id: i64) -> Result<Option<Student>> {
    let columns: Vec<&str> = Column::ALL.iter().map(|c| c.name()).collect();
    let sql = format!(
        "SELECT {} FROM {} WHERE {} = ?",
        columns.join(", "),
        schema.name(),
        Column::Id
    );
    conn.query_row(&sql, [id], student_from_row)
        .optional()
        .map_err(from_rusqlite)
}

/// Storage type of each result column of a projection
pub fn result_types(projection: &Projection) -> Vec<SqlType> {
    match projection {
        Projection::Entity => Column::ALL.iter().map(Column::sql_type).collect(),
        Projection::Columns(columns) => columns.iter().map(Column::sql_type).collect(),
        Projection::Aggregates(aggregates) => aggregates
            .iter()
            .map(|aggregate| match aggregate {
                Aggregate::Count(_) | Aggregate::Sum(_) => SqlType::Integer,
                Aggregate::Min(c) | Aggregate::Max(c) => c.sql_type(),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use roster_core::query::Query;
    use roster_core::Value;

    #[test]
    fn test_aggregate_types() {
        let query = Query::aggregates([
            Aggregate::Count(Column::Name),
            Aggregate::Max(Column::Birthday),
        ]);
        assert_eq!(
            result_types(query.projection()),
            vec![SqlType::Integer, SqlType::DateTime]
        );
    }

    #[test]
    fn test_sum_over_empty_table_is_null() {
        let schema = TableSchema::students();
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(&schema.to_ddl().unwrap()).unwrap();

        let query = Query::aggregate(Aggregate::Sum(Column::Grade));
        let compiled = crate::sql::compile_select(schema.name(), &query).unwrap();
        let rows = load_rows(&conn, &compiled, &result_types(query.projection())).unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].get(0), Some(&Value::Null));
    }
}
