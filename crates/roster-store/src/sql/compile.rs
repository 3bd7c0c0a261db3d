use roster_core::query::{
    Aggregate, Assignment, Column, Direction, Predicate, Projection, Query, UpdateExpr,
};
use roster_core::Value;

use crate::errors::Result;

/// SQL text plus its positional parameters, in order
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSql {
    pub sql: String,
    pub params: Vec<Value>,
}

/// `SELECT <projection> FROM <table> [WHERE] [ORDER BY] [LIMIT/OFFSET]`
pub fn compile_select(table: &str, query: &Query) -> Result<CompiledSql> {
    query.validate()?;

    let mut params = Vec::new();
    let mut sql = format!("SELECT {} FROM {}", select_list(query.projection()), table);
    push_where(&mut sql, &mut params, query.filters());
    push_window(&mut sql, &mut params, query);

    Ok(CompiledSql { sql, params })
}

/// `SELECT count(*)` over the rows the query would return
pub fn compile_count(table: &str, query: &Query) -> Result<CompiledSql> {
    query.validate()?;

    let mut params = Vec::new();
    let sql = if query.has_window() {
        let mut inner = format!("SELECT {} FROM {}", Column::Id, table);
        push_where(&mut inner, &mut params, query.filters());
        push_window(&mut inner, &mut params, query);
        format!("SELECT count(*) FROM ({})", inner)
    } else {
        let mut sql = format!("SELECT count(*) FROM {}", table);
        push_where(&mut sql, &mut params, query.filters());
        sql
    };

    Ok(CompiledSql { sql, params })
}

/// `UPDATE <table> SET ... WHERE ...`
///
/// The query's projection is ignored; ordering and limits select the target
/// rows through an id subquery.
pub fn compile_update(
    table: &str,
    query: &Query,
    assignments: &[Assignment],
) -> Result<CompiledSql> {
    query.validate()?;
    if assignments.is_empty() {
        return Err(roster_core::RosterError::InvalidQuery {
            reason: "update with no assignments".to_string(),
        }
        .into());
    }
    for assignment in assignments {
        assignment.validate()?;
    }

    let mut params = Vec::new();
    let set_list = assignments
        .iter()
        .map(|assignment| match &assignment.expr {
            UpdateExpr::Literal(value) => {
                params.push(value.clone());
                format!("{} = ?", assignment.column)
            }
            UpdateExpr::Offset { column, delta } => {
                params.push(Value::Integer(*delta));
                format!("{} = {} + ?", assignment.column, column)
            }
        })
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("UPDATE {} SET {}", table, set_list);
    push_target_rows(&mut sql, &mut params, table, query);

    Ok(CompiledSql { sql, params })
}

/// `DELETE FROM <table> WHERE ...`
pub fn compile_delete(table: &str, query: &Query) -> Result<CompiledSql> {
    query.validate()?;

    let mut params = Vec::new();
    let mut sql = format!("DELETE FROM {}", table);
    push_target_rows(&mut sql, &mut params, table, query);

    Ok(CompiledSql { sql, params })
}

fn select_list(projection: &Projection) -> String {
    let parts: Vec<String> = match projection {
        Projection::Entity => Column::ALL.iter().map(|c| c.name().to_string()).collect(),
        Projection::Columns(columns) => columns.iter().map(|c| c.name().to_string()).collect(),
        Projection::Aggregates(aggregates) => aggregates.iter().map(aggregate_sql).collect(),
    };
    parts.join(", ")
}

fn aggregate_sql(aggregate: &Aggregate) -> String {
    format!("{}({})", aggregate.function_name(), aggregate.column())
}

fn push_where(sql: &mut String, params: &mut Vec<Value>, filters: &[Predicate]) {
    if filters.is_empty() {
        return;
    }
    let clauses: Vec<String> = filters
        .iter()
        .map(|predicate| predicate_sql(predicate, params))
        .collect();
    sql.push_str(" WHERE ");
    sql.push_str(&clauses.join(" AND "));
}

fn push_window(sql: &mut String, params: &mut Vec<Value>, query: &Query) {
    if !query.ordering().is_empty() {
        let order: Vec<String> = query
            .ordering()
            .iter()
            .map(|o| {
                let direction = match o.direction {
                    Direction::Asc => "ASC",
                    Direction::Desc => "DESC",
                };
                format!("{} {}", o.column, direction)
            })
            .collect();
        sql.push_str(" ORDER BY ");
        sql.push_str(&order.join(", "));
    }

    match (query.limit_value(), query.offset_value()) {
        (None, None) => {}
        (limit, offset) => {
            // SQLite only accepts OFFSET after LIMIT; -1 means unbounded
            let limit = limit.map(|l| l as i64).unwrap_or(-1);
            sql.push_str(" LIMIT ?");
            params.push(Value::Integer(limit));
            if let Some(offset) = offset {
                sql.push_str(" OFFSET ?");
                params.push(Value::Integer(offset as i64));
            }
        }
    }
}

/// WHERE clause for UPDATE/DELETE; windowed queries go through an id subquery
fn push_target_rows(sql: &mut String, params: &mut Vec<Value>, table: &str, query: &Query) {
    if query.has_window() {
        let mut inner = format!("SELECT {} FROM {}", Column::Id, table);
        push_where(&mut inner, params, query.filters());
        push_window(&mut inner, params, query);
        sql.push_str(&format!(" WHERE {} IN ({})", Column::Id, inner));
    } else {
        push_where(sql, params, query.filters());
    }
}

fn predicate_sql(predicate: &Predicate, params: &mut Vec<Value>) -> String {
    match predicate {
        Predicate::Compare { column, op, value } => {
            params.push(value.clone());
            format!("{} {} ?", column, op.as_sql())
        }
        Predicate::Like { column, pattern } => {
            params.push(Value::Text(pattern.clone()));
            format!("{} LIKE ?", column)
        }
        Predicate::IsNull(column) => format!("{} IS NULL", column),
        Predicate::And(parts) => group(parts, " AND ", params),
        Predicate::Or(parts) => group(parts, " OR ", params),
        Predicate::Not(inner) => format!("NOT ({})", predicate_sql(inner, params)),
    }
}

fn group(parts: &[Predicate], joiner: &str, params: &mut Vec<Value>) -> String {
    let rendered: Vec<String> = parts.iter().map(|p| predicate_sql(p, params)).collect();
    format!("({})", rendered.join(joiner))
}
