//! Typed query construction
//!
//! A `Query` describes what to select (whole records, a column projection, or
//! aggregates), which rows (conjunction of predicates), in what order, and how
//! many. It carries no SQL; the storage layer compiles it.

pub mod column;
pub mod predicate;
pub mod update;

pub use column::Column;
pub use predicate::{CompareOp, Predicate};
pub use update::{Assignment, UpdateExpr};

use crate::errors::{Result, RosterError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Asc,
    Desc,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderBy {
    pub column: Column,
    pub direction: Direction,
}

/// Aggregate function over the matching rows
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Aggregate {
    /// Non-null values of the column
    Count(Column),
    Sum(Column),
    Min(Column),
    Max(Column),
}

impl Aggregate {
    pub fn column(&self) -> Column {
        match self {
            Aggregate::Count(c) | Aggregate::Sum(c) | Aggregate::Min(c) | Aggregate::Max(c) => *c,
        }
    }

    pub fn function_name(&self) -> &'static str {
        match self {
            Aggregate::Count(_) => "count",
            Aggregate::Sum(_) => "sum",
            Aggregate::Min(_) => "min",
            Aggregate::Max(_) => "max",
        }
    }
}

/// What a query returns per row
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Projection {
    /// Every column, mapped back to `Student`
    Entity,
    Columns(Vec<Column>),
    Aggregates(Vec<Aggregate>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    projection: Projection,
    filters: Vec<Predicate>,
    order_by: Vec<OrderBy>,
    limit: Option<usize>,
    offset: Option<usize>,
}

impl Query {
    fn with_projection(projection: Projection) -> Self {
        Self {
            projection,
            filters: Vec::new(),
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }

    /// Whole `Student` records
    pub fn students() -> Self {
        Self::with_projection(Projection::Entity)
    }

    /// A projection of specific columns, returned as `Row` tuples
    pub fn columns(columns: impl IntoIterator<Item = Column>) -> Self {
        Self::with_projection(Projection::Columns(columns.into_iter().collect()))
    }

    /// A single aggregate, e.g. `Aggregate::Count(Column::Id)`
    pub fn aggregate(aggregate: Aggregate) -> Self {
        Self::with_projection(Projection::Aggregates(vec![aggregate]))
    }

    pub fn aggregates(aggregates: impl IntoIterator<Item = Aggregate>) -> Self {
        Self::with_projection(Projection::Aggregates(aggregates.into_iter().collect()))
    }

    /// Add a filter; several filters are combined with AND
    pub fn filter(mut self, predicate: Predicate) -> Self {
        self.filters.push(predicate);
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    /// Same filters, projecting whole records instead
    pub fn as_entities(&self) -> Self {
        let mut query = self.clone();
        query.projection = Projection::Entity;
        query
    }

    pub fn projection(&self) -> &Projection {
        &self.projection
    }

    pub fn filters(&self) -> &[Predicate] {
        &self.filters
    }

    pub fn ordering(&self) -> &[OrderBy] {
        &self.order_by
    }

    pub fn limit_value(&self) -> Option<usize> {
        self.limit
    }

    pub fn offset_value(&self) -> Option<usize> {
        self.offset
    }

    /// True when the query narrows or reorders rows beyond a plain filter
    pub fn has_window(&self) -> bool {
        self.limit.is_some() || self.offset.is_some() || !self.order_by.is_empty()
    }

    /// # Errors
    ///
    /// Returns `InvalidQuery` for an empty projection and propagates
    /// predicate type errors.
    pub fn validate(&self) -> Result<()> {
        match &self.projection {
            Projection::Columns(columns) if columns.is_empty() => {
                return Err(RosterError::InvalidQuery {
                    reason: "projection selects no columns".to_string(),
                })
            }
            Projection::Aggregates(aggregates) if aggregates.is_empty() => {
                return Err(RosterError::InvalidQuery {
                    reason: "no aggregates selected".to_string(),
                })
            }
            Projection::Aggregates(aggregates) => {
                for aggregate in aggregates {
                    if matches!(aggregate, Aggregate::Sum(_))
                        && !matches!(aggregate.column().sql_type(), crate::schema::SqlType::Integer)
                    {
                        return Err(RosterError::InvalidQuery {
                            reason: format!("sum over non-integer column {}", aggregate.column()),
                        });
                    }
                }
            }
            _ => {}
        }
        self.filters.iter().try_for_each(Predicate::validate)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder_accumulates() {
        let query = Query::columns([Column::Name, Column::Birthday])
            .order_by(Column::Grade.desc())
            .limit(1);

        assert_eq!(
            query.projection(),
            &Projection::Columns(vec![Column::Name, Column::Birthday])
        );
        assert_eq!(query.ordering()[0].direction, Direction::Desc);
        assert_eq!(query.limit_value(), Some(1));
        assert!(query.has_window());
    }

    #[test]
    fn test_as_entities_keeps_filters() {
        let query = Query::columns([Column::Name]).filter(Column::Grade.is(11));
        let entities = query.as_entities();
        assert_eq!(entities.projection(), &Projection::Entity);
        assert_eq!(entities.filters(), query.filters());
    }

    #[test]
    fn test_empty_projection_rejected() {
        assert!(Query::columns([]).validate().is_err());
    }

    #[test]
    fn test_sum_over_text_rejected() {
        assert!(Query::aggregate(Aggregate::Sum(Column::Name))
            .validate()
            .is_err());
        assert!(Query::aggregate(Aggregate::Sum(Column::Grade))
            .validate()
            .is_ok());
    }
}
