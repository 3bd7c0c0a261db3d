//! Store configuration
//!
//! Built in code; there are no configuration files or environment variables.

use chrono::{Local, NaiveDateTime};
use roster_core::schema::TableSchema;

/// Where the engine's single connection points
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreTarget {
    /// Process-local SQLite database that disappears with the connection
    #[default]
    InMemory,
}

/// How `enrolled_date` is filled when a record leaves it unset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EnrolledDatePolicy {
    /// Local time at the moment each row is written
    #[default]
    PerInsert,
    /// The single timestamp captured when the schema was declared
    AtSchemaLoad,
    /// A caller-chosen constant
    Fixed(NaiveDateTime),
}

impl EnrolledDatePolicy {
    /// Resolve the default for one insert
    pub fn resolve(&self, schema: &TableSchema) -> NaiveDateTime {
        match self {
            EnrolledDatePolicy::PerInsert => Local::now().naive_local(),
            EnrolledDatePolicy::AtSchemaLoad => schema.loaded_at(),
            EnrolledDatePolicy::Fixed(at) => *at,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub target: StoreTarget,
    pub enrolled_date: EnrolledDatePolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            target: StoreTarget::InMemory,
            enrolled_date: EnrolledDatePolicy::PerInsert,
        }
    }
}

impl StoreConfig {
    pub fn with_enrolled_date(mut self, policy: EnrolledDatePolicy) -> Self {
        self.enrolled_date = policy;
        self
    }
}
