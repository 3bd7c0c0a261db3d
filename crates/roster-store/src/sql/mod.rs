//! Compilation of typed queries to parameterised SQL
//!
//! Identifiers in the generated text come only from `Column::name` and a
//! validated table name; every value travels as a bound parameter.

mod compile;
mod params;

pub use compile::{compile_count, compile_delete, compile_select, compile_update, CompiledSql};
pub use params::{read_value, SqlValue};
