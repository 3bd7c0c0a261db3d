//! Record model: the `Student` entity and the dynamic values query results carry

pub mod row;
pub mod student;
pub mod value;

pub use row::Row;
pub use student::{date, Student};
pub use value::Value;
