//! Repository layer for the `students` table
//!
//! Row-level writes live in `student_repo`; reading rows back into records
//! and tuples lives in `hydration`.

pub mod hydration;
pub mod student_repo;

pub use student_repo::StudentRepo;
