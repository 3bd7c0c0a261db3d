//! CLI commands

pub mod demo;
