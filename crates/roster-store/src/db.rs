//! Database connection management

use crate::config::{StoreConfig, StoreTarget};
use crate::errors::{from_rusqlite, Result};
use rusqlite::Connection;

/// Open a connection for the configured target
pub fn open(config: &StoreConfig) -> Result<Connection> {
    match config.target {
        StoreTarget::InMemory => open_in_memory(),
    }
}

/// Open an in-memory SQLite database
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}
