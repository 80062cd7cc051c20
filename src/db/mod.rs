pub mod schema;
pub mod migrations;
pub mod helpers;
pub use helpers::{lock_db, with_connection};

use rusqlite::{Connection, Result};
use std::path::Path;

pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open (or create) the database file with foreign-key enforcement on,
    /// so deleting a habit cascades to its dependent rows.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.pragma_update(None, "foreign_keys", true)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
