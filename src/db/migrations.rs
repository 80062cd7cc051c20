use rusqlite::{Connection, Result};

use super::schema::SCHEMA;
use crate::models::AppSettings;

pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(SCHEMA)?;
    seed_default_settings(conn)?;
    Ok(())
}

fn seed_default_settings(conn: &Connection) -> Result<()> {
    let count: i32 = conn.query_row("SELECT COUNT(*) FROM settings", [], |row| row.get(0))?;

    if count == 0 {
        AppSettings::default().save(conn)?;
    }
    Ok(())
}
