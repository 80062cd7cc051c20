use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Rocket ledger entry: how many rescues a habit can spend and how many days
/// until it earns the next one. A habit without an entry has none.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RocketBalance {
    pub rockets: u32,
    pub next_in: u32,
}

impl RocketBalance {
    fn from_row(row: &Row<'_>) -> Result<(String, Self)> {
        Ok((
            row.get(0)?,
            Self {
                rockets: row.get(1)?,
                next_in: row.get(2)?,
            },
        ))
    }

    pub fn find_all(conn: &Connection) -> Result<HashMap<String, Self>> {
        let mut stmt = conn.prepare("SELECT habit_id, rockets, next_in FROM rocket_ledger")?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect()
    }

    pub fn find_for_habit(conn: &Connection, habit_id: &str) -> Result<Self> {
        let balance = conn
            .query_row(
                "SELECT habit_id, rockets, next_in FROM rocket_ledger WHERE habit_id = ?1",
                params![habit_id],
                Self::from_row,
            )
            .optional()?;
        Ok(balance.map(|(_, b)| b).unwrap_or_default())
    }

    pub fn set(&self, conn: &Connection, habit_id: &str) -> Result<()> {
        conn.execute(
            "INSERT INTO rocket_ledger (habit_id, rockets, next_in) VALUES (?1, ?2, ?3)
             ON CONFLICT(habit_id) DO UPDATE SET rockets = excluded.rockets, next_in = excluded.next_in",
            params![habit_id, self.rockets, self.next_in],
        )?;
        Ok(())
    }

    /// Spend one rocket. Returns false when the habit has none left.
    pub fn consume(conn: &Connection, habit_id: &str) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE rocket_ledger SET rockets = rockets - 1 WHERE habit_id = ?1 AND rockets > 0",
            params![habit_id],
        )?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{habit_fixture, setup_test_db};

    #[test]
    fn test_missing_entry_is_zero() {
        let (db, _dir) = setup_test_db();
        let balance = RocketBalance::find_for_habit(db.connection(), "h1").unwrap();
        assert_eq!(balance, RocketBalance::default());
    }

    #[test]
    fn test_set_and_consume() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        habit_fixture("h1", "Run").insert(conn).unwrap();

        RocketBalance { rockets: 1, next_in: 3 }.set(conn, "h1").unwrap();

        assert!(RocketBalance::consume(conn, "h1").unwrap());
        assert!(!RocketBalance::consume(conn, "h1").unwrap());

        let balance = RocketBalance::find_for_habit(conn, "h1").unwrap();
        assert_eq!(balance, RocketBalance { rockets: 0, next_in: 3 });
    }

    #[test]
    fn test_find_all_keyed_by_habit() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        habit_fixture("a", "A").insert(conn).unwrap();
        habit_fixture("b", "B").insert(conn).unwrap();

        RocketBalance { rockets: 2, next_in: 1 }.set(conn, "a").unwrap();
        RocketBalance { rockets: 0, next_in: 7 }.set(conn, "b").unwrap();
        RocketBalance { rockets: 3, next_in: 0 }.set(conn, "a").unwrap();

        let all = RocketBalance::find_all(conn).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all["a"].rockets, 3);
        assert_eq!(all["b"].next_in, 7);
    }
}
