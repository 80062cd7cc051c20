use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};

use crate::dates::now_timestamp;

/// One resisted-urge attempt for a quit habit on a given day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrgeLog {
    pub id: String,
    pub habit_id: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    /// Coping-step ids checked off so far, in the order they were checked.
    pub completed_steps: Vec<String>,
    /// Set once every configured step has been checked off.
    pub all_completed: bool,
    pub created_at: String,
}

const URGE_LOG_COLUMNS: &str = "id, habit_id, date, completed_steps, all_completed, created_at";

fn encode_steps(steps: &[String]) -> Result<String> {
    serde_json::to_string(steps).map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))
}

impl UrgeLog {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let steps: String = row.get(3)?;
        let completed_steps = serde_json::from_str(&steps).map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(3, rusqlite::types::Type::Text, Box::new(e))
        })?;

        Ok(Self {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            date: row.get(2)?,
            completed_steps,
            all_completed: row.get(4)?,
            created_at: row.get(5)?,
        })
    }

    /// Start a new attempt with an empty step set.
    pub fn create(conn: &Connection, habit_id: &str, date: &str) -> Result<Self> {
        let log = Self {
            id: uuid::Uuid::new_v4().to_string(),
            habit_id: habit_id.to_string(),
            date: date.to_string(),
            completed_steps: Vec::new(),
            all_completed: false,
            created_at: now_timestamp(),
        };
        log.insert(conn)?;
        Ok(log)
    }

    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO urge_logs (id, habit_id, date, completed_steps, all_completed, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                self.id,
                self.habit_id,
                self.date,
                encode_steps(&self.completed_steps)?,
                self.all_completed,
                self.created_at,
            ],
        )?;
        Ok(())
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Self>> {
        conn.query_row(
            &format!("SELECT {URGE_LOG_COLUMNS} FROM urge_logs WHERE id = ?1"),
            params![id],
            Self::from_row,
        )
        .optional()
    }

    /// All attempts logged on one day, across habits.
    pub fn find_for_date(conn: &Connection, date: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {URGE_LOG_COLUMNS} FROM urge_logs WHERE date = ?1 ORDER BY created_at, rowid"
        ))?;
        let rows = stmt.query_map(params![date], Self::from_row)?;
        rows.collect()
    }

    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {URGE_LOG_COLUMNS} FROM urge_logs ORDER BY date, created_at, rowid"
        ))?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect()
    }

    /// Check off a step. A step already checked is not added twice.
    /// `all_completed` is only ever raised, never cleared.
    pub fn check_step(&mut self, step_id: &str, all_done: bool) {
        if !self.completed_steps.iter().any(|s| s == step_id) {
            self.completed_steps.push(step_id.to_string());
        }
        self.all_completed = self.all_completed || all_done;
    }

    /// Persist the step set and completion flag.
    pub fn update_steps(&self, conn: &Connection) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE urge_logs SET completed_steps = ?1, all_completed = ?2 WHERE id = ?3",
            params![encode_steps(&self.completed_steps)?, self.all_completed, self.id],
        )?;
        Ok(rows_affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{habit_fixture, setup_test_db};

    #[test]
    fn test_create_starts_empty() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        habit_fixture("q", "No sugar").insert(conn).unwrap();

        let log = UrgeLog::create(conn, "q", "2026-03-01").unwrap();
        assert!(log.completed_steps.is_empty());
        assert!(!log.all_completed);

        let found = UrgeLog::find_by_id(conn, &log.id).unwrap();
        assert_eq!(found, Some(log));
    }

    #[test]
    fn test_check_step_and_update() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        habit_fixture("q", "No sugar").insert(conn).unwrap();

        let mut log = UrgeLog::create(conn, "q", "2026-03-01").unwrap();
        log.check_step("s1", false);
        log.check_step("s1", false);
        log.check_step("s2", true);
        assert!(log.update_steps(conn).unwrap());

        let found = UrgeLog::find_by_id(conn, &log.id).unwrap().unwrap();
        assert_eq!(found.completed_steps, vec!["s1", "s2"]);
        assert!(found.all_completed);
    }

    #[test]
    fn test_all_completed_is_sticky() {
        let mut log = UrgeLog {
            id: "l".into(),
            habit_id: "q".into(),
            date: "2026-03-01".into(),
            completed_steps: vec![],
            all_completed: true,
            created_at: String::new(),
        };
        log.check_step("s1", false);
        assert!(log.all_completed);
    }

    #[test]
    fn test_many_attempts_per_day() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        habit_fixture("q", "No sugar").insert(conn).unwrap();

        UrgeLog::create(conn, "q", "2026-03-01").unwrap();
        UrgeLog::create(conn, "q", "2026-03-01").unwrap();
        UrgeLog::create(conn, "q", "2026-03-02").unwrap();

        assert_eq!(UrgeLog::find_for_date(conn, "2026-03-01").unwrap().len(), 2);
        assert_eq!(UrgeLog::find_all(conn).unwrap().len(), 3);
    }
}
