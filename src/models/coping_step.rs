use rusqlite::{params, Connection, Result, Row};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One line of a quit habit's urge-resistance checklist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CopingStep {
    pub id: String,
    pub habit_id: String,
    pub title: String,
    pub sort_order: u32,
}

impl CopingStep {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            habit_id: row.get(1)?,
            title: row.get(2)?,
            sort_order: row.get(3)?,
        })
    }

    /// Steps for one habit in checklist order.
    pub fn find_for_habit(conn: &Connection, habit_id: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, title, sort_order FROM coping_steps
             WHERE habit_id = ?1 ORDER BY sort_order",
        )?;
        let rows = stmt.query_map(params![habit_id], Self::from_row)?;
        rows.collect()
    }

    /// All steps keyed by habit id, each list in checklist order.
    pub fn find_all_grouped(conn: &Connection) -> Result<HashMap<String, Vec<Self>>> {
        let mut stmt = conn.prepare(
            "SELECT id, habit_id, title, sort_order FROM coping_steps
             ORDER BY habit_id, sort_order",
        )?;
        let rows = stmt.query_map([], Self::from_row)?;

        let mut grouped: HashMap<String, Vec<Self>> = HashMap::new();
        for step in rows {
            let step = step?;
            grouped.entry(step.habit_id.clone()).or_default().push(step);
        }
        Ok(grouped)
    }

    /// Replace a habit's checklist: delete every step, then insert `titles`
    /// in order. Not diffed, so step ids change on every replacement.
    ///
    /// Run inside a transaction when the delete and inserts must land together.
    pub fn replace_for_habit(
        conn: &Connection,
        habit_id: &str,
        titles: &[String],
    ) -> Result<Vec<Self>> {
        conn.execute("DELETE FROM coping_steps WHERE habit_id = ?1", params![habit_id])?;

        let mut steps = Vec::with_capacity(titles.len());
        for (sort_order, title) in (0u32..).zip(titles) {
            let step = Self {
                id: uuid::Uuid::new_v4().to_string(),
                habit_id: habit_id.to_string(),
                title: title.clone(),
                sort_order,
            };
            conn.execute(
                "INSERT INTO coping_steps (id, habit_id, title, sort_order) VALUES (?1, ?2, ?3, ?4)",
                params![step.id, step.habit_id, step.title, step.sort_order],
            )?;
            steps.push(step);
        }
        Ok(steps)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::HabitType;
    use crate::test_utils::{habit_fixture, setup_test_db};

    fn titles(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_replace_assigns_sort_order() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        let mut habit = habit_fixture("q", "No snacks");
        habit.habit_type = HabitType::Quit;
        habit.insert(conn).unwrap();

        let steps =
            CopingStep::replace_for_habit(conn, "q", &titles(&["Drink water", "Walk"])).unwrap();
        assert_eq!(steps.len(), 2);

        let found = CopingStep::find_for_habit(conn, "q").unwrap();
        assert_eq!(found, steps);
        assert_eq!(found[0].sort_order, 0);
        assert_eq!(found[1].title, "Walk");
    }

    #[test]
    fn test_replace_drops_previous_steps() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        habit_fixture("q", "No snacks").insert(conn).unwrap();

        CopingStep::replace_for_habit(conn, "q", &titles(&["A", "B", "C"])).unwrap();
        CopingStep::replace_for_habit(conn, "q", &titles(&["D"])).unwrap();

        let found = CopingStep::find_for_habit(conn, "q").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "D");
    }

    #[test]
    fn test_find_all_grouped() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        habit_fixture("a", "A").insert(conn).unwrap();
        habit_fixture("b", "B").insert(conn).unwrap();

        CopingStep::replace_for_habit(conn, "a", &titles(&["1", "2"])).unwrap();
        CopingStep::replace_for_habit(conn, "b", &titles(&["3"])).unwrap();

        let grouped = CopingStep::find_all_grouped(conn).unwrap();
        assert_eq!(grouped.len(), 2);
        assert_eq!(grouped["a"].len(), 2);
        assert_eq!(grouped["b"][0].title, "3");
    }
}
