use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};

use super::invalid_text;
use crate::dates::now_timestamp;

/// Outcome recorded for a habit on one calendar day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompletionStatus {
    #[default]
    Completed,
    Failed,
    /// A failed day rescued by spending a rocket.
    RocketUsed,
}

impl CompletionStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
            Self::Failed => "failed",
            Self::RocketUsed => "rocket_used",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            "rocket_used" => Some(Self::RocketUsed),
            _ => None,
        }
    }

    /// Whether a day with this status feeds streak and completion-rate
    /// arithmetic. Only a literal `completed` counts; a rescued day does not.
    pub fn counts_toward_streak(self) -> bool {
        match self {
            Self::Completed => true,
            Self::Failed | Self::RocketUsed => false,
        }
    }
}

/// One record per (habit, day).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Completion {
    pub habit_id: String,
    /// Calendar day, `YYYY-MM-DD`.
    pub date: String,
    #[serde(default)]
    pub status: CompletionStatus,
    /// ISO-8601 timestamp of the last write.
    pub completed_at: String,
}

impl Completion {
    /// Create a completion stamped with the current time (not yet saved).
    pub fn new(habit_id: &str, date: &str, status: CompletionStatus) -> Self {
        Self {
            habit_id: habit_id.to_string(),
            date: date.to_string(),
            status,
            completed_at: now_timestamp(),
        }
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        let status: String = row.get(2)?;
        Ok(Self {
            habit_id: row.get(0)?,
            date: row.get(1)?,
            status: CompletionStatus::parse(&status).ok_or_else(|| invalid_text(2, &status))?,
            completed_at: row.get(3)?,
        })
    }

    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT habit_id, date, status, completed_at FROM completions ORDER BY date, habit_id",
        )?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect()
    }

    pub fn find_for_habit(conn: &Connection, habit_id: &str) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(
            "SELECT habit_id, date, status, completed_at FROM completions
             WHERE habit_id = ?1 ORDER BY date",
        )?;
        let rows = stmt.query_map(params![habit_id], Self::from_row)?;
        rows.collect()
    }

    pub fn find_one(conn: &Connection, habit_id: &str, date: &str) -> Result<Option<Self>> {
        conn.query_row(
            "SELECT habit_id, date, status, completed_at FROM completions
             WHERE habit_id = ?1 AND date = ?2",
            params![habit_id, date],
            Self::from_row,
        )
        .optional()
    }

    /// Write this record, replacing any existing status for the same day.
    pub fn upsert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO completions (habit_id, date, status, completed_at)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(habit_id, date)
             DO UPDATE SET status = excluded.status, completed_at = excluded.completed_at",
            params![self.habit_id, self.date, self.status.as_str(), self.completed_at],
        )?;
        Ok(())
    }

    pub fn delete(conn: &Connection, habit_id: &str, date: &str) -> Result<bool> {
        let rows_affected = conn.execute(
            "DELETE FROM completions WHERE habit_id = ?1 AND date = ?2",
            params![habit_id, date],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn delete_all(conn: &Connection) -> Result<usize> {
        conn.execute("DELETE FROM completions", [])
    }
}
