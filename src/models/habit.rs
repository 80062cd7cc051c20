use rusqlite::{params, Connection, OptionalExtension, Result, Row};
use serde::{Deserialize, Serialize};

use super::invalid_text;

/// How often a habit is scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Frequency {
    #[default]
    Daily,
    /// Mondays only.
    Weekly,
    /// The weekdays listed in `Habit::custom_days`.
    Custom,
}

impl Frequency {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Custom => "custom",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "daily" => Some(Self::Daily),
            "weekly" => Some(Self::Weekly),
            "custom" => Some(Self::Custom),
            _ => None,
        }
    }
}

/// Build-type habits are done with one action a day; quit-type habits are
/// done by resisting urges `daily_target` times.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HabitType {
    #[default]
    Positive,
    Quit,
}

impl HabitType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Positive => "positive",
            Self::Quit => "quit",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "positive" => Some(Self::Positive),
            "quit" => Some(Self::Quit),
            _ => None,
        }
    }
}

fn default_daily_target() -> u32 {
    1
}

/// A user-defined recurring activity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Habit {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub life_significance: Option<String>,
    pub icon: String,
    pub color: String,
    pub frequency: Frequency,
    /// Weekday indices (0=Sunday..6=Saturday), used when frequency is custom.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_days: Option<Vec<u32>>,
    #[serde(rename = "type", default)]
    pub habit_type: HabitType,
    #[serde(default = "default_daily_target")]
    pub daily_target: u32,
    /// ISO-8601 creation timestamp.
    pub created_at: String,
    #[serde(default)]
    pub archived: bool,
}

const HABIT_COLUMNS: &str = "id, name, description, life_significance, icon, color, frequency, \
     custom_days, habit_type, daily_target, created_at, archived";

/// Encode weekday indices as a comma-separated list, e.g. `[1, 3, 5]` -> "1,3,5".
pub fn encode_days(days: &[u32]) -> String {
    days.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse a comma-separated weekday list, skipping entries that are not numbers.
pub fn decode_days(days: &str) -> Vec<u32> {
    days.split(',')
        .filter_map(|s| s.trim().parse::<u32>().ok())
        .collect()
}

impl Habit {
    fn from_row(row: &Row<'_>) -> Result<Self> {
        let frequency: String = row.get(6)?;
        let custom_days: Option<String> = row.get(7)?;
        let habit_type: String = row.get(8)?;

        Ok(Self {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            life_significance: row.get(3)?,
            icon: row.get(4)?,
            color: row.get(5)?,
            frequency: Frequency::parse(&frequency).ok_or_else(|| invalid_text(6, &frequency))?,
            custom_days: custom_days.as_deref().map(decode_days),
            habit_type: HabitType::parse(&habit_type).ok_or_else(|| invalid_text(8, &habit_type))?,
            daily_target: row.get(9)?,
            created_at: row.get(10)?,
            archived: row.get(11)?,
        })
    }

    pub fn is_quit(&self) -> bool {
        self.habit_type == HabitType::Quit
    }

    /// Find all habits, oldest first.
    pub fn find_all(conn: &Connection) -> Result<Vec<Self>> {
        let mut stmt = conn.prepare(&format!(
            "SELECT {HABIT_COLUMNS} FROM habits ORDER BY created_at, rowid"
        ))?;
        let rows = stmt.query_map([], Self::from_row)?;
        rows.collect()
    }

    pub fn find_by_id(conn: &Connection, id: &str) -> Result<Option<Self>> {
        conn.query_row(
            &format!("SELECT {HABIT_COLUMNS} FROM habits WHERE id = ?1"),
            params![id],
            Self::from_row,
        )
        .optional()
    }

    /// Insert a fully-formed habit record.
    pub fn insert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO habits (id, name, description, life_significance, icon, color, frequency,
                                 custom_days, habit_type, daily_target, created_at, archived)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                self.id,
                self.name,
                self.description,
                self.life_significance,
                self.icon,
                self.color,
                self.frequency.as_str(),
                self.custom_days.as_deref().map(encode_days),
                self.habit_type.as_str(),
                self.daily_target,
                self.created_at,
                self.archived,
            ],
        )?;
        Ok(())
    }

    /// Insert the habit, or overwrite every column (creation time included)
    /// of the habit with the same id. Dependent rows are kept.
    pub fn upsert(&self, conn: &Connection) -> Result<()> {
        conn.execute(
            "INSERT INTO habits (id, name, description, life_significance, icon, color, frequency,
                                 custom_days, habit_type, daily_target, created_at, archived)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
             ON CONFLICT(id) DO UPDATE SET
                 name = excluded.name, description = excluded.description,
                 life_significance = excluded.life_significance, icon = excluded.icon,
                 color = excluded.color, frequency = excluded.frequency,
                 custom_days = excluded.custom_days, habit_type = excluded.habit_type,
                 daily_target = excluded.daily_target, created_at = excluded.created_at,
                 archived = excluded.archived",
            params![
                self.id,
                self.name,
                self.description,
                self.life_significance,
                self.icon,
                self.color,
                self.frequency.as_str(),
                self.custom_days.as_deref().map(encode_days),
                self.habit_type.as_str(),
                self.daily_target,
                self.created_at,
                self.archived,
            ],
        )?;
        Ok(())
    }

    /// Write every mutable field back. `id` and `created_at` never change.
    /// Returns false when no habit has this id.
    pub fn update(&self, conn: &Connection) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE habits
             SET name = ?1, description = ?2, life_significance = ?3, icon = ?4, color = ?5,
                 frequency = ?6, custom_days = ?7, habit_type = ?8, daily_target = ?9, archived = ?10
             WHERE id = ?11",
            params![
                self.name,
                self.description,
                self.life_significance,
                self.icon,
                self.color,
                self.frequency.as_str(),
                self.custom_days.as_deref().map(encode_days),
                self.habit_type.as_str(),
                self.daily_target,
                self.archived,
                self.id,
            ],
        )?;
        Ok(rows_affected > 0)
    }

    pub fn set_archived(conn: &Connection, id: &str, archived: bool) -> Result<bool> {
        let rows_affected = conn.execute(
            "UPDATE habits SET archived = ?1 WHERE id = ?2",
            params![archived, id],
        )?;
        Ok(rows_affected > 0)
    }

    /// Delete a habit. Completions, urge logs, coping steps and the rocket
    /// ledger entry go with it through `ON DELETE CASCADE`.
    pub fn delete(conn: &Connection, id: &str) -> Result<bool> {
        let rows_affected = conn.execute("DELETE FROM habits WHERE id = ?1", params![id])?;
        Ok(rows_affected > 0)
    }

    pub fn delete_all(conn: &Connection) -> Result<usize> {
        conn.execute("DELETE FROM habits", [])
    }
}
