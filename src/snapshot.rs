//! Export and import of local data as a single JSON document.

use log::{info, warn};
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs;
use std::path::Path;

use crate::dates::now_timestamp;
use crate::error::AppError;
use crate::models::{AppSettings, Completion, Habit};

/// Exported data. Every section is optional on import; a missing section
/// leaves the stored data it covers untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub habits: Option<Vec<Habit>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completions: Option<Vec<Completion>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<AppSettings>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
}

/// What an import wrote.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ImportSummary {
    pub habits: usize,
    pub completions: usize,
    /// Completions dropped because their habit does not exist.
    pub skipped_completions: usize,
    pub settings: bool,
}

impl Snapshot {
    /// Read every habit, completion and the settings into a snapshot.
    pub fn capture(conn: &Connection) -> Result<Self, AppError> {
        Ok(Self {
            habits: Some(Habit::find_all(conn)?),
            completions: Some(Completion::find_all(conn)?),
            settings: Some(AppSettings::load(conn)?),
            exported_at: Some(now_timestamp()),
        })
    }

    pub fn from_json(json: &str) -> Result<Self, AppError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, AppError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn read_from(path: &Path) -> Result<Self, AppError> {
        let json = fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn write_to(&self, path: &Path) -> Result<(), AppError> {
        fs::write(path, self.to_json_pretty()?)?;
        Ok(())
    }

    /// Write the snapshot's sections into the store.
    ///
    /// Habits are upserted and habits absent from the snapshot are deleted
    /// (with their dependent rows). Completions replace the stored set;
    /// entries whose habit does not exist are skipped.
    ///
    /// Not transactional on its own: callers run it inside a transaction.
    pub fn restore(&self, conn: &Connection) -> Result<ImportSummary, AppError> {
        let mut summary = ImportSummary::default();

        if let Some(habits) = &self.habits {
            let keep: HashSet<&str> = habits.iter().map(|h| h.id.as_str()).collect();
            for stale in Habit::find_all(conn)?.iter().filter(|h| !keep.contains(h.id.as_str())) {
                Habit::delete(conn, &stale.id)?;
            }
            for habit in habits {
                habit.upsert(conn)?;
            }
            summary.habits = habits.len();
        }

        if let Some(completions) = &self.completions {
            let known: HashSet<String> = Habit::find_all(conn)?.into_iter().map(|h| h.id).collect();
            Completion::delete_all(conn)?;
            for completion in completions {
                if known.contains(&completion.habit_id) {
                    completion.upsert(conn)?;
                    summary.completions += 1;
                } else {
                    warn!(
                        "Skipping completion for unknown habit {} on {}",
                        completion.habit_id, completion.date
                    );
                    summary.skipped_completions += 1;
                }
            }
        }

        if let Some(settings) = &self.settings {
            settings.save(conn)?;
            summary.settings = true;
        }

        info!(
            "Restored snapshot: {} habits, {} completions ({} skipped)",
            summary.habits, summary.completions, summary.skipped_completions
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CompletionStatus, Locale, Theme};
    use crate::test_utils::{completion, habit_fixture, setup_test_db};

    fn seed(conn: &Connection) {
        habit_fixture("a", "Read").insert(conn).unwrap();
        habit_fixture("b", "Run").insert(conn).unwrap();
        completion("a", "2026-10-15", CompletionStatus::Completed)
            .upsert(conn)
            .unwrap();
        completion("b", "2026-10-16", CompletionStatus::Failed)
            .upsert(conn)
            .unwrap();
    }

    #[test]
    fn test_export_then_import_reproduces_data() {
        let (source, _dir1) = setup_test_db();
        seed(source.connection());
        let snapshot = Snapshot::capture(source.connection()).unwrap();
        let json = snapshot.to_json_pretty().unwrap();

        let (target, _dir2) = setup_test_db();
        let restored = Snapshot::from_json(&json).unwrap();
        let summary = restored.restore(target.connection()).unwrap();
        assert_eq!(summary.habits, 2);
        assert_eq!(summary.completions, 2);

        let conn = target.connection();
        assert_eq!(Some(Habit::find_all(conn).unwrap()), snapshot.habits);
        assert_eq!(Some(Completion::find_all(conn).unwrap()), snapshot.completions);
    }

    #[test]
    fn test_missing_sections_leave_data_untouched() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        seed(conn);

        let snapshot = Snapshot::from_json(r#"{"settings":{"theme":"dark","locale":"en"}}"#).unwrap();
        let summary = snapshot.restore(conn).unwrap();

        assert!(summary.settings);
        assert_eq!(Habit::find_all(conn).unwrap().len(), 2);
        assert_eq!(Completion::find_all(conn).unwrap().len(), 2);
        let settings = AppSettings::load(conn).unwrap();
        assert_eq!(settings.theme, Theme::Dark);
        assert_eq!(settings.locale, Locale::En);
    }

    #[test]
    fn test_habits_section_replaces_habit_set() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        seed(conn);

        let mut renamed = habit_fixture("a", "Read daily");
        renamed.archived = true;
        let snapshot = Snapshot {
            habits: Some(vec![renamed.clone()]),
            ..Snapshot::default()
        };
        snapshot.restore(conn).unwrap();

        assert_eq!(Habit::find_all(conn).unwrap(), vec![renamed]);
        // "b" went away with its completion; "a" kept its own
        let completions = Completion::find_all(conn).unwrap();
        assert_eq!(completions.len(), 1);
        assert_eq!(completions[0].habit_id, "a");
    }

    #[test]
    fn test_orphan_completions_are_skipped() {
        let (db, _dir) = setup_test_db();
        let conn = db.connection();
        habit_fixture("a", "Read").insert(conn).unwrap();

        let json = r#"{"completions":[
            {"habitId":"a","date":"2026-10-16","completedAt":"2026-10-16T08:00:00.000Z"},
            {"habitId":"ghost","date":"2026-10-16","completedAt":"2026-10-16T08:00:00.000Z"}
        ]}"#;
        let summary = Snapshot::from_json(json).unwrap().restore(conn).unwrap();
        assert_eq!(summary.completions, 1);
        assert_eq!(summary.skipped_completions, 1);

        let stored = Completion::find_all(conn).unwrap();
        assert_eq!(stored.len(), 1);
        // status defaults to completed
        assert_eq!(stored[0].status, CompletionStatus::Completed);
    }

    #[test]
    fn test_file_round_trip() {
        let (db, dir) = setup_test_db();
        seed(db.connection());
        let path = dir.path().join("export.json");

        let snapshot = Snapshot::capture(db.connection()).unwrap();
        snapshot.write_to(&path).unwrap();
        assert_eq!(Snapshot::read_from(&path).unwrap(), snapshot);
    }

    #[test]
    fn test_malformed_json_is_rejected() {
        assert!(matches!(
            Snapshot::from_json("{\"habits\": 3}"),
            Err(AppError::Snapshot(_))
        ));
    }
}
