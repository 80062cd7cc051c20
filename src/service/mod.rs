//! Habit operations over the shared database.
//!
//! Every operation takes the database lock once for its whole duration.
//! Writes that touch more than one row run inside a `SQLite` transaction.

pub mod requests;

pub use requests::{HabitPatch, NewHabit};

use chrono::NaiveDate;
use log::info;
use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};

use crate::dates::now_timestamp;
use crate::db::{with_connection, Database};
use crate::error::{is_fk_violation, AppError};
use crate::models::{
    AppSettings, Completion, CompletionStatus, CopingStep, Habit, RocketBalance, SettingsUpdate,
    UrgeLog,
};
use crate::snapshot::{ImportSummary, Snapshot};
use crate::stats::{overview, HabitWithStats, OverviewStats, StatsEngine, StatsSources};
use crate::validation::{
    validate_coping_steps, validate_custom_days, validate_daily_target, validate_date,
    validate_habit_name, validate_label, validate_note,
};

fn require_habit(conn: &Connection, id: &str) -> Result<Habit, AppError> {
    Habit::find_by_id(conn, id)?.ok_or(AppError::NotFound { entity: "Habit" })
}

/// Map a foreign-key failure on a habit-owned row to a missing habit.
fn habit_fk(e: rusqlite::Error) -> AppError {
    if is_fk_violation(&e) {
        AppError::NotFound { entity: "Habit" }
    } else {
        AppError::Database(e)
    }
}

fn apply_patch(mut habit: Habit, patch: &HabitPatch) -> Result<Habit, AppError> {
    if let Some(name) = &patch.name {
        habit.name = validate_habit_name(name)?.to_string();
    }
    if let Some(description) = &patch.description {
        habit.description = validate_note("description", Some(description))?;
    }
    if let Some(significance) = &patch.life_significance {
        habit.life_significance = validate_note("life_significance", Some(significance))?;
    }
    if let Some(icon) = &patch.icon {
        habit.icon = validate_label("icon", icon)?.to_string();
    }
    if let Some(color) = &patch.color {
        habit.color = validate_label("color", color)?.to_string();
    }
    if let Some(frequency) = patch.frequency {
        habit.frequency = frequency;
    }
    let days = patch.custom_days.as_deref().or(habit.custom_days.as_deref());
    habit.custom_days = validate_custom_days(habit.frequency, days)?;
    if let Some(habit_type) = patch.habit_type {
        habit.habit_type = habit_type;
    }
    if let Some(target) = patch.daily_target {
        validate_daily_target(target)?;
        habit.daily_target = target;
    }
    Ok(habit)
}

pub struct HabitService {
    db: Arc<Mutex<Database>>,
    today: Option<NaiveDate>,
}

impl HabitService {
    pub fn new(db: Arc<Mutex<Database>>) -> Self {
        Self { db, today: None }
    }

    /// Evaluate "today" as a fixed day instead of the local clock.
    #[must_use]
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    fn engine(&self) -> StatsEngine {
        self.today.map_or_else(StatsEngine::for_today, StatsEngine::new)
    }

    pub fn database(&self) -> Arc<Mutex<Database>> {
        Arc::clone(&self.db)
    }

    // ── Habits ────────────────────────────────────────────────────────

    pub fn list_habits(&self) -> Result<Vec<Habit>, AppError> {
        with_connection(&self.db, "list habits", |db| Ok(Habit::find_all(db.connection())?))
    }

    pub fn get_habit(&self, id: &str) -> Result<Habit, AppError> {
        with_connection(&self.db, "get habit", |db| require_habit(db.connection(), id))
    }

    pub fn add_habit(&self, new: &NewHabit) -> Result<Habit, AppError> {
        validate_daily_target(new.daily_target)?;
        let habit = Habit {
            id: uuid::Uuid::new_v4().to_string(),
            name: validate_habit_name(&new.name)?.to_string(),
            description: validate_note("description", new.description.as_deref())?,
            life_significance: validate_note("life_significance", new.life_significance.as_deref())?,
            icon: validate_label("icon", &new.icon)?.to_string(),
            color: validate_label("color", &new.color)?.to_string(),
            frequency: new.frequency,
            custom_days: validate_custom_days(new.frequency, new.custom_days.as_deref())?,
            habit_type: new.habit_type,
            daily_target: new.daily_target,
            created_at: now_timestamp(),
            archived: false,
        };
        let steps = validate_coping_steps(&new.coping_steps)?;

        with_connection(&self.db, "add habit", |db| {
            let tx = db.connection().unchecked_transaction()?;
            habit.insert(&tx)?;
            if habit.is_quit() {
                CopingStep::replace_for_habit(&tx, &habit.id, &steps)?;
            }
            tx.commit()?;
            info!("Added habit {} ({})", habit.id, habit.habit_type.as_str());
            Ok(habit)
        })
    }

    /// Apply a partial update. Coping steps are replaced when the patch
    /// carries them, and dropped when the habit stops being a quit habit.
    pub fn update_habit(&self, id: &str, patch: &HabitPatch) -> Result<Habit, AppError> {
        let steps = patch
            .coping_steps
            .as_deref()
            .map(validate_coping_steps)
            .transpose()?;

        with_connection(&self.db, "update habit", |db| {
            let tx = db.connection().unchecked_transaction()?;
            let habit = apply_patch(require_habit(&tx, id)?, patch)?;
            habit.update(&tx)?;

            if !habit.is_quit() {
                CopingStep::replace_for_habit(&tx, id, &[])?;
            } else if let Some(steps) = &steps {
                CopingStep::replace_for_habit(&tx, id, steps)?;
            }

            tx.commit()?;
            Ok(habit)
        })
    }

    pub fn archive_habit(&self, id: &str, archived: bool) -> Result<(), AppError> {
        with_connection(&self.db, "archive habit", |db| {
            if !Habit::set_archived(db.connection(), id, archived)? {
                return Err(AppError::NotFound { entity: "Habit" });
            }
            Ok(())
        })
    }

    /// Delete a habit with all its completions, urge logs and coping steps.
    pub fn delete_habit(&self, id: &str) -> Result<(), AppError> {
        with_connection(&self.db, "delete habit", |db| {
            if !Habit::delete(db.connection(), id)? {
                return Err(AppError::NotFound { entity: "Habit" });
            }
            info!("Deleted habit {id}");
            Ok(())
        })
    }

    pub fn coping_steps(&self, habit_id: &str) -> Result<Vec<CopingStep>, AppError> {
        with_connection(&self.db, "load coping steps", |db| {
            let conn = db.connection();
            require_habit(conn, habit_id)?;
            Ok(CopingStep::find_for_habit(conn, habit_id)?)
        })
    }

    // ── Completions ───────────────────────────────────────────────────

    pub fn completions(&self) -> Result<Vec<Completion>, AppError> {
        with_connection(&self.db, "list completions", |db| {
            Ok(Completion::find_all(db.connection())?)
        })
    }

    /// Flip today's record: remove it when present, otherwise mark today
    /// completed. Returns the new record, or `None` when one was removed.
    pub fn toggle_completion(&self, habit_id: &str) -> Result<Option<Completion>, AppError> {
        let today = self.engine().today_string();
        with_connection(&self.db, "toggle completion", |db| {
            let conn = db.connection();
            require_habit(conn, habit_id)?;

            if Completion::delete(conn, habit_id, &today)? {
                return Ok(None);
            }
            let completion = Completion::new(habit_id, &today, CompletionStatus::Completed);
            completion.upsert(conn)?;
            Ok(Some(completion))
        })
    }

    pub fn set_completion_status(
        &self,
        habit_id: &str,
        date: &str,
        status: CompletionStatus,
    ) -> Result<Completion, AppError> {
        validate_date(date)?;
        with_connection(&self.db, "set completion status", |db| {
            let completion = Completion::new(habit_id, date, status);
            completion.upsert(db.connection()).map_err(habit_fk)?;
            Ok(completion)
        })
    }

    /// Remove the record for one day. Returns whether one existed.
    pub fn clear_completion(&self, habit_id: &str, date: &str) -> Result<bool, AppError> {
        validate_date(date)?;
        with_connection(&self.db, "clear completion", |db| {
            Ok(Completion::delete(db.connection(), habit_id, date)?)
        })
    }

    // ── Urges ─────────────────────────────────────────────────────────

    /// Log a new urge attempt for today. A habit without coping steps has
    /// nothing to check off, so the attempt counts as resisted at once.
    pub fn start_urge(&self, habit_id: &str) -> Result<UrgeLog, AppError> {
        let today = self.engine().today_string();
        with_connection(&self.db, "start urge", |db| {
            let tx = db.connection().unchecked_transaction()?;
            let habit = require_habit(&tx, habit_id)?;
            if !habit.is_quit() {
                return Err(AppError::InvalidInput {
                    field: "habit_id",
                    reason: "urges are only tracked for quit habits".into(),
                });
            }

            let mut log = UrgeLog::create(&tx, habit_id, &today)?;
            if CopingStep::find_for_habit(&tx, habit_id)?.is_empty() {
                log.all_completed = true;
                log.update_steps(&tx)?;
            }
            tx.commit()?;
            Ok(log)
        })
    }

    /// Check off one coping step. The log becomes complete once every
    /// configured step has been checked.
    pub fn complete_urge_step(&self, log_id: &str, step_id: &str) -> Result<UrgeLog, AppError> {
        with_connection(&self.db, "complete urge step", |db| {
            let conn = db.connection();
            let mut log =
                UrgeLog::find_by_id(conn, log_id)?.ok_or(AppError::NotFound { entity: "Urge log" })?;
            let steps = CopingStep::find_for_habit(conn, &log.habit_id)?;
            if !steps.iter().any(|s| s.id == step_id) {
                return Err(AppError::NotFound { entity: "Coping step" });
            }

            let all_done = steps
                .iter()
                .all(|s| s.id == step_id || log.completed_steps.contains(&s.id));
            log.check_step(step_id, all_done);
            log.update_steps(conn)?;
            Ok(log)
        })
    }

    pub fn today_urge_logs(&self) -> Result<Vec<UrgeLog>, AppError> {
        let today = self.engine().today_string();
        with_connection(&self.db, "load urge logs", |db| {
            Ok(UrgeLog::find_for_date(db.connection(), &today)?)
        })
    }

    // ── Rockets ───────────────────────────────────────────────────────

    pub fn rocket_balance(&self, habit_id: &str) -> Result<RocketBalance, AppError> {
        with_connection(&self.db, "load rocket balance", |db| {
            let conn = db.connection();
            require_habit(conn, habit_id)?;
            Ok(RocketBalance::find_for_habit(conn, habit_id)?)
        })
    }

    pub fn set_rocket_balance(&self, habit_id: &str, balance: RocketBalance) -> Result<(), AppError> {
        with_connection(&self.db, "set rocket balance", |db| {
            balance.set(db.connection(), habit_id).map_err(habit_fk)
        })
    }

    /// Rescue a failed day: spend one rocket and mark the day `rocket_used`.
    pub fn use_rocket(&self, habit_id: &str, date: &str) -> Result<Completion, AppError> {
        validate_date(date)?;
        let engine = self.engine();
        let unavailable = |reason: &str| AppError::RocketUnavailable {
            reason: reason.to_string(),
        };

        with_connection(&self.db, "use rocket", |db| {
            let tx = db.connection().unchecked_transaction()?;
            require_habit(&tx, habit_id)?;

            let current = Completion::find_one(&tx, habit_id, date)?;
            if current.map(|c| c.status) != Some(CompletionStatus::Failed) {
                return Err(unavailable("day is not marked failed"));
            }
            if !engine.is_rocket_eligible(date) {
                return Err(unavailable("day is too recent"));
            }
            if !RocketBalance::consume(&tx, habit_id)? {
                return Err(unavailable("no rockets left"));
            }

            let completion = Completion::new(habit_id, date, CompletionStatus::RocketUsed);
            completion.upsert(&tx)?;
            tx.commit()?;
            info!("Rocket used for habit {habit_id} on {date}");
            Ok(completion)
        })
    }

    // ── Stats ─────────────────────────────────────────────────────────

    pub fn habits_with_stats(&self) -> Result<Vec<HabitWithStats>, AppError> {
        let engine = self.engine();
        let today = engine.today_string();
        with_connection(&self.db, "compute habit stats", |db| {
            let conn = db.connection();
            let habits = Habit::find_all(conn)?;
            let completions = Completion::find_all(conn)?;
            let urge_logs = UrgeLog::find_for_date(conn, &today)?;
            let coping_steps = CopingStep::find_all_grouped(conn)?;
            let rockets = RocketBalance::find_all(conn)?;

            let sources = StatsSources {
                urge_logs: Some(&urge_logs),
                coping_steps: Some(&coping_steps),
                rockets: Some(&rockets),
            };
            Ok(engine.habits_with_stats(&habits, &completions, &sources))
        })
    }

    /// Habits scheduled for today, with stats.
    pub fn today_habits(&self) -> Result<Vec<HabitWithStats>, AppError> {
        let engine = self.engine();
        Ok(self
            .habits_with_stats()?
            .into_iter()
            .filter(|s| engine.should_show_today(&s.habit))
            .collect())
    }

    pub fn overview(&self) -> Result<OverviewStats, AppError> {
        Ok(overview(&self.habits_with_stats()?))
    }

    // ── Settings ──────────────────────────────────────────────────────

    pub fn settings(&self) -> Result<AppSettings, AppError> {
        with_connection(&self.db, "load settings", |db| Ok(AppSettings::load(db.connection())?))
    }

    pub fn update_settings(&self, update: SettingsUpdate) -> Result<AppSettings, AppError> {
        with_connection(&self.db, "update settings", |db| {
            Ok(AppSettings::update(db.connection(), update)?)
        })
    }

    // ── Data ──────────────────────────────────────────────────────────

    pub fn export_snapshot(&self) -> Result<Snapshot, AppError> {
        with_connection(&self.db, "export snapshot", |db| Snapshot::capture(db.connection()))
    }

    /// Import a snapshot atomically: on any failure nothing is written.
    pub fn import_snapshot(&self, snapshot: &Snapshot) -> Result<ImportSummary, AppError> {
        with_connection(&self.db, "import snapshot", |db| {
            let tx = db.connection().unchecked_transaction()?;
            let summary = snapshot.restore(&tx)?;
            tx.commit()?;
            Ok(summary)
        })
    }

    pub fn export_to_file(&self, path: &Path) -> Result<Snapshot, AppError> {
        let snapshot = self.export_snapshot()?;
        snapshot.write_to(path)?;
        info!("Exported snapshot to {}", path.display());
        Ok(snapshot)
    }

    pub fn import_from_file(&self, path: &Path) -> Result<ImportSummary, AppError> {
        let snapshot = Snapshot::read_from(path)?;
        self.import_snapshot(&snapshot)
    }

    /// Remove every habit together with all dependent records. Settings stay.
    pub fn reset(&self) -> Result<(), AppError> {
        with_connection(&self.db, "reset data", |db| {
            let tx = db.connection().unchecked_transaction()?;
            Completion::delete_all(&tx)?;
            let removed = Habit::delete_all(&tx)?;
            tx.commit()?;
            info!("Reset: removed {removed} habits");
            Ok(())
        })
    }
}
