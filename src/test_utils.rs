//! Shared test utilities for Shukan.
//!
//! This module provides common setup functions and record fixtures used
//! across test modules.

#![cfg(test)]

use crate::db::{migrations, Database};
use crate::models::{Completion, CompletionStatus, Frequency, Habit, HabitType, UrgeLog};
use crate::service::HabitService;
use std::sync::{Arc, Mutex};
use tempfile::{tempdir, TempDir};

/// Create a temporary test database with migrations applied.
///
/// Returns a tuple of (Database, TempDir). The TempDir must be kept alive
/// for the duration of the test to prevent the database file from being deleted.
pub fn setup_test_db() -> (Database, TempDir) {
    let dir = tempdir().expect("Failed to create temp directory for test DB");
    let db_path = dir.path().join("test.db");
    let db = Database::open(&db_path).expect("Failed to open test database");
    migrations::run(db.connection()).expect("Failed to run migrations on test DB");
    (db, dir)
}

/// A service over a fresh temporary database.
pub fn setup_test_service() -> (HabitService, TempDir) {
    let (db, dir) = setup_test_db();
    (HabitService::new(Arc::new(Mutex::new(db))), dir)
}

/// A daily, positive, unarchived habit.
pub fn habit_fixture(id: &str, name: &str) -> Habit {
    Habit {
        id: id.to_string(),
        name: name.to_string(),
        description: None,
        life_significance: None,
        icon: "✅".to_string(),
        color: "blue".to_string(),
        frequency: Frequency::Daily,
        custom_days: None,
        habit_type: HabitType::Positive,
        daily_target: 1,
        created_at: "2026-01-01T00:00:00.000Z".to_string(),
        archived: false,
    }
}

pub fn completion(habit_id: &str, date: &str, status: CompletionStatus) -> Completion {
    Completion {
        habit_id: habit_id.to_string(),
        date: date.to_string(),
        status,
        completed_at: format!("{date}T12:00:00.000Z"),
    }
}

pub fn urge_log(id: &str, habit_id: &str, date: &str, all_completed: bool) -> UrgeLog {
    UrgeLog {
        id: id.to_string(),
        habit_id: habit_id.to_string(),
        date: date.to_string(),
        completed_steps: Vec::new(),
        all_completed,
        created_at: format!("{date}T12:00:00.000Z"),
    }
}
