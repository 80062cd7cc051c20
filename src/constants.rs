// src/constants.rs

/// Upper bound for a quit habit's daily urge target
pub const MAX_DAILY_TARGET: u32 = 20;

/// Maximum habit name length
pub const MAX_HABIT_NAME_LEN: usize = 100;

/// Maximum length of description and life-significance notes
pub const MAX_NOTE_LEN: usize = 1000;

/// Maximum coping step title length
pub const MAX_COPING_STEP_LEN: usize = 200;

/// Days shown in the compact status strip on a habit card
pub const RECENT_DAYS_WINDOW: u32 = 5;

/// Trailing window (in days) for the completion rate
pub const COMPLETION_RATE_WINDOW: i32 = 30;

/// A failed day must be strictly older than this to be rescued by a rocket
pub const ROCKET_MIN_AGE_DAYS: i64 = 5;

/// Maximum framed message size accepted by the host (1 MiB)
pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;
