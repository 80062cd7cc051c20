use chrono::NaiveDate;

use crate::constants::{
    MAX_COPING_STEP_LEN, MAX_DAILY_TARGET, MAX_HABIT_NAME_LEN, MAX_NOTE_LEN,
};
use crate::dates::parse_date;
use crate::error::AppError;
use crate::models::Frequency;

fn too_long(field: &'static str, max: usize) -> AppError {
    AppError::InvalidInput {
        field,
        reason: format!("cannot exceed {max} characters"),
    }
}

/// Validate habit name. Returns the trimmed name.
pub fn validate_habit_name(name: &str) -> Result<&str, AppError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(AppError::InvalidInput {
            field: "name",
            reason: "cannot be empty".into(),
        });
    }
    if name.chars().count() > MAX_HABIT_NAME_LEN {
        return Err(too_long("name", MAX_HABIT_NAME_LEN));
    }
    Ok(name)
}

/// Validate an optional free-text note. Blank notes become `None`.
pub fn validate_note(field: &'static str, note: Option<&str>) -> Result<Option<String>, AppError> {
    let Some(note) = note.map(str::trim).filter(|n| !n.is_empty()) else {
        return Ok(None);
    };
    if note.chars().count() > MAX_NOTE_LEN {
        return Err(too_long(field, MAX_NOTE_LEN));
    }
    Ok(Some(note.to_string()))
}

/// Validate a display label such as an icon or color name.
pub fn validate_label<'a>(field: &'static str, value: &'a str) -> Result<&'a str, AppError> {
    let value = value.trim();
    if value.is_empty() {
        return Err(AppError::InvalidInput {
            field,
            reason: "cannot be empty".into(),
        });
    }
    Ok(value)
}

/// Validate the daily urge target of a quit habit.
pub fn validate_daily_target(target: u32) -> Result<(), AppError> {
    if !(1..=MAX_DAILY_TARGET).contains(&target) {
        return Err(AppError::InvalidInput {
            field: "daily_target",
            reason: format!("must be 1-{MAX_DAILY_TARGET}"),
        });
    }
    Ok(())
}

/// Validate custom weekdays (0=Sunday..6=Saturday).
///
/// Custom frequency needs at least one day; the result is sorted and
/// deduplicated. Other frequencies carry no day list.
pub fn validate_custom_days(
    frequency: Frequency,
    days: Option<&[u32]>,
) -> Result<Option<Vec<u32>>, AppError> {
    match frequency {
        Frequency::Daily | Frequency::Weekly => Ok(None),
        Frequency::Custom => {
            let days = days.unwrap_or_default();
            if days.is_empty() {
                return Err(AppError::InvalidInput {
                    field: "custom_days",
                    reason: "at least one day required".into(),
                });
            }
            if let Some(day) = days.iter().find(|d| **d > 6) {
                return Err(AppError::InvalidInput {
                    field: "custom_days",
                    reason: format!("day must be 0-6, got {day}"),
                });
            }
            let mut days = days.to_vec();
            days.sort_unstable();
            days.dedup();
            Ok(Some(days))
        }
    }
}

/// Validate a `YYYY-MM-DD` calendar date.
pub fn validate_date(date: &str) -> Result<NaiveDate, AppError> {
    parse_date(date).ok_or_else(|| AppError::InvalidInput {
        field: "date",
        reason: format!("'{date}' is not a YYYY-MM-DD date"),
    })
}

/// Validate coping step titles. Blank entries are dropped, order is kept.
pub fn validate_coping_steps(titles: &[String]) -> Result<Vec<String>, AppError> {
    titles
        .iter()
        .map(|t| t.as_str().trim())
        .filter(|t| !t.is_empty())
        .map(|t| {
            if t.chars().count() > MAX_COPING_STEP_LEN {
                Err(too_long("coping_steps", MAX_COPING_STEP_LEN))
            } else {
                Ok(t.to_string())
            }
        })
        .collect()
}
