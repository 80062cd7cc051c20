//! Day-status sequences and the weekly calendar grid.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::dates::{days_before, format_date, monday_based_weekday, parse_date, timestamp_date};
use crate::models::{Completion, CompletionStatus, Habit};

/// What happened to a habit on one day, as shown in history views.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DayState {
    Completed,
    Failed,
    RocketUsed,
    None,
}

impl From<CompletionStatus> for DayState {
    fn from(status: CompletionStatus) -> Self {
        match status {
            CompletionStatus::Completed => Self::Completed,
            CompletionStatus::Failed => Self::Failed,
            CompletionStatus::RocketUsed => Self::RocketUsed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayStatus {
    pub date: String,
    pub status: DayState,
}

/// One calendar row, Monday first. Empty cells pad before the first and after
/// the last day.
pub type GridRow = [Option<DayStatus>; 7];

fn statuses_by_date<'a>(
    habit_id: &str,
    completions: &'a [Completion],
) -> HashMap<&'a str, CompletionStatus> {
    completions
        .iter()
        .filter(|c| c.habit_id == habit_id)
        .map(|c| (c.date.as_str(), c.status))
        .collect()
}

fn day_status(date: NaiveDate, statuses: &HashMap<&str, CompletionStatus>) -> DayStatus {
    let date = format_date(date);
    let status = statuses
        .get(date.as_str())
        .map_or(DayState::None, |s| DayState::from(*s));
    DayStatus { date, status }
}

/// The last `days` calendar days, oldest first, today included.
pub fn recent_days(
    habit_id: &str,
    completions: &[Completion],
    days: u32,
    today: NaiveDate,
) -> Vec<DayStatus> {
    let statuses = statuses_by_date(habit_id, completions);
    (0..days)
        .rev()
        .map(|offset| day_status(days_before(today, offset), &statuses))
        .collect()
}

/// Every day from the start of the habit's history through today, oldest
/// first. History starts at the earlier of the creation day and the first
/// recorded day; a habit created "in the future" still yields today.
pub fn all_days(habit: &Habit, completions: &[Completion], today: NaiveDate) -> Vec<DayStatus> {
    let statuses = statuses_by_date(&habit.id, completions);

    let first_record = statuses.keys().filter_map(|d| parse_date(d)).min();
    let start = [timestamp_date(&habit.created_at), first_record]
        .into_iter()
        .flatten()
        .min()
        .map_or(today, |start| start.min(today));

    start
        .iter_days()
        .take_while(|day| *day <= today)
        .map(|day| day_status(day, &statuses))
        .collect()
}

/// Lay a chronological day sequence into 7-column rows. The first day lands
/// in the column of its weekday (0=Monday..6=Sunday).
pub fn build_grid_rows(days: &[DayStatus]) -> Vec<GridRow> {
    let Some(first) = days.first() else {
        return Vec::new();
    };

    let lead = parse_date(&first.date)
        .map(monday_based_weekday)
        .and_then(|col| usize::try_from(col).ok())
        .unwrap_or(0);

    let cells: Vec<Option<DayStatus>> = std::iter::repeat_n(None, lead)
        .chain(days.iter().cloned().map(Some))
        .collect();

    cells
        .chunks(7)
        .map(|chunk| {
            let mut row: GridRow = std::array::from_fn(|_| None);
            for (slot, cell) in row.iter_mut().zip(chunk) {
                slot.clone_from(cell);
            }
            row
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{completion, habit_fixture};

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    fn day(date: &str, status: DayState) -> DayStatus {
        DayStatus {
            date: date.to_string(),
            status,
        }
    }

    #[test]
    fn test_recent_days_window() {
        let completions = vec![
            completion("h", "2026-10-16", CompletionStatus::Completed),
            completion("h", "2026-10-14", CompletionStatus::Failed),
            completion("h", "2026-10-12", CompletionStatus::RocketUsed),
            completion("other", "2026-10-15", CompletionStatus::Completed),
        ];

        let days = recent_days("h", &completions, 5, today());
        assert_eq!(
            days,
            vec![
                day("2026-10-12", DayState::RocketUsed),
                day("2026-10-13", DayState::None),
                day("2026-10-14", DayState::Failed),
                day("2026-10-15", DayState::None),
                day("2026-10-16", DayState::Completed),
            ]
        );
    }

    #[test]
    fn test_recent_days_zero() {
        assert!(recent_days("h", &[], 0, today()).is_empty());
    }

    #[test]
    fn test_all_days_from_creation() {
        let mut habit = habit_fixture("h", "Run");
        habit.created_at = "2026-10-13T09:00:00.000Z".to_string();

        let days = all_days(&habit, &[], today());
        assert_eq!(days.len(), 4);
        assert_eq!(days[0].date, "2026-10-13");
        assert_eq!(days[3].date, "2026-10-16");
        assert!(days.iter().all(|d| d.status == DayState::None));
    }

    #[test]
    fn test_all_days_starts_at_earlier_record() {
        let mut habit = habit_fixture("h", "Run");
        habit.created_at = "2026-10-15T09:00:00.000Z".to_string();
        let completions = vec![completion("h", "2026-10-10", CompletionStatus::Failed)];

        let days = all_days(&habit, &completions, today());
        assert_eq!(days.len(), 7);
        assert_eq!(days[0], day("2026-10-10", DayState::Failed));
    }

    fn utc_stamp_of_local(date: &str, hour: u32, minute: u32) -> String {
        parse_date(date)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
            .and_local_timezone(chrono::Local)
            .single()
            .unwrap()
            .with_timezone(&chrono::Utc)
            .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
    }

    #[test]
    fn test_all_days_starts_on_local_creation_day() {
        // created just after local midnight today; the UTC day may be yesterday
        let mut habit = habit_fixture("h", "Run");
        habit.created_at = utc_stamp_of_local("2026-10-16", 0, 30);

        let days = all_days(&habit, &[], today());
        assert_eq!(days, vec![day("2026-10-16", DayState::None)]);

        // created just before local midnight yesterday; the UTC day may be today
        habit.created_at = utc_stamp_of_local("2026-10-15", 23, 30);
        let days = all_days(&habit, &[], today());
        assert_eq!(
            days,
            vec![
                day("2026-10-15", DayState::None),
                day("2026-10-16", DayState::None),
            ]
        );
    }

    #[test]
    fn test_all_days_future_creation_yields_today() {
        let mut habit = habit_fixture("h", "Run");
        habit.created_at = "2027-01-01T00:00:00.000Z".to_string();

        let days = all_days(&habit, &[], today());
        assert_eq!(days, vec![day("2026-10-16", DayState::None)]);
    }

    #[test]
    fn test_grid_empty() {
        assert!(build_grid_rows(&[]).is_empty());
    }

    #[test]
    fn test_grid_pads_first_and_last_row() {
        // 2026-10-14 is a Wednesday (column 2)
        let days: Vec<DayStatus> = ["2026-10-14", "2026-10-15", "2026-10-16", "2026-10-17",
            "2026-10-18", "2026-10-19", "2026-10-20"]
            .iter()
            .map(|d| day(d, DayState::None))
            .collect();

        let rows = build_grid_rows(&days);
        assert_eq!(rows.len(), 2);

        assert!(rows[0][0].is_none());
        assert!(rows[0][1].is_none());
        assert_eq!(rows[0][2].as_ref().unwrap().date, "2026-10-14");
        assert_eq!(rows[0][6].as_ref().unwrap().date, "2026-10-18");

        assert_eq!(rows[1][0].as_ref().unwrap().date, "2026-10-19");
        assert_eq!(rows[1][1].as_ref().unwrap().date, "2026-10-20");
        assert!(rows[1][2..].iter().all(Option::is_none));
    }

    #[test]
    fn test_grid_monday_start_single_row() {
        let rows = build_grid_rows(&[day("2026-10-12", DayState::Completed)]);
        assert_eq!(rows.len(), 1);
        assert!(rows[0][0].is_some());
        assert!(rows[0][1..].iter().all(Option::is_none));
    }

    #[test]
    fn test_grid_sunday_start() {
        let rows = build_grid_rows(&[
            day("2026-10-18", DayState::Completed),
            day("2026-10-19", DayState::Failed),
        ]);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][6].as_ref().unwrap().date, "2026-10-18");
        assert_eq!(rows[1][0].as_ref().unwrap().status, DayState::Failed);
    }
}
