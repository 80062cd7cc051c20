//! Quit-habit urge tallies.

use chrono::NaiveDate;

use crate::dates::format_date;
use crate::models::UrgeLog;

/// Fully completed urge attempts for `habit_id` today. Uncapped, so it may
/// exceed the daily target.
pub fn today_urge_count(habit_id: &str, urge_logs: &[UrgeLog], today: NaiveDate) -> u32 {
    let today = format_date(today);
    let count = urge_logs
        .iter()
        .filter(|log| log.habit_id == habit_id && log.date == today && log.all_completed)
        .count();
    u32::try_from(count).unwrap_or(u32::MAX)
}

pub fn is_quit_habit_completed_today(
    habit_id: &str,
    urge_logs: &[UrgeLog],
    daily_target: u32,
    today: NaiveDate,
) -> bool {
    today_urge_count(habit_id, urge_logs, today) >= daily_target.max(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::urge_log;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 16).unwrap()
    }

    #[test]
    fn test_counts_only_todays_completed_attempts() {
        let logs = vec![
            urge_log("1", "q", "2026-10-16", true),
            urge_log("2", "q", "2026-10-16", false),
            urge_log("3", "q", "2026-10-15", true),
            urge_log("4", "other", "2026-10-16", true),
            urge_log("5", "q", "2026-10-16", true),
        ];
        assert_eq!(today_urge_count("q", &logs, today()), 2);
    }

    #[test]
    fn test_completion_threshold() {
        let logs: Vec<UrgeLog> = (0..3)
            .map(|i| urge_log(&i.to_string(), "q", "2026-10-16", true))
            .collect();

        assert!(is_quit_habit_completed_today("q", &logs, 3, today()));
        assert!(!is_quit_habit_completed_today("q", &logs[..2], 3, today()));
        assert!(is_quit_habit_completed_today("q", &logs, 2, today()));
    }

    #[test]
    fn test_no_logs_never_complete() {
        assert!(!is_quit_habit_completed_today("q", &[], 1, today()));
        assert!(!is_quit_habit_completed_today("q", &[], 0, today()));
    }
}
