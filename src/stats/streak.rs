//! Streak and completion-rate arithmetic.

use chrono::NaiveDate;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};

use crate::dates::{days_before, days_between, format_date, parse_date};
use crate::models::Completion;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Streak {
    pub current: u32,
    pub longest: u32,
}

/// Distinct dates on which `habit_id` has a status that counts toward streaks.
fn counted_dates<'a>(habit_id: &str, completions: &'a [Completion]) -> BTreeSet<&'a str> {
    completions
        .iter()
        .filter(|c| c.habit_id == habit_id && c.status.counts_toward_streak())
        .map(|c| c.date.as_str())
        .collect()
}

pub fn calculate_streak(habit_id: &str, completions: &[Completion], today: NaiveDate) -> Streak {
    let dates = counted_dates(habit_id, completions);
    if dates.is_empty() {
        return Streak::default();
    }

    let current = current_streak(&dates, today);
    let longest = longest_run(&dates).max(current);
    Streak { current, longest }
}

/// Consecutive days ending today, or ending yesterday when today is not yet
/// marked.
fn current_streak(dates: &BTreeSet<&str>, today: NaiveDate) -> u32 {
    let is_done = |day: NaiveDate| dates.contains(format_date(day).as_str());

    let mut cursor = if is_done(today) {
        today
    } else {
        match today.pred_opt() {
            Some(yesterday) if is_done(yesterday) => yesterday,
            Some(_) | None => return 0,
        }
    };

    let mut count = 0;
    while is_done(cursor) {
        count += 1;
        match cursor.pred_opt() {
            Some(previous) => cursor = previous,
            None => break,
        }
    }
    count
}

/// Longest run of consecutive days anywhere in the history.
fn longest_run(dates: &BTreeSet<&str>) -> u32 {
    let mut longest = 0;
    let mut run = 0;
    let mut previous: Option<NaiveDate> = None;

    // BTreeSet order on YYYY-MM-DD strings is chronological order
    for day in dates.iter().filter_map(|d| parse_date(d)) {
        run = match previous {
            Some(prev) if days_between(prev, day) == 1 => run + 1,
            Some(_) | None => 1,
        };
        longest = longest.max(run);
        previous = Some(day);
    }
    longest
}

/// Fraction of the trailing `days`-day window (today inclusive) with a
/// counted completion.
pub fn completion_rate(
    habit_id: &str,
    completions: &[Completion],
    days: i32,
    today: NaiveDate,
) -> f64 {
    if days <= 0 {
        return 0.0;
    }

    let start = format_date(days_before(today, days.unsigned_abs() - 1));
    let end = format_date(today);

    let completed: HashSet<&str> = completions
        .iter()
        .filter(|c| c.habit_id == habit_id && c.status.counts_toward_streak())
        .map(|c| c.date.as_str())
        .filter(|date| *date >= start.as_str() && *date <= end.as_str())
        .collect();

    let count = u32::try_from(completed.len()).unwrap_or(u32::MAX);
    f64::from(count) / f64::from(days)
}
