//! Habit statistics engine.
//!
//! Pure projections from habit, completion and urge-log records to the derived
//! views shown in the app: streaks, completion rate, day-status history,
//! urge tallies and rocket eligibility. Nothing here reads the store or the
//! clock except [`StatsEngine::for_today`], and no input is mutated.

pub mod calendar;
pub mod rockets;
pub mod streak;
pub mod urges;

pub use calendar::{build_grid_rows, DayState, DayStatus, GridRow};
pub use streak::Streak;

use chrono::{Datelike, NaiveDate, Weekday};
use serde::Serialize;
use std::collections::HashMap;

use crate::constants::{COMPLETION_RATE_WINDOW, RECENT_DAYS_WINDOW};
use crate::dates::{self, format_date, sunday_based_weekday};
use crate::models::{Completion, CopingStep, Frequency, Habit, HabitType, RocketBalance, UrgeLog};

/// A habit together with everything derived from its records.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HabitWithStats {
    #[serde(flatten)]
    pub habit: Habit,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub completed_today: bool,
    /// Share of the trailing 30 days completed, 0.0..=1.0
    pub completion_rate: f64,
    pub recent_days: Vec<DayStatus>,
    pub all_days: Vec<DayStatus>,
    pub rockets: u32,
    pub rocket_next_in: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coping_steps: Option<Vec<CopingStep>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub today_urge_count: Option<u32>,
}

/// Optional inputs to [`StatsEngine::habits_with_stats`]. A missing source
/// leaves the matching fields unset (or zero for rockets).
#[derive(Debug, Clone, Copy, Default)]
pub struct StatsSources<'a> {
    pub urge_logs: Option<&'a [UrgeLog]>,
    pub coping_steps: Option<&'a HashMap<String, Vec<CopingStep>>>,
    pub rockets: Option<&'a HashMap<String, RocketBalance>>,
}

/// Aggregate figures over the non-archived habits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OverviewStats {
    pub total_habits: u32,
    pub avg_current_streak: u32,
    pub longest_streak: u32,
    pub avg_completion_rate: f64,
}

/// Statistics evaluated against a fixed "today".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatsEngine {
    today: NaiveDate,
}

impl StatsEngine {
    pub fn new(today: NaiveDate) -> Self {
        Self { today }
    }

    /// An engine pinned to the local calendar day.
    pub fn for_today() -> Self {
        Self::new(dates::today())
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn today_string(&self) -> String {
        format_date(self.today)
    }

    /// Positive habits: a `completed` record exists for today.
    pub fn is_completed_today(&self, habit_id: &str, completions: &[Completion]) -> bool {
        let today = self.today_string();
        completions.iter().any(|c| {
            c.habit_id == habit_id && c.date == today && c.status.counts_toward_streak()
        })
    }

    pub fn calculate_streak(&self, habit_id: &str, completions: &[Completion]) -> Streak {
        streak::calculate_streak(habit_id, completions, self.today)
    }

    pub fn completion_rate(&self, habit_id: &str, completions: &[Completion], days: i32) -> f64 {
        streak::completion_rate(habit_id, completions, days, self.today)
    }

    /// Whether the habit belongs in today's list.
    pub fn should_show_today(&self, habit: &Habit) -> bool {
        if habit.archived {
            return false;
        }

        match habit.frequency {
            Frequency::Daily => true,
            Frequency::Weekly => self.today.weekday() == Weekday::Mon,
            Frequency::Custom => {
                let weekday = sunday_based_weekday(self.today);
                habit.custom_days.as_ref().is_some_and(|days| days.contains(&weekday))
            }
        }
    }

    pub fn is_quit_habit_completed_today(
        &self,
        habit_id: &str,
        urge_logs: &[UrgeLog],
        daily_target: u32,
    ) -> bool {
        urges::is_quit_habit_completed_today(habit_id, urge_logs, daily_target, self.today)
    }

    pub fn today_urge_count(&self, habit_id: &str, urge_logs: &[UrgeLog]) -> u32 {
        urges::today_urge_count(habit_id, urge_logs, self.today)
    }

    pub fn recent_days(&self, habit_id: &str, completions: &[Completion], days: u32) -> Vec<DayStatus> {
        calendar::recent_days(habit_id, completions, days, self.today)
    }

    pub fn all_days(&self, habit: &Habit, completions: &[Completion]) -> Vec<DayStatus> {
        calendar::all_days(habit, completions, self.today)
    }

    pub fn is_rocket_eligible(&self, date: &str) -> bool {
        rockets::is_rocket_eligible(date, self.today)
    }

    pub fn first_rocket_eligible_date<'a>(&self, days: &'a [DayStatus], rockets: u32) -> Option<&'a str> {
        rockets::first_rocket_eligible_date(days, rockets, self.today)
    }

    /// Derive the full stats view for one habit.
    pub fn habit_stats(
        &self,
        habit: &Habit,
        completions: &[Completion],
        sources: &StatsSources<'_>,
    ) -> HabitWithStats {
        let streak = self.calculate_streak(&habit.id, completions);

        let completed_today = match habit.habit_type {
            HabitType::Positive => self.is_completed_today(&habit.id, completions),
            HabitType::Quit => sources.urge_logs.is_some_and(|logs| {
                self.is_quit_habit_completed_today(&habit.id, logs, habit.daily_target)
            }),
        };

        let balance = sources
            .rockets
            .and_then(|ledger| ledger.get(&habit.id))
            .copied()
            .unwrap_or_default();

        let (coping_steps, today_urge_count) = if habit.is_quit() {
            (
                sources
                    .coping_steps
                    .map(|steps| steps.get(&habit.id).cloned().unwrap_or_default()),
                sources
                    .urge_logs
                    .map(|logs| self.today_urge_count(&habit.id, logs)),
            )
        } else {
            (None, None)
        };

        HabitWithStats {
            habit: habit.clone(),
            current_streak: streak.current,
            longest_streak: streak.longest,
            completed_today,
            completion_rate: self.completion_rate(&habit.id, completions, COMPLETION_RATE_WINDOW),
            recent_days: self.recent_days(&habit.id, completions, RECENT_DAYS_WINDOW),
            all_days: self.all_days(habit, completions),
            rockets: balance.rockets,
            rocket_next_in: balance.next_in,
            coping_steps,
            today_urge_count,
        }
    }

    /// Derive stats for every habit, in input order.
    pub fn habits_with_stats(
        &self,
        habits: &[Habit],
        completions: &[Completion],
        sources: &StatsSources<'_>,
    ) -> Vec<HabitWithStats> {
        habits
            .iter()
            .map(|habit| self.habit_stats(habit, completions, sources))
            .collect()
    }
}

/// Totals for the stats page. Archived habits are left out.
pub fn overview(stats: &[HabitWithStats]) -> OverviewStats {
    let active: Vec<&HabitWithStats> = stats.iter().filter(|s| !s.habit.archived).collect();
    let total = u32::try_from(active.len()).unwrap_or(u32::MAX);
    if total == 0 {
        return OverviewStats::default();
    }

    let streak_sum: u32 = active.iter().map(|s| s.current_streak).sum();
    let rate_sum: f64 = active.iter().map(|s| s.completion_rate).sum();

    OverviewStats {
        total_habits: total,
        // rounded mean, halves round up
        avg_current_streak: (streak_sum + total / 2) / total,
        longest_streak: active.iter().map(|s| s.longest_streak).max().unwrap_or(0),
        avg_completion_rate: rate_sum / f64::from(total),
    }
}
