//! Rocket rescue eligibility. The balance itself lives in the rocket ledger.

use chrono::NaiveDate;

use super::calendar::{DayState, DayStatus};
use crate::constants::ROCKET_MIN_AGE_DAYS;
use crate::dates::{days_between, parse_date};

/// A day can be rescued only once it is strictly more than
/// [`ROCKET_MIN_AGE_DAYS`] days old.
pub fn is_rocket_eligible(date: &str, today: NaiveDate) -> bool {
    parse_date(date).is_some_and(|day| days_between(day, today) > ROCKET_MIN_AGE_DAYS)
}

/// The oldest failed day that a rocket could rescue, if any rockets remain.
pub fn first_rocket_eligible_date(
    days: &[DayStatus],
    rockets: u32,
    today: NaiveDate,
) -> Option<&str> {
    if rockets == 0 {
        return None;
    }
    days.iter()
        .find(|day| day.status == DayState::Failed && is_rocket_eligible(&day.date, today))
        .map(|day| day.date.as_str())
}
