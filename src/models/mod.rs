pub mod habit;
pub mod completion;
pub mod coping_step;
pub mod urge_log;
pub mod rocket;
pub mod settings;

pub use habit::{Frequency, Habit, HabitType};
pub use completion::{Completion, CompletionStatus};
pub use coping_step::CopingStep;
pub use urge_log::UrgeLog;
pub use rocket::RocketBalance;
pub use settings::{AppSettings, Locale, SettingsUpdate, Theme};

/// Build the conversion error reported when a TEXT column holds a value
/// outside the expected set.
pub(crate) fn invalid_text(column: usize, value: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unexpected value '{value}'").into(),
    )
}
