use thiserror::Error;

/// Application error type
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    #[error("Invalid {field}: {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("Cannot use rocket: {reason}")]
    RocketUnavailable { reason: String },

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Invalid snapshot: {0}")]
    Snapshot(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Lock poisoned")]
    LockPoisoned,

    #[error("{0}")]
    Internal(String),
}

// For host responses - converts AppError to String
impl From<AppError> for String {
    fn from(e: AppError) -> Self {
        e.to_string()
    }
}

/// Check if a rusqlite error is a FOREIGN KEY constraint violation
pub fn is_fk_violation(e: &rusqlite::Error) -> bool {
    e.to_string().contains("FOREIGN KEY constraint failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = AppError::NotFound { entity: "Habit" };
        assert_eq!(err.to_string(), "Habit not found");

        let err = AppError::InvalidInput {
            field: "name",
            reason: "cannot be empty".into(),
        };
        assert_eq!(String::from(err), "Invalid name: cannot be empty");
    }

    #[test]
    fn test_snapshot_error_from_serde() {
        let parse_err = serde_json::from_str::<serde_json::Value>("{not json").unwrap_err();
        let err = AppError::from(parse_err);
        assert!(err.to_string().starts_with("Invalid snapshot:"));
    }
}
