// src/db/helpers.rs

use crate::db::Database;
use crate::error::AppError;
use log::{error, warn};
use std::sync::{Arc, Mutex, MutexGuard};

/// Lock the shared database, recovering from poisoning if necessary.
pub fn lock_db<'a>(db: &'a Arc<Mutex<Database>>, operation: &str) -> MutexGuard<'a, Database> {
    match db.lock() {
        Ok(guard) => guard,
        Err(poisoned) => {
            warn!("Database mutex was poisoned during {operation}, recovering");
            poisoned.into_inner()
        }
    }
}

/// Execute a database operation with lock handling and error logging.
///
/// # Example
/// ```ignore
/// with_connection(&db, "load habits", |db| Ok(Habit::find_all(db.connection())?))
/// ```
pub fn with_connection<F, T>(db: &Arc<Mutex<Database>>, operation: &str, f: F) -> Result<T, AppError>
where
    F: FnOnce(&Database) -> Result<T, AppError>,
{
    let guard = lock_db(db, operation);

    f(&guard).map_err(|e| {
        error!("Failed to {operation}: {e}");
        e
    })
}
