pub mod config;
pub mod constants;
pub mod dates;
pub mod db;
pub mod error;
pub mod host;
pub mod models;
pub mod service;
pub mod snapshot;
pub mod stats;
#[cfg(test)]
mod test_utils;
pub mod validation;

use crate::config::{HostConfig, InitError};
use crate::db::{migrations, Database};
use crate::service::HabitService;
use log::info;
use std::sync::{Arc, Mutex};

/// Open (creating if needed) the database described by `config`, bring its
/// schema up to date and wrap it in a service.
pub fn open_service(config: &HostConfig) -> Result<HabitService, InitError> {
    config.ensure_data_dir()?;
    let db_path = config.db_path();

    let db = Database::open(&db_path).map_err(InitError::DatabaseOpen)?;
    migrations::run(db.connection()).map_err(InitError::Migration)?;
    info!("Opened database at {}", db_path.display());

    Ok(HabitService::new(Arc::new(Mutex::new(db))))
}
