// src/config.rs

use directories::ProjectDirs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "SHUKAN_DATA_DIR";

/// Database file name inside the data directory.
pub const DB_FILE_NAME: &str = "shukan.db";

/// Error type for startup failures
#[derive(Debug, Error)]
pub enum InitError {
    #[error("Could not determine project directories")]
    NoProjectDirs,
    #[error("Could not create data directory: {0}")]
    DataDirCreation(std::io::Error),
    #[error("Failed to open database: {0}")]
    DatabaseOpen(rusqlite::Error),
    #[error("Failed to run database migrations: {0}")]
    Migration(rusqlite::Error),
}

/// Where the host keeps its data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostConfig {
    pub data_dir: PathBuf,
}

impl HostConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    /// Resolve the data directory: `SHUKAN_DATA_DIR` when set and non-empty,
    /// otherwise the platform data directory.
    pub fn from_env() -> Result<Self, InitError> {
        Self::resolve(std::env::var_os(DATA_DIR_ENV).map(PathBuf::from))
    }

    fn resolve(override_dir: Option<PathBuf>) -> Result<Self, InitError> {
        if let Some(dir) = override_dir.filter(|d| !d.as_os_str().is_empty()) {
            return Ok(Self::with_data_dir(dir));
        }
        let proj_dirs =
            ProjectDirs::from("com", "shukan", "Shukan").ok_or(InitError::NoProjectDirs)?;
        Ok(Self::with_data_dir(proj_dirs.data_dir()))
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    /// Create the data directory if needed.
    pub fn ensure_data_dir(&self) -> Result<&Path, InitError> {
        std::fs::create_dir_all(&self.data_dir).map_err(InitError::DataDirCreation)?;
        Ok(&self.data_dir)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_override_wins() {
        let config = HostConfig::resolve(Some(PathBuf::from("/tmp/shukan-test"))).unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/shukan-test"));
        assert_eq!(config.db_path(), PathBuf::from("/tmp/shukan-test/shukan.db"));
    }

    #[test]
    fn test_empty_override_is_ignored() {
        // falls back to the platform directory, which may be unavailable in
        // a bare environment; either way the empty path is never used
        if let Ok(config) = HostConfig::resolve(Some(PathBuf::new())) {
            assert!(!config.data_dir.as_os_str().is_empty());
        }
    }

    #[test]
    fn test_ensure_data_dir_creates_nested_path() {
        let dir = tempdir().unwrap();
        let config = HostConfig::with_data_dir(dir.path().join("a").join("b"));
        let created = config.ensure_data_dir().unwrap();
        assert!(created.is_dir());
    }
}
