use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".bookshelf-manager";
/// SQLite file name stored inside the application data directory.
const DB_FILE_NAME: &str = "library.sqlite";
/// Log file written next to the database.
const LOG_FILE_NAME: &str = "bookshelf.log";
/// Environment variable that overrides the database location.
pub const DB_PATH_ENV: &str = "BOOKSHELF_DB";

/// Paths resolved once at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub db_path: PathBuf,
    pub log_path: PathBuf,
}

impl Config {
    /// Resolve paths from the environment, falling back to the home directory.
    pub fn from_env() -> Result<Self> {
        let db_path = match env::var_os(DB_PATH_ENV) {
            Some(path) if !path.is_empty() => PathBuf::from(path),
            _ => default_db_path()?,
        };
        Ok(Self::with_db_path(db_path))
    }

    /// Build a config around an explicit database path.
    pub fn with_db_path(db_path: PathBuf) -> Self {
        let log_path = db_path
            .parent()
            .map(|dir| dir.join(LOG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(LOG_FILE_NAME));
        Self { db_path, log_path }
    }
}

fn default_db_path() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME).join(DB_FILE_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_file_sits_next_to_database() {
        let config = Config::with_db_path(PathBuf::from("/tmp/shelf/library.sqlite"));
        assert_eq!(config.log_path, PathBuf::from("/tmp/shelf/bookshelf.log"));
    }

    #[test]
    fn bare_file_name_keeps_log_in_working_directory() {
        let config = Config::with_db_path(PathBuf::from("library.sqlite"));
        assert_eq!(config.log_path, PathBuf::from("bookshelf.log"));
    }
}
