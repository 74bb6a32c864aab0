//! SQLite-based persistence layer
//!
//! This module provides:
//! - Database initialization and migrations
//! - Persistence for configured servers and runtime settings
//! - Connection pooling

mod migrations;
mod queries;

pub use migrations::run_migrations;
pub use queries::*;

use crate::error::{Error, Result, StorageError};
use r2d2::{Pool, PooledConnection};
use r2d2_sqlite::SqliteConnectionManager;
use std::path::{Path, PathBuf};
use tracing::info;

const DB_FILE: &str = "tabhost.db";

/// Pooled SQLite database holding servers and settings
pub struct Storage {
    pool: Pool<SqliteConnectionManager>,
    db_path: PathBuf,
}

impl Storage {
    /// Open (or create) `tabhost.db` inside a data directory
    pub fn new_with_path(data_dir: impl AsRef<Path>) -> Result<Self> {
        let data_dir = data_dir.as_ref();
        std::fs::create_dir_all(data_dir).map_err(|e| {
            Error::Storage(StorageError::Database(format!(
                "Failed to create data directory {:?}: {}",
                data_dir, e
            )))
        })?;

        let db_path = data_dir.join(DB_FILE);
        info!("Database path: {:?}", db_path);
        Self::open(SqliteConnectionManager::file(&db_path), 4, db_path)
    }

    /// Storage that lives as long as its single pooled connection
    pub fn in_memory() -> Result<Self> {
        Self::open(SqliteConnectionManager::memory(), 1, PathBuf::from(":memory:"))
    }

    fn open(manager: SqliteConnectionManager, max_size: u32, db_path: PathBuf) -> Result<Self> {
        let pool = Pool::builder()
            .max_size(max_size)
            .build(manager)
            .map_err(|e| Error::Storage(StorageError::Pool(e.to_string())))?;

        run_migrations(&*pool.get()?)?;
        Ok(Self { pool, db_path })
    }

    pub fn connection(&self) -> Result<PooledConnection<SqliteConnectionManager>> {
        self.pool
            .get()
            .map_err(|e| Error::Storage(StorageError::Pool(e.to_string())))
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_in_memory_storage() {
        let storage = Storage::in_memory().unwrap();
        assert!(storage.connection().is_ok());
    }

    #[test]
    fn test_storage_in_data_dir() {
        let dir = tempfile::tempdir().unwrap();
        let storage = Storage::new_with_path(dir.path().join("data")).unwrap();

        assert!(storage.db_path().ends_with("tabhost.db"));
        assert!(storage.db_path().exists());

        let conn = storage.connection().unwrap();
        set_setting(&conn, "k", "v").unwrap();
        assert_eq!(get_setting(&conn, "k").unwrap(), Some("v".to_string()));
    }
}
