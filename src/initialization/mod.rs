//! Application initialization and resource setup.
//!
//! This module provides functions to initialize shared resources:
//! - Logger (plain or JSON)
//! - SQLite-backed store
//!
//! All initialization functions return proper error types for error handling.

mod logger;

use std::path::Path;

use crate::error_handling::StoreError;
use crate::storage::SqliteStore;

// Re-export public API
pub use logger::init_logger_with;

/// Opens (creating if needed) the SQLite store at `db_path` and applies the schema.
pub async fn init_store(db_path: &Path) -> Result<SqliteStore, StoreError> {
    SqliteStore::open(db_path).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::Store;

    #[tokio::test]
    async fn test_init_store_creates_database_with_schema() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let db_path = dir.path().join("loggeo.db");

        let store = init_store(&db_path).await.unwrap();
        assert!(db_path.exists());
        assert_eq!(store.counter_increment("known", 1).await.unwrap(), 1);
        store.pool().close().await;
    }
}
