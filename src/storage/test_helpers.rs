//! Shared test helpers for storage module tests.

use crate::storage::SqliteStore;

/// Creates an in-memory SQLite store with migrations applied.
pub async fn create_test_store() -> SqliteStore {
    SqliteStore::in_memory()
        .await
        .expect("Failed to create test store")
}
