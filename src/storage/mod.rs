// storage/mod.rs
// Store capability and its backends

pub mod keys;
pub mod memory;
pub mod migrations;
pub mod pool;
pub mod sqlite;
#[cfg(test)]
pub mod test_helpers;

use std::collections::HashMap;

use async_trait::async_trait;

use crate::error_handling::StoreError;

// Re-export commonly used items
pub use memory::MemoryStore;
pub use migrations::run_migrations;
pub use pool::init_db_pool_with_path;
pub use sqlite::SqliteStore;

/// A write that can be staged into an atomic batch.
///
/// Batches are plain data so a failed flush can be handed to the store again
/// without rebuilding it.
#[derive(Debug, Clone, PartialEq)]
pub enum WriteOp {
    /// Insert `member` into the ordered set `key`, or move it to `score`.
    OrderedInsert {
        key: String,
        score: f64,
        member: String,
    },
    /// Set `field` of hash `key` to `value`.
    HashSet {
        key: String,
        field: String,
        value: String,
    },
    /// Add `delta` to the counter `key`.
    CounterIncrement { key: String, delta: i64 },
    /// Add `delta` to the integer in `field` of hash `key`.
    CounterIncrementField {
        key: String,
        field: String,
        delta: i64,
    },
}

impl WriteOp {
    pub fn ordered_insert(key: impl Into<String>, score: f64, member: impl Into<String>) -> Self {
        WriteOp::OrderedInsert {
            key: key.into(),
            score,
            member: member.into(),
        }
    }

    pub fn hash_set(
        key: impl Into<String>,
        field: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        WriteOp::HashSet {
            key: key.into(),
            field: field.into(),
            value: value.into(),
        }
    }

    pub fn counter_increment(key: impl Into<String>, delta: i64) -> Self {
        WriteOp::CounterIncrement {
            key: key.into(),
            delta,
        }
    }

    pub fn counter_increment_field(
        key: impl Into<String>,
        field: impl Into<String>,
        delta: i64,
    ) -> Self {
        WriteOp::CounterIncrementField {
            key: key.into(),
            field: field.into(),
            delta,
        }
    }
}

/// Operations the application requires of its key-value store.
///
/// Every component receives a store handle explicitly; there is no process-wide
/// connection. Implementations must make each single operation atomic per key and
/// [`Store::execute_atomic`] all-or-nothing across keys. Ordered sets sort by score
/// and then by member bytes.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts `member` into ordered set `key`, or updates its score.
    async fn ordered_insert(&self, key: &str, score: f64, member: &str) -> Result<(), StoreError>;

    /// Members with `min_score <= score <= max_score`, highest score first, at most `limit`.
    async fn ordered_range_by_score_desc(
        &self,
        key: &str,
        max_score: f64,
        min_score: f64,
        limit: usize,
    ) -> Result<Vec<String>, StoreError>;

    /// Every member of ordered set `key`, lowest score first. Empty if `key` is unknown.
    async fn ordered_range_all(&self, key: &str) -> Result<Vec<String>, StoreError>;

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError>;

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError>;

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError>;

    /// Adds `delta` to counter `key` (created at zero) and returns the new value.
    async fn counter_increment(&self, key: &str, delta: i64) -> Result<i64, StoreError>;

    /// Adds `delta` to hash field `key`/`field` (created at zero) and returns the new value.
    async fn counter_increment_field(
        &self,
        key: &str,
        field: &str,
        delta: i64,
    ) -> Result<i64, StoreError>;

    /// Applies every operation in `ops`, or none of them.
    async fn execute_atomic(&self, ops: &[WriteOp]) -> Result<(), StoreError>;
}
