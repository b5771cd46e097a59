//! SQLite-backed store.
//!
//! Ordered sets, hashes and counters live in three tables (see `migrations/`).
//! Each single operation is one SQL statement; [`Store::execute_atomic`] wraps a
//! batch in one transaction, so concurrent ingest processes sharing the database
//! never observe half a batch.

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use sqlx::{SqliteConnection, SqlitePool};

use crate::error_handling::StoreError;

use super::migrations::run_migrations;
use super::pool::{init_db_pool_with_path, init_memory_pool};
use super::{Store, WriteOp};

/// Store backed by a SQLite connection pool.
#[derive(Clone, Debug)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens the database file at `db_path`, creating it and its schema if needed.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let pool = init_db_pool_with_path(db_path).await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    /// Opens a private in-memory database with the schema applied.
    pub async fn in_memory() -> Result<Self, StoreError> {
        let pool = init_memory_pool().await?;
        run_migrations(&pool).await?;
        Ok(Self { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

async fn upsert_member(
    conn: &mut SqliteConnection,
    key: &str,
    score: f64,
    member: &str,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO ordered_sets (set_key, member, score) VALUES (?, ?, ?)
        ON CONFLICT(set_key, member) DO UPDATE SET score = excluded.score",
    )
    .bind(key)
    .bind(member)
    .bind(score)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn upsert_field(
    conn: &mut SqliteConnection,
    key: &str,
    field: &str,
    value: &str,
) -> Result<(), StoreError> {
    sqlx::query(
        "INSERT INTO hashes (table_key, field, value) VALUES (?, ?, ?)
        ON CONFLICT(table_key, field) DO UPDATE SET value = excluded.value",
    )
    .bind(key)
    .bind(field)
    .bind(value)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

async fn increment_counter(
    conn: &mut SqliteConnection,
    key: &str,
    delta: i64,
) -> Result<i64, StoreError> {
    let value = sqlx::query_scalar::<_, i64>(
        "INSERT INTO counters (counter_key, value) VALUES (?, ?)
        ON CONFLICT(counter_key) DO UPDATE SET value = counters.value + excluded.value
        RETURNING value",
    )
    .bind(key)
    .bind(delta)
    .fetch_one(&mut *conn)
    .await?;
    Ok(value)
}

async fn increment_field(
    conn: &mut SqliteConnection,
    key: &str,
    field: &str,
    delta: i64,
) -> Result<i64, StoreError> {
    // The WHERE clause leaves non-integer values untouched; no row comes back then.
    let value = sqlx::query_scalar::<_, i64>(
        "INSERT INTO hashes (table_key, field, value) VALUES (?, ?, ?)
        ON CONFLICT(table_key, field) DO UPDATE
            SET value = CAST(hashes.value AS INTEGER) + CAST(excluded.value AS INTEGER)
            WHERE CAST(CAST(hashes.value AS INTEGER) AS TEXT) = hashes.value
        RETURNING CAST(value AS INTEGER)",
    )
    .bind(key)
    .bind(field)
    .bind(delta.to_string())
    .fetch_optional(&mut *conn)
    .await?;

    value.ok_or_else(|| StoreError::NotAnInteger {
        key: key.to_string(),
        field: field.to_string(),
    })
}

async fn apply_op(conn: &mut SqliteConnection, op: &WriteOp) -> Result<(), StoreError> {
    match op {
        WriteOp::OrderedInsert { key, score, member } => {
            upsert_member(conn, key, *score, member).await
        }
        WriteOp::HashSet { key, field, value } => upsert_field(conn, key, field, value).await,
        WriteOp::CounterIncrement { key, delta } => {
            increment_counter(conn, key, *delta).await.map(|_| ())
        }
        WriteOp::CounterIncrementField { key, field, delta } => {
            increment_field(conn, key, field, *delta).await.map(|_| ())
        }
    }
}

#[async_trait]
impl Store for SqliteStore {
    async fn ordered_insert(&self, key: &str, score: f64, member: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        upsert_member(&mut conn, key, score, member).await
    }

    async fn ordered_range_by_score_desc(
        &self,
        key: &str,
        max_score: f64,
        min_score: f64,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let members = sqlx::query_scalar::<_, String>(
            "SELECT member FROM ordered_sets
            WHERE set_key = ? AND score <= ? AND score >= ?
            ORDER BY score DESC, member DESC
            LIMIT ?",
        )
        .bind(key)
        .bind(max_score)
        .bind(min_score)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn ordered_range_all(&self, key: &str) -> Result<Vec<String>, StoreError> {
        let members = sqlx::query_scalar::<_, String>(
            "SELECT member FROM ordered_sets WHERE set_key = ? ORDER BY score ASC, member ASC",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;
        Ok(members)
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        let value = sqlx::query_scalar::<_, String>(
            "SELECT value FROM hashes WHERE table_key = ? AND field = ?",
        )
        .bind(key)
        .bind(field)
        .fetch_optional(&self.pool)
        .await?;
        Ok(value)
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        let mut conn = self.pool.acquire().await?;
        upsert_field(&mut conn, key, field, value).await
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String)>(
            "SELECT field, value FROM hashes WHERE table_key = ?",
        )
        .bind(key)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().collect())
    }

    async fn counter_increment(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        increment_counter(&mut conn, key, delta).await
    }

    async fn counter_increment_field(
        &self,
        key: &str,
        field: &str,
        delta: i64,
    ) -> Result<i64, StoreError> {
        let mut conn = self.pool.acquire().await?;
        increment_field(&mut conn, key, field, delta).await
    }

    async fn execute_atomic(&self, ops: &[WriteOp]) -> Result<(), StoreError> {
        if ops.is_empty() {
            return Ok(());
        }

        // Dropping the transaction on an early return rolls it back
        let mut tx = self.pool.begin().await?;
        for op in ops {
            apply_op(&mut tx, op).await?;
        }
        tx.commit().await?;

        log::trace!("Committed atomic batch of {} operation(s)", ops.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::test_helpers::create_test_store;

    #[tokio::test]
    async fn test_ordered_floor_query() {
        let store = create_test_store().await;
        store.ordered_insert("idx", 10.0, "a").await.unwrap();
        store.ordered_insert("idx", 20.0, "b").await.unwrap();
        store.ordered_insert("idx", 30.0, "c").await.unwrap();

        let hit = store
            .ordered_range_by_score_desc("idx", 25.0, 0.0, 1)
            .await
            .unwrap();
        assert_eq!(hit, vec!["b".to_string()]);

        let exact = store
            .ordered_range_by_score_desc("idx", 30.0, 0.0, 1)
            .await
            .unwrap();
        assert_eq!(exact, vec!["c".to_string()]);

        let below = store
            .ordered_range_by_score_desc("idx", 9.0, 0.0, 1)
            .await
            .unwrap();
        assert!(below.is_empty());
    }

    #[tokio::test]
    async fn test_ordered_insert_moves_existing_member() {
        let store = create_test_store().await;
        store.ordered_insert("set", 5.0, "x").await.unwrap();
        store.ordered_insert("set", 1.0, "y").await.unwrap();
        store.ordered_insert("set", 0.5, "x").await.unwrap();

        let all = store.ordered_range_all("set").await.unwrap();
        assert_eq!(all, vec!["x".to_string(), "y".to_string()]);
    }

    #[tokio::test]
    async fn test_ordered_ties_sort_by_member() {
        let store = create_test_store().await;
        store.ordered_insert("set", 1.0, "b").await.unwrap();
        store.ordered_insert("set", 1.0, "a").await.unwrap();

        assert_eq!(
            store.ordered_range_all("set").await.unwrap(),
            vec!["a".to_string(), "b".to_string()]
        );
        assert_eq!(
            store
                .ordered_range_by_score_desc("set", 1.0, 0.0, 1)
                .await
                .unwrap(),
            vec!["b".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unknown_ordered_set_is_empty() {
        let store = create_test_store().await;
        assert!(store.ordered_range_all("logs:missing").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_hash_operations() {
        let store = create_test_store().await;
        assert_eq!(store.hash_get("h", "f").await.unwrap(), None);

        store.hash_set("h", "f", "one").await.unwrap();
        store.hash_set("h", "f", "two").await.unwrap();
        store.hash_set("h", "g", "three").await.unwrap();

        assert_eq!(store.hash_get("h", "f").await.unwrap().as_deref(), Some("two"));
        let all = store.hash_get_all("h").await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all.get("g").map(String::as_str), Some("three"));
    }

    #[tokio::test]
    async fn test_counter_increments() {
        let store = create_test_store().await;
        assert_eq!(store.counter_increment("c", 1).await.unwrap(), 1);
        assert_eq!(store.counter_increment("c", 4).await.unwrap(), 5);

        assert_eq!(store.counter_increment_field("h", "n", 1).await.unwrap(), 1);
        assert_eq!(store.counter_increment_field("h", "n", 2).await.unwrap(), 3);
        assert_eq!(store.hash_get("h", "n").await.unwrap().as_deref(), Some("3"));
    }

    #[tokio::test]
    async fn test_increment_field_rejects_text_value() {
        let store = create_test_store().await;
        store.hash_set("h", "name", "Singapore").await.unwrap();

        let result = store.counter_increment_field("h", "name", 1).await;
        assert!(matches!(result, Err(StoreError::NotAnInteger { .. })));
        assert_eq!(
            store.hash_get("h", "name").await.unwrap().as_deref(),
            Some("Singapore")
        );
    }

    #[tokio::test]
    async fn test_atomic_batch_rolls_back_on_failure() {
        let store = create_test_store().await;
        store.hash_set("h", "name", "text").await.unwrap();

        let ops = vec![
            WriteOp::ordered_insert("logs:1", 1.0, "line"),
            WriteOp::counter_increment_field("known", "hits:1", 1),
            // Fails: not an integer
            WriteOp::counter_increment_field("h", "name", 1),
        ];
        assert!(store.execute_atomic(&ops).await.is_err());

        assert!(store.ordered_range_all("logs:1").await.unwrap().is_empty());
        assert_eq!(store.hash_get("known", "hits:1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_atomic_batch_applies_all() {
        let store = create_test_store().await;
        let ops = vec![
            WriteOp::ordered_insert("logs:1", 2.0, "second"),
            WriteOp::ordered_insert("logs:1", 1.0, "first"),
            WriteOp::counter_increment_field("known", "hits:1", 2),
            WriteOp::counter_increment("total", 2),
            WriteOp::hash_set("meta", "source", "test"),
        ];
        store.execute_atomic(&ops).await.unwrap();

        assert_eq!(
            store.ordered_range_all("logs:1").await.unwrap(),
            vec!["first".to_string(), "second".to_string()]
        );
        assert_eq!(
            store.hash_get("known", "hits:1").await.unwrap().as_deref(),
            Some("2")
        );
        assert_eq!(store.counter_increment("total", 0).await.unwrap(), 2);
        assert_eq!(
            store.hash_get("meta", "source").await.unwrap().as_deref(),
            Some("test")
        );
    }

    #[tokio::test]
    async fn test_open_file_database_persists() {
        let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
        let db_path = dir.path().join("loggeo.db");

        {
            let store = SqliteStore::open(&db_path).await.unwrap();
            store.ordered_insert("logs:7", 1.0, "kept").await.unwrap();
            store.pool().close().await;
        }

        // Reopening runs migrations again without touching existing data
        let store = SqliteStore::open(&db_path).await.unwrap();
        assert_eq!(
            store.ordered_range_all("logs:7").await.unwrap(),
            vec!["kept".to_string()]
        );
    }
}
