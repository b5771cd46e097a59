//! In-memory store.
//!
//! Keeps every structure in process memory behind one `RwLock`. Useful for tests
//! and for embedding the pipelines without a database. Batches are staged on a
//! copy of the keys they touch and swapped in only when every operation
//! succeeded; [`MemoryStore::fail_next_batches`] injects failures part-way through
//! a batch to exercise that guarantee.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::error_handling::StoreError;

use super::{Store, WriteOp};

/// `f64` with a total order, for use as a `BTreeMap` key.
#[derive(Debug, Clone, Copy)]
struct Score(f64);

impl PartialEq for Score {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Score {}

impl PartialOrd for Score {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Score {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

#[derive(Debug, Clone, Default)]
struct OrderedSet {
    scores: HashMap<String, Score>,
    by_score: BTreeMap<Score, BTreeSet<String>>,
}

impl OrderedSet {
    fn insert(&mut self, score: f64, member: &str) {
        if let Some(old) = self.scores.insert(member.to_string(), Score(score)) {
            if let Some(members) = self.by_score.get_mut(&old) {
                members.remove(member);
                if members.is_empty() {
                    self.by_score.remove(&old);
                }
            }
        }
        self.by_score
            .entry(Score(score))
            .or_default()
            .insert(member.to_string());
    }

    fn range_desc(&self, max: f64, min: f64, limit: usize) -> Vec<String> {
        if Score(min) > Score(max) {
            return Vec::new();
        }
        self.by_score
            .range(Score(min)..=Score(max))
            .rev()
            .flat_map(|(_, members)| members.iter().rev())
            .take(limit)
            .cloned()
            .collect()
    }

    fn all(&self) -> Vec<String> {
        self.by_score
            .values()
            .flat_map(|members| members.iter())
            .cloned()
            .collect()
    }
}

#[derive(Debug, Default)]
struct Tables {
    ordered: HashMap<String, OrderedSet>,
    hashes: HashMap<String, HashMap<String, String>>,
    counters: HashMap<String, i64>,
}

impl Tables {
    /// Copies the current state of every key `op` touches into `scratch`.
    fn stage_key(&self, scratch: &mut Tables, op: &WriteOp) {
        match op {
            WriteOp::OrderedInsert { key, .. } => {
                if !scratch.ordered.contains_key(key) {
                    let set = self.ordered.get(key).cloned().unwrap_or_default();
                    scratch.ordered.insert(key.clone(), set);
                }
            }
            WriteOp::HashSet { key, .. } | WriteOp::CounterIncrementField { key, .. } => {
                if !scratch.hashes.contains_key(key) {
                    let hash = self.hashes.get(key).cloned().unwrap_or_default();
                    scratch.hashes.insert(key.clone(), hash);
                }
            }
            WriteOp::CounterIncrement { key, .. } => {
                if !scratch.counters.contains_key(key) {
                    let value = self.counters.get(key).copied().unwrap_or(0);
                    scratch.counters.insert(key.clone(), value);
                }
            }
        }
    }

    fn apply(&mut self, op: &WriteOp) -> Result<(), StoreError> {
        match op {
            WriteOp::OrderedInsert { key, score, member } => {
                self.ordered
                    .entry(key.clone())
                    .or_default()
                    .insert(*score, member);
            }
            WriteOp::HashSet { key, field, value } => {
                self.hashes
                    .entry(key.clone())
                    .or_default()
                    .insert(field.clone(), value.clone());
            }
            WriteOp::CounterIncrement { key, delta } => {
                self.increment_counter(key, *delta);
            }
            WriteOp::CounterIncrementField { key, field, delta } => {
                self.increment_field(key, field, *delta)?;
            }
        }
        Ok(())
    }

    fn increment_counter(&mut self, key: &str, delta: i64) -> i64 {
        let value = self.counters.entry(key.to_string()).or_insert(0);
        *value += delta;
        *value
    }

    fn increment_field(&mut self, key: &str, field: &str, delta: i64) -> Result<i64, StoreError> {
        let hash = self.hashes.entry(key.to_string()).or_default();
        let current = match hash.get(field) {
            Some(text) => text.parse::<i64>().map_err(|_| StoreError::NotAnInteger {
                key: key.to_string(),
                field: field.to_string(),
            })?,
            None => 0,
        };
        let value = current + delta;
        hash.insert(field.to_string(), value.to_string());
        Ok(value)
    }

    /// Replaces every key present in `scratch`.
    fn merge(&mut self, scratch: Tables) {
        self.ordered.extend(scratch.ordered);
        self.hashes.extend(scratch.hashes);
        self.counters.extend(scratch.counters);
    }
}

#[derive(Debug, Clone, Copy)]
struct FailurePlan {
    batches: usize,
    after_ops: usize,
}

/// Store that lives entirely in process memory.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    failures: Mutex<Option<FailurePlan>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes the next `batches` calls to [`Store::execute_atomic`] fail after
    /// staging `after_ops` of their operations.
    pub fn fail_next_batches(&self, batches: usize, after_ops: usize) {
        let mut plan = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        *plan = (batches > 0).then_some(FailurePlan { batches, after_ops });
    }

    fn take_failure(&self) -> Option<usize> {
        let mut guard = self.failures.lock().unwrap_or_else(|e| e.into_inner());
        let plan = guard.as_mut()?;
        let after_ops = plan.after_ops;
        plan.batches -= 1;
        if plan.batches == 0 {
            *guard = None;
        }
        Some(after_ops)
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Tables> {
        self.tables.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Tables> {
        self.tables.write().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ordered_insert(&self, key: &str, score: f64, member: &str) -> Result<(), StoreError> {
        self.write()
            .ordered
            .entry(key.to_string())
            .or_default()
            .insert(score, member);
        Ok(())
    }

    async fn ordered_range_by_score_desc(
        &self,
        key: &str,
        max_score: f64,
        min_score: f64,
        limit: usize,
    ) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()
            .ordered
            .get(key)
            .map(|set| set.range_desc(max_score, min_score, limit))
            .unwrap_or_default())
    }

    async fn ordered_range_all(&self, key: &str) -> Result<Vec<String>, StoreError> {
        Ok(self
            .read()
            .ordered
            .get(key)
            .map(OrderedSet::all)
            .unwrap_or_default())
    }

    async fn hash_get(&self, key: &str, field: &str) -> Result<Option<String>, StoreError> {
        Ok(self
            .read()
            .hashes
            .get(key)
            .and_then(|hash| hash.get(field))
            .cloned())
    }

    async fn hash_set(&self, key: &str, field: &str, value: &str) -> Result<(), StoreError> {
        self.write()
            .hashes
            .entry(key.to_string())
            .or_default()
            .insert(field.to_string(), value.to_string());
        Ok(())
    }

    async fn hash_get_all(&self, key: &str) -> Result<HashMap<String, String>, StoreError> {
        Ok(self.read().hashes.get(key).cloned().unwrap_or_default())
    }

    async fn counter_increment(&self, key: &str, delta: i64) -> Result<i64, StoreError> {
        Ok(self.write().increment_counter(key, delta))
    }

    async fn counter_increment_field(
        &self,
        key: &str,
        field: &str,
        delta: i64,
    ) -> Result<i64, StoreError> {
        self.write().increment_field(key, field, delta)
    }

    async fn execute_atomic(&self, ops: &[WriteOp]) -> Result<(), StoreError> {
        let fail_after = self.take_failure();
        let mut tables = self.write();

        let mut scratch = Tables::default();
        for op in ops {
            tables.stage_key(&mut scratch, op);
        }
        for (applied, op) in ops.iter().enumerate() {
            if fail_after == Some(applied) {
                return Err(StoreError::InjectedFailure { applied });
            }
            scratch.apply(op)?;
        }
        if let Some(applied) = fail_after {
            // Failure planned past the end of the batch: fail before commit
            return Err(StoreError::InjectedFailure {
                applied: applied.min(ops.len()),
            });
        }

        tables.merge(scratch);
        Ok(())
    }
}
