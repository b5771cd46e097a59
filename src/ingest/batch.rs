//! Staged writes for one atomic flush.

use crate::models::LogEntry;
use crate::storage::keys::{collection_log, hits_field, KNOWN_COLLECTIONS};
use crate::storage::WriteOp;

/// Writes staged for the next flush.
///
/// Every line contributes a log append and a hit increment; both always land in
/// the same batch, so a reader never sees one without the other.
#[derive(Debug, Default)]
pub struct Batch {
    ops: Vec<WriteOp>,
    lines: usize,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages the log append and hit increment for `entry`.
    pub fn enqueue(&mut self, entry: &LogEntry) {
        self.ops.push(WriteOp::ordered_insert(
            collection_log(&entry.collection),
            entry.timestamp,
            entry.line.clone(),
        ));
        self.ops.push(WriteOp::counter_increment_field(
            KNOWN_COLLECTIONS,
            hits_field(&entry.collection),
            1,
        ));
        self.lines += 1;
    }

    /// Number of staged lines.
    pub fn lines(&self) -> usize {
        self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines == 0
    }

    pub fn ops(&self) -> &[WriteOp] {
        &self.ops
    }

    pub fn clear(&mut self) {
        self.ops.clear();
        self.lines = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_enqueue_stages_append_and_hit() {
        let mut batch = Batch::new();
        let entry = LogEntry {
            collection: "42".parse().unwrap(),
            timestamp: 1.5,
            line: "line 42".to_string(),
        };
        batch.enqueue(&entry);

        assert_eq!(batch.lines(), 1);
        assert_eq!(
            batch.ops(),
            &[
                WriteOp::ordered_insert("logs:42", 1.5, "line 42"),
                WriteOp::counter_increment_field("known", "hits:42", 1),
            ]
        );

        batch.clear();
        assert!(batch.is_empty());
        assert!(batch.ops().is_empty());
    }
}
