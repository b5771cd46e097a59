//! Ingest pipeline.
//!
//! Reads lines, parses them, stages the resulting writes, and flushes the staged
//! batch as one atomic unit when:
//! - `batch_size` lines are staged,
//! - the input has been quiet for `flush_interval` with lines staged, or
//! - the input ends.
//!
//! Batch boundaries are the only safe interruption points. A failed flush is
//! retried with exponential backoff; when the retries run out the run stops with
//! [`IngestError::Flush`] and only that batch is lost.

use std::time::Instant;

use log::{debug, error, info, warn};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio_retry::Retry;

use crate::config::IngestConfig;
use crate::error_handling::{flush_retry_strategy, IngestError, SkipStats};
use crate::storage::Store;

use super::batch::Batch;
use super::parse::parse_log_line;

/// Summary of an ingest run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IngestReport {
    /// Lines read from the input, including skipped ones
    pub lines_read: usize,
    /// Lines staged for the store
    pub lines_staged: usize,
    /// Lines dropped because they did not parse
    pub lines_skipped: usize,
    /// Successful flushes
    pub flushes: usize,
    /// Elapsed time in seconds
    pub elapsed_seconds: f64,
}

/// Streams log lines into the store in atomic batches.
pub struct IngestPipeline<'a, S: Store + ?Sized> {
    store: &'a S,
    config: IngestConfig,
    batch: Batch,
    skips: SkipStats,
    report: IngestReport,
    /// When the last read from the input completed
    last_input: Instant,
}

impl<'a, S: Store + ?Sized> IngestPipeline<'a, S> {
    pub fn new(store: &'a S, config: IngestConfig) -> Self {
        IngestPipeline {
            store,
            config,
            batch: Batch::new(),
            skips: SkipStats::new(),
            report: IngestReport::default(),
            last_input: Instant::now(),
        }
    }

    /// Parses `line` and stages it, flushing if the batch is full.
    ///
    /// Lines that do not parse are counted and dropped.
    pub async fn process_line(&mut self, line: &str) -> Result<(), IngestError> {
        self.report.lines_read += 1;

        match parse_log_line(line, self.config.date_field) {
            Ok(entry) => {
                self.batch.enqueue(&entry);
                self.report.lines_staged += 1;
                if self.batch.lines() >= self.config.batch_size.max(1) {
                    self.flush().await?;
                }
            }
            Err(e) => {
                debug!("Skipping line {}: {}", self.report.lines_read, e);
                self.skips.increment(e.skip_reason());
                self.report.lines_skipped += 1;
            }
        }
        Ok(())
    }

    /// Writes the staged batch in one atomic operation and clears it.
    pub async fn flush(&mut self) -> Result<(), IngestError> {
        if self.batch.is_empty() {
            return Ok(());
        }

        let store = self.store;
        let ops = self.batch.ops();
        let lines = self.batch.lines();
        let mut attempt = 0usize;

        let result = Retry::spawn(flush_retry_strategy(&self.config), || {
            attempt += 1;
            let attempt = attempt;
            async move {
                let result = store.execute_atomic(ops).await;
                if let Err(ref e) = result {
                    warn!(
                        "Flush attempt {} for {} line(s) failed: {}",
                        attempt, lines, e
                    );
                }
                result
            }
        })
        .await;

        match result {
            Ok(()) => {
                debug!("Flushed batch of {} line(s)", lines);
                self.batch.clear();
                self.report.flushes += 1;
                Ok(())
            }
            Err(source) => {
                error!(
                    "Giving up on batch of {} line(s) after {} attempt(s)",
                    lines, attempt
                );
                Err(IngestError::Flush { lines, source })
            }
        }
    }

    /// Lines staged but not yet flushed.
    pub fn staged_lines(&self) -> usize {
        self.batch.lines()
    }

    pub fn report(&self) -> &IngestReport {
        &self.report
    }

    pub fn skip_stats(&self) -> &SkipStats {
        &self.skips
    }

    /// Consumes `reader` to its end, then flushes whatever is still staged.
    ///
    /// Bytes that are not valid UTF-8 are replaced rather than rejected.
    pub async fn run<R>(mut self, mut reader: R) -> Result<IngestReport, IngestError>
    where
        R: AsyncBufRead + Unpin,
    {
        let start = Instant::now();
        let mut buf = Vec::new();

        loop {
            let idle_limit = self.config.flush_interval.filter(|_| !self.batch.is_empty());
            let read = match idle_limit {
                Some(interval) => {
                    let remaining = interval.saturating_sub(self.last_input.elapsed());
                    // read_until keeps partial input in `buf` when the timeout fires
                    match tokio::time::timeout(remaining, reader.read_until(b'\n', &mut buf)).await
                    {
                        Ok(read) => read?,
                        Err(_) => {
                            debug!(
                                "Input idle for {:?}, flushing {} staged line(s)",
                                interval,
                                self.batch.lines()
                            );
                            self.flush().await?;
                            continue;
                        }
                    }
                }
                None => reader.read_until(b'\n', &mut buf).await?,
            };

            self.last_input = Instant::now();

            if read == 0 && buf.is_empty() {
                break;
            }
            let line = String::from_utf8_lossy(&buf).into_owned();
            buf.clear();
            self.process_line(&line).await?;
            if read == 0 {
                break;
            }
        }

        // End of input: flush the trailing partial batch
        self.flush().await?;

        self.report.elapsed_seconds = start.elapsed().as_secs_f64();
        self.skips.log_summary("log lines");
        info!(
            "Ingested {} of {} line(s) in {} flush(es), {} skipped, in {:.1}s",
            self.report.lines_staged,
            self.report.lines_read,
            self.report.flushes,
            self.report.lines_skipped,
            self.report.elapsed_seconds
        );
        Ok(self.report)
    }
}
