//! Configuration constants.
//!
//! This module defines the defaults used throughout the application: batch sizes,
//! field offsets within log lines, retry timing, and the database location.

use std::time::Duration;

/// Default SQLite database path
pub const DB_PATH: &str = "./loggeo.db";

// Ingest pipeline
/// Number of staged log lines that triggers a flush
pub const DEFAULT_BATCH_SIZE: usize = 100;
/// How long the input may stay quiet before a partial batch is flushed
/// (only matters for live tails)
pub const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_secs(5);
/// Zero-based offset of the `[dd/Mon/yyyy:HH:MM:SS` token when a line is split on single spaces.
/// Offset 4 accounts for the load balancer address prepended in front of the client address.
pub const DEFAULT_DATE_FIELD: usize = 4;
/// strftime pattern of the bracketed date token (the timezone is a separate token)
pub const LOG_DATE_FORMAT: &str = "[%d/%b/%Y:%H:%M:%S";

// Geo aggregation
/// Zero-based offset of the client IP token when a line is split on whitespace.
/// Field 0 is the proxy address added by the load balancer.
pub const DEFAULT_IP_FIELD: usize = 1;

// Geo import
/// Number of rows written per atomic batch during geo imports
pub const DEFAULT_IMPORT_CHUNK_SIZE: usize = 1000;

// Retry strategy for batch flushes
/// Initial delay in milliseconds before the first flush retry
pub const RETRY_INITIAL_DELAY_MS: u64 = 500;
/// Factor by which retry delay is multiplied on each attempt
pub const RETRY_FACTOR: u64 = 2;
/// Maximum delay between retries in seconds
pub const RETRY_MAX_DELAY_SECS: u64 = 15;
/// Number of retries after the initial flush attempt fails
pub const FLUSH_RETRIES: usize = 3;
