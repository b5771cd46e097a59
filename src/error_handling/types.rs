//! Error type definitions.
//!
//! This module defines the error taxonomy used throughout the application and the
//! reasons a single input item can be skipped.

use log::SetLoggerError;
use strum_macros::EnumIter as EnumIterMacro;
use thiserror::Error;

/// Error types for initialization failures.
#[derive(Error, Debug)]
pub enum InitializationError {
    /// Error initializing the logger.
    #[error("Logger initialization error: {0}")]
    LoggerError(#[from] SetLoggerError),
}

/// Error types for store communication.
///
/// Every variant is fatal to the operation that hit it: retrieval and aggregation
/// surface it to the caller, ingest loses at most the in-flight batch.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Error creating the database file.
    #[error("Database file creation error: {0}")]
    FileCreationError(String),

    /// SQL execution error.
    #[error("SQL error: {0}")]
    SqlError(#[from] sqlx::Error),

    /// Schema migration error.
    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    /// A counter increment hit a field holding a non-integer value.
    #[error("Field {field:?} of {key:?} does not hold an integer")]
    NotAnInteger { key: String, field: String },

    /// A stored value could not be decoded.
    #[error("Corrupt value under {key:?}: {reason}")]
    Corrupt { key: String, reason: String },

    /// Failure injected into a batch (memory store only).
    #[error("Injected batch failure after {applied} operation(s)")]
    InjectedFailure { applied: usize },
}

/// Per-item parse failures.
///
/// Always non-fatal: the offending IP, row, or line is skipped and counted.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    /// Not a dotted-quad IPv4 address.
    #[error("Invalid IPv4 address: {0:?}")]
    InvalidIp(String),

    /// Import row without a usable shape (header, short row, non-numeric id).
    #[error("Malformed record row: {0}")]
    MalformedRow(String),

    /// Blank input line.
    #[error("Empty log line")]
    EmptyLine,

    /// Final token of the line is not a numeric collection id.
    #[error("Log line does not end in a numeric collection id")]
    MissingCollectionId,

    /// Line has fewer fields than the configured date offset.
    #[error("Log line has no field at date offset {0}")]
    MissingDate(usize),

    /// Date token does not match `[%d/%b/%Y:%H:%M:%S`.
    #[error("Invalid log date {0:?}")]
    InvalidDate(String),

    /// Line has fewer fields than the configured IP offset.
    #[error("Log line has no field at IP offset {0}")]
    MissingIp(usize),
}

impl ParseError {
    /// Maps the error onto the counter it is tallied under.
    pub fn skip_reason(&self) -> SkipReason {
        match self {
            ParseError::InvalidIp(_) => SkipReason::InvalidIp,
            ParseError::MalformedRow(_) => SkipReason::MalformedRow,
            ParseError::EmptyLine => SkipReason::EmptyLine,
            ParseError::MissingCollectionId => SkipReason::MissingCollectionId,
            ParseError::MissingDate(_) => SkipReason::MissingDate,
            ParseError::InvalidDate(_) => SkipReason::InvalidDate,
            ParseError::MissingIp(_) => SkipReason::MissingIp,
        }
    }
}

/// Errors from a geo lookup: a bad query, or a store that could not answer.
///
/// A lookup that simply finds nothing is `Ok(None)`, not an error.
#[derive(Error, Debug)]
pub enum LookupError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Errors that abort an ingest run.
#[derive(Error, Debug)]
pub enum IngestError {
    /// Reading the input stream failed.
    #[error("Failed to read log input: {0}")]
    Input(#[from] std::io::Error),

    /// A flush still failed after all retries; the staged batch was not written.
    #[error("Failed to flush batch of {lines} line(s): {source}")]
    Flush {
        lines: usize,
        #[source]
        source: StoreError,
    },
}

/// Reasons a single input item was skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIterMacro)]
pub enum SkipReason {
    EmptyLine,
    MissingCollectionId,
    MissingDate,
    InvalidDate,
    MissingIp,
    InvalidIp,
    MalformedRow,
    LocationNotFound,
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl SkipReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            SkipReason::EmptyLine => "empty line",
            SkipReason::MissingCollectionId => "missing collection id",
            SkipReason::MissingDate => "missing date field",
            SkipReason::InvalidDate => "invalid date",
            SkipReason::MissingIp => "missing IP field",
            SkipReason::InvalidIp => "invalid IP address",
            SkipReason::MalformedRow => "malformed row",
            SkipReason::LocationNotFound => "no geo match",
        }
    }
}
