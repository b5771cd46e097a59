//! Configuration types and CLI options.
//!
//! This module defines enums and structs used for command-line argument parsing
//! and the per-pipeline configuration consumed by the library.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};

use crate::config::constants::{
    DB_PATH, DEFAULT_BATCH_SIZE, DEFAULT_DATE_FIELD, DEFAULT_FLUSH_INTERVAL,
    DEFAULT_IMPORT_CHUNK_SIZE, DEFAULT_IP_FIELD, FLUSH_RETRIES, RETRY_INITIAL_DELAY_MS,
};

/// Logging level for the application.
///
/// Controls the verbosity of log output, from most restrictive (Error) to most
/// verbose (Trace).
#[derive(Clone, Debug, ValueEnum)]
pub enum LogLevel {
    /// Only error messages
    Error,
    /// Error and warning messages
    Warn,
    /// Error, warning, and informational messages
    Info,
    /// All messages except trace
    Debug,
    /// All messages including trace
    Trace,
}

impl From<LogLevel> for log::LevelFilter {
    fn from(l: LogLevel) -> Self {
        match l {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

/// Log output format.
///
/// - `Plain`: Human-readable format with colors (default)
/// - `Json`: Structured JSON format for machine parsing
#[derive(Clone, Debug, ValueEnum)]
pub enum LogFormat {
    /// Human-readable format with colors (default)
    Plain,
    /// Structured JSON format for machine parsing
    Json,
}

/// Command-line options.
#[derive(Debug, Parser)]
#[command(
    name = "loggeo",
    version,
    about = "Stores collection-tagged web server logs and tallies where the requests came from."
)]
pub struct Opt {
    /// SQLite database path
    #[arg(long, global = true, default_value = DB_PATH)]
    pub db_path: PathBuf,

    /// Log level
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Plain)]
    pub log_format: LogFormat,

    #[command(subcommand)]
    pub command: Command,
}

/// Subcommands, one per pipeline.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Import IP block ranges (start, end, city id) into the geo index
    ImportBlocks {
        /// CSV file of IP blocks
        file: PathBuf,
        /// Rows written per atomic batch
        #[arg(long, default_value_t = DEFAULT_IMPORT_CHUNK_SIZE, value_parser = parse_positive)]
        chunk_size: usize,
    },
    /// Import city metadata (city id, country, region, city)
    ImportCities {
        /// CSV file of city locations
        file: PathBuf,
        /// Rows written per atomic batch
        #[arg(long, default_value_t = DEFAULT_IMPORT_CHUNK_SIZE, value_parser = parse_positive)]
        chunk_size: usize,
    },
    /// Ingest log lines ending in a numeric collection id
    Ingest {
        /// Log file to read, or `-` for stdin
        #[arg(default_value = "-")]
        file: PathBuf,
        /// Lines staged per atomic flush
        #[arg(long, default_value_t = DEFAULT_BATCH_SIZE, value_parser = parse_positive)]
        batch_size: usize,
        /// Zero-based offset of the bracketed date token (split on single spaces)
        #[arg(long, default_value_t = DEFAULT_DATE_FIELD)]
        date_field: usize,
        /// Seconds a partial batch may wait before it is flushed (0 disables)
        #[arg(long, default_value_t = DEFAULT_FLUSH_INTERVAL.as_secs())]
        flush_interval_secs: u64,
    },
    /// Print the stored log lines of one collection, oldest first
    Logs {
        /// Collection id
        collection: String,
    },
    /// Resolve an IPv4 address (or numeric score) to city, region, country
    Resolve {
        /// Dotted-quad address or integer score
        ip: String,
    },
    /// Tally request locations for every known collection
    Aggregate {
        /// Zero-based offset of the client IP token (split on whitespace)
        #[arg(long, default_value_t = DEFAULT_IP_FIELD)]
        ip_field: usize,
    },
    /// List known collections and their hit counts
    Collections,
}

fn parse_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("value must be at least 1".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(e.to_string()),
    }
}

/// Ingest pipeline configuration.
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Lines staged before a flush is triggered
    pub batch_size: usize,
    /// Flush a partial batch when no line arrived for this long
    pub flush_interval: Option<Duration>,
    /// Offset of the bracketed date token
    pub date_field: usize,
    /// Retries after a failed flush before the run aborts
    pub flush_retries: usize,
    /// Base delay for the exponential retry backoff
    pub retry_initial_delay_ms: u64,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            batch_size: DEFAULT_BATCH_SIZE,
            flush_interval: Some(DEFAULT_FLUSH_INTERVAL),
            date_field: DEFAULT_DATE_FIELD,
            flush_retries: FLUSH_RETRIES,
            retry_initial_delay_ms: RETRY_INITIAL_DELAY_MS,
        }
    }
}

/// Geo aggregation configuration.
#[derive(Debug, Clone)]
pub struct AggregateConfig {
    /// Offset of the client IP token
    pub ip_field: usize,
}

impl Default for AggregateConfig {
    fn default() -> Self {
        Self {
            ip_field: DEFAULT_IP_FIELD,
        }
    }
}

/// Geo import configuration.
#[derive(Debug, Clone)]
pub struct ImportConfig {
    /// Rows written per atomic batch
    pub chunk_size: usize,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            chunk_size: DEFAULT_IMPORT_CHUNK_SIZE,
        }
    }
}
