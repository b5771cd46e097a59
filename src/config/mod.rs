//! Application configuration and constants.
//!
//! This module provides:
//! - Configuration constants (batch sizes, field offsets, retry timing)
//! - Library configuration structs for each pipeline
//! - CLI option types and parsing

mod constants;
mod types;

// Re-export all constants
pub use constants::*;
pub use types::{
    AggregateConfig, Command, ImportConfig, IngestConfig, LogFormat, LogLevel, Opt,
};
