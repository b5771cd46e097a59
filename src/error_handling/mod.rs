//! Error handling and skip statistics.
//!
//! This module provides:
//! - Error type definitions (`ParseError`, `StoreError`, `LookupError`, `IngestError`)
//! - Skip statistics tracking per `SkipReason`
//! - Retry strategy configuration for batch flushes
//!
//! Parse errors are per-item and never abort a pipeline. Store errors always
//! reach the caller.

mod categorization;
mod stats;
mod types;

// Re-export public API
pub use categorization::flush_retry_strategy;
pub use stats::SkipStats;
pub use types::{
    IngestError, InitializationError, LookupError, ParseError, SkipReason, StoreError,
};
