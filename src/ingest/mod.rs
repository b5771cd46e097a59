//! Log ingestion.
//!
//! Lines arrive on a byte stream. Each one is parsed into a [`crate::models::LogEntry`],
//! staged as a log append plus a hit increment, and written to the store in
//! atomic batches by [`IngestPipeline`].

mod batch;
mod parse;
mod pipeline;

pub use batch::Batch;
pub use parse::{parse_log_date, parse_log_line};
pub use pipeline::{IngestPipeline, IngestReport};
