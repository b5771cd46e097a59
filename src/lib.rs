//! loggeo library: collection-tagged log storage with IP geolocation
//!
//! This library stores web server log lines per collection (the numeric id that
//! ends every line), ordered by the timestamp inside the line, and tallies where
//! the requests came from using an offline IPv4 range index.
//!
//! The pieces:
//! - [`geoip`] builds the range index from block and city records and resolves
//!   addresses with a floor query
//! - [`ingest`] streams lines into the store in atomic batches
//! - [`retrieval`] reads a collection's lines back in time order
//! - [`aggregate`] counts locations and countries per collection
//!
//! Everything talks to a [`storage::Store`]: [`storage::SqliteStore`] for real
//! runs, [`storage::MemoryStore`] for tests and embedding.
//!
//! # Example
//!
//! ```no_run
//! use loggeo::config::IngestConfig;
//! use loggeo::ingest::IngestPipeline;
//! use loggeo::models::CollectionId;
//! use loggeo::retrieval::get_logs;
//! use loggeo::storage::MemoryStore;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = MemoryStore::new();
//! let input = r#"10.0.0.1 203.0.113.9 - - [01/Jan/2013:00:00:00 -0800] "GET / HTTP/1.1" 200 512 42"#;
//!
//! let report = IngestPipeline::new(&store, IngestConfig::default())
//!     .run(input.as_bytes())
//!     .await?;
//! assert_eq!(report.lines_staged, 1);
//!
//! let collection: CollectionId = "42".parse()?;
//! let lines = get_logs(&store, &collection).await?;
//! println!("{lines:?}");
//! # Ok(())
//! # }
//! ```
//!
//! # Requirements
//!
//! This library requires a Tokio runtime.

pub mod aggregate;
pub mod app;
pub mod config;
pub mod error_handling;
pub mod geoip;
pub mod ingest;
pub mod initialization;
pub mod models;
pub mod retrieval;
pub mod storage;

// Re-export public API
pub use aggregate::{aggregate_locations, AggregateReport};
pub use geoip::{find_city_by_ip, ip_to_score, CityLocation};
pub use ingest::{IngestPipeline, IngestReport};
pub use models::{CollectionId, LogEntry};
pub use retrieval::{get_logs, known_collections};
pub use storage::{MemoryStore, SqliteStore, Store};
