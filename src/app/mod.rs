//! Command dispatch for the binary.
//!
//! Each [`Command`] opens the SQLite store, runs one pipeline, and writes its
//! user-facing output to stdout. Run summaries go to the log.

pub mod output;
pub mod statistics;

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use log::info;
use tokio::io::{AsyncBufRead, BufReader};

use crate::aggregate::aggregate_locations;
use crate::config::{AggregateConfig, Command, ImportConfig, IngestConfig, Opt};
use crate::geoip::{find_city_by_ip, import_blocks_csv, import_cities_csv, IpQuery};
use crate::ingest::IngestPipeline;
use crate::initialization::init_store;
use crate::models::CollectionId;
use crate::retrieval::{get_logs, known_collections};

pub use output::{write_collections, write_location, write_logs};
pub use statistics::{print_aggregate_summary, print_import_summary, print_ingest_summary};

async fn open_input(file: &Path) -> Result<Box<dyn AsyncBufRead + Unpin + Send>> {
    if file == Path::new("-") {
        info!("Reading log lines from stdin");
        return Ok(Box::new(BufReader::new(tokio::io::stdin())));
    }
    let handle = tokio::fs::File::open(file)
        .await
        .with_context(|| format!("Failed to open log file {}", file.display()))?;
    Ok(Box::new(BufReader::new(handle)))
}

/// Runs the command selected on the command line.
pub async fn run(opt: Opt) -> Result<()> {
    let store = init_store(&opt.db_path)
        .await
        .with_context(|| format!("Failed to open database {}", opt.db_path.display()))?;
    let mut stdout = std::io::stdout();

    match opt.command {
        Command::ImportBlocks { file, chunk_size } => {
            let summary = import_blocks_csv(&store, &file, &ImportConfig { chunk_size }).await?;
            print_import_summary("IP block", &summary);
        }
        Command::ImportCities { file, chunk_size } => {
            let summary = import_cities_csv(&store, &file, &ImportConfig { chunk_size }).await?;
            print_import_summary("city", &summary);
        }
        Command::Ingest {
            file,
            batch_size,
            date_field,
            flush_interval_secs,
        } => {
            let config = IngestConfig {
                batch_size,
                date_field,
                flush_interval: (flush_interval_secs > 0)
                    .then(|| std::time::Duration::from_secs(flush_interval_secs)),
                ..Default::default()
            };
            let reader = open_input(&file).await?;
            let report = IngestPipeline::new(&store, config)
                .run(reader)
                .await
                .context("Ingest stopped")?;
            print_ingest_summary(&report);

            let collections = known_collections(&store)
                .await
                .context("Failed to read known collections")?;
            write_collections(&mut stdout, &collections)?;
        }
        Command::Logs { collection } => {
            let id: CollectionId = collection
                .parse()
                .with_context(|| format!("Invalid collection id {collection:?}"))?;
            let lines = get_logs(&store, &id)
                .await
                .with_context(|| format!("Failed to read logs of collection {id}"))?;
            write_logs(&mut stdout, &lines)?;
        }
        Command::Resolve { ip } => {
            let location = find_city_by_ip(&store, IpQuery::from_input(&ip))
                .await
                .with_context(|| format!("Failed to resolve {ip}"))?;
            write_location(&mut stdout, &ip, location.as_ref())?;
        }
        Command::Aggregate { ip_field } => {
            let report = aggregate_locations(&store, &AggregateConfig { ip_field })
                .await
                .context("Aggregation stopped")?;
            print_aggregate_summary(&report);
        }
        Command::Collections => {
            let collections = known_collections(&store)
                .await
                .context("Failed to read known collections")?;
            write_collections(&mut stdout, &collections)?;
        }
    }

    stdout.flush()?;
    store.pool().close().await;
    Ok(())
}
