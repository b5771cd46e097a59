//! Geo index import.
//!
//! Builds the two structures the resolver reads:
//! - `geo:index`: IP range start score -> [`CityBlockId`]
//! - `geo:cities`: city id -> [`CityLocation`]
//!
//! Both imports are best effort. A header, short, or malformed row is counted and
//! dropped; only store failures abort. Re-running an import over the same input
//! rewrites the same entries.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};

use crate::config::ImportConfig;
use crate::error_handling::{ParseError, SkipStats, StoreError};
use crate::storage::keys::{CITY_METADATA, GEO_INDEX};
use crate::storage::{Store, WriteOp};

use super::score::{ip_to_score, IpScore};
use super::types::{parse_digits, CityBlockId, CityLocation, ImportSummary};

/// Parses one row of the blocks file (`start, end, city_id, ...`).
///
/// `ordinal` is the row's position in the whole input, skipped rows included, so
/// the resulting [`CityBlockId`] is unique across the file.
pub fn parse_block_row(row: &[String], ordinal: u64) -> Result<(IpScore, CityBlockId), ParseError> {
    let start = row.first().map(|s| s.trim()).unwrap_or("");
    if start.is_empty() {
        return Err(ParseError::MalformedRow("missing start address".into()));
    }
    // Header ("startIpNum") and copyright lines
    if start.to_ascii_lowercase().contains('i') {
        return Err(ParseError::MalformedRow(format!("header row {start:?}")));
    }

    let score = if start.contains('.') {
        ip_to_score(start)?
    } else {
        parse_digits(start)
            .and_then(|n| IpScore::try_from(n).ok())
            .ok_or_else(|| ParseError::MalformedRow(format!("start address {start:?}")))?
    };

    let city = row.get(2).map(|s| s.trim()).unwrap_or("");
    let city_id = parse_digits(city)
        .ok_or_else(|| ParseError::MalformedRow(format!("city id {city:?}")))?;

    Ok((score, CityBlockId { city_id, ordinal }))
}

/// Parses one row of the locations file (`city_id, country, region, city, ...`).
///
/// Text fields are decoded as Latin-1: every byte maps to one character, so
/// legacy city names never fail to decode.
pub fn parse_city_row(row: &[Vec<u8>]) -> Result<(u64, CityLocation), ParseError> {
    if row.len() < 4 {
        return Err(ParseError::MalformedRow(format!(
            "expected at least 4 columns, found {}",
            row.len()
        )));
    }
    let id_field = decode_latin1(&row[0]);
    let city_id = parse_digits(id_field.trim())
        .ok_or_else(|| ParseError::MalformedRow(format!("city id {id_field:?}")))?;

    Ok((
        city_id,
        CityLocation {
            country: decode_latin1(&row[1]),
            region: decode_latin1(&row[2]),
            city: decode_latin1(&row[3]),
        },
    ))
}

fn decode_latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

/// Writes staged operations once `chunk_size` of them have accumulated.
struct ChunkWriter<'a, S: Store + ?Sized> {
    store: &'a S,
    chunk_size: usize,
    ops: Vec<WriteOp>,
}

impl<'a, S: Store + ?Sized> ChunkWriter<'a, S> {
    fn new(store: &'a S, config: &ImportConfig) -> Self {
        let chunk_size = config.chunk_size.max(1);
        ChunkWriter {
            store,
            chunk_size,
            ops: Vec::with_capacity(chunk_size),
        }
    }

    async fn push(&mut self, op: WriteOp) -> Result<(), StoreError> {
        self.ops.push(op);
        if self.ops.len() >= self.chunk_size {
            self.flush().await?;
        }
        Ok(())
    }

    async fn flush(&mut self) -> Result<(), StoreError> {
        if self.ops.is_empty() {
            return Ok(());
        }
        self.store.execute_atomic(&self.ops).await?;
        debug!("Wrote import chunk of {} row(s)", self.ops.len());
        self.ops.clear();
        Ok(())
    }
}

/// Imports IP block rows into the geo index.
///
/// A row's ordinal is its position in `rows`, skipped rows included.
pub async fn import_blocks<S, I>(
    store: &S,
    rows: I,
    config: &ImportConfig,
) -> Result<ImportSummary, StoreError>
where
    S: Store + ?Sized,
    I: IntoIterator<Item = Vec<String>>,
{
    let mut writer = ChunkWriter::new(store, config);
    let skips = SkipStats::new();
    let mut summary = ImportSummary::default();

    for (ordinal, row) in rows.into_iter().enumerate() {
        summary.rows += 1;
        match parse_block_row(&row, ordinal as u64) {
            Ok((score, block)) => {
                writer
                    .push(WriteOp::ordered_insert(
                        GEO_INDEX,
                        f64::from(score),
                        block.to_string(),
                    ))
                    .await?;
                summary.imported += 1;
            }
            Err(e) => {
                debug!("Skipping block row {}: {}", ordinal, e);
                skips.increment(e.skip_reason());
                summary.skipped += 1;
            }
        }
    }
    writer.flush().await?;

    skips.log_summary("block rows");
    info!(
        "Imported {} IP block(s) from {} row(s), {} skipped",
        summary.imported, summary.rows, summary.skipped
    );
    Ok(summary)
}

/// Imports city rows into the city metadata table.
pub async fn import_cities<S, I>(
    store: &S,
    rows: I,
    config: &ImportConfig,
) -> Result<ImportSummary, StoreError>
where
    S: Store + ?Sized,
    I: IntoIterator<Item = Vec<Vec<u8>>>,
{
    let mut writer = ChunkWriter::new(store, config);
    let skips = SkipStats::new();
    let mut summary = ImportSummary::default();

    for (index, row) in rows.into_iter().enumerate() {
        summary.rows += 1;
        match parse_city_row(&row) {
            Ok((city_id, location)) => {
                let value = serde_json::json!([location.city, location.region, location.country])
                    .to_string();
                writer
                    .push(WriteOp::hash_set(CITY_METADATA, city_id.to_string(), value))
                    .await?;
                summary.imported += 1;
            }
            Err(e) => {
                debug!("Skipping city row {}: {}", index, e);
                skips.increment(e.skip_reason());
                summary.skipped += 1;
            }
        }
    }
    writer.flush().await?;

    skips.log_summary("city rows");
    info!(
        "Imported {} cit{} from {} row(s), {} skipped",
        summary.imported,
        if summary.imported == 1 { "y" } else { "ies" },
        summary.rows,
        summary.skipped
    );
    Ok(summary)
}

fn open_input(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(BufReader::new(file))
}

/// Splits one input line into raw CSV fields.
///
/// A blank line, or one the CSV parser rejects, becomes an empty row that is
/// skipped downstream but still takes an ordinal.
fn parse_csv_line(line: &[u8]) -> Vec<Vec<u8>> {
    let line = line.strip_suffix(b"\r").unwrap_or(line);
    if line.is_empty() {
        return Vec::new();
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(line);
    let mut record = csv::ByteRecord::new();
    match reader.read_byte_record(&mut record) {
        Ok(true) => record.iter().map(<[u8]>::to_vec).collect(),
        Ok(false) => Vec::new(),
        Err(e) => {
            debug!("Unparseable CSV record: {}", e);
            Vec::new()
        }
    }
}

/// Reads `input` line by line as raw byte fields, one row per line.
///
/// An I/O error ends the iteration and is stored in `read_error`.
fn byte_rows<'a, R: BufRead + 'a>(
    input: R,
    read_error: &'a mut Option<std::io::Error>,
) -> impl Iterator<Item = Vec<Vec<u8>>> + 'a {
    input.split(b'\n').map_while(move |line| match line {
        Ok(line) => Some(parse_csv_line(&line)),
        Err(e) => {
            *read_error = Some(e);
            None
        }
    })
}

/// Imports a GeoLite-style blocks CSV file.
pub async fn import_blocks_csv<S: Store + ?Sized>(
    store: &S,
    path: &Path,
    config: &ImportConfig,
) -> Result<ImportSummary> {
    let input = open_input(path)?;
    let mut read_error = None;
    let rows = byte_rows(input, &mut read_error).map(|row| {
        row.iter()
            .map(|field| String::from_utf8_lossy(field).into_owned())
            .collect::<Vec<String>>()
    });
    let summary = import_blocks(store, rows, config)
        .await
        .context("Failed to write IP blocks")?;

    if let Some(e) = read_error {
        return Err(e).with_context(|| format!("Failed to read {}", path.display()));
    }
    Ok(summary)
}

/// Imports a GeoLite-style locations CSV file.
pub async fn import_cities_csv<S: Store + ?Sized>(
    store: &S,
    path: &Path,
    config: &ImportConfig,
) -> Result<ImportSummary> {
    let input = open_input(path)?;
    let mut read_error = None;
    let rows = byte_rows(input, &mut read_error);
    let summary = import_cities(store, rows, config)
        .await
        .context("Failed to write city metadata")?;

    if let Some(e) = read_error {
        return Err(e).with_context(|| format!("Failed to read {}", path.display()));
    }
    Ok(summary)
}
