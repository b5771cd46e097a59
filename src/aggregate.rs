//! Geo aggregation.
//!
//! Walks every stored line of every known collection, resolves the client
//! address of each line to a city, and bumps three counters per resolved line:
//! the collection's per-location count, the global per-country count, and the
//! collection's per-country count. The three increments are independent.
//!
//! Running the aggregation twice counts every line twice.

use std::time::Instant;

use log::{debug, info};

use crate::config::AggregateConfig;
use crate::error_handling::{LookupError, ParseError, SkipReason, SkipStats, StoreError};
use crate::geoip::{find_city_by_ip, CityLocation, LocationKey};
use crate::models::CollectionId;
use crate::retrieval::{get_logs, known_collections};
use crate::storage::keys::{collection_country_counts, location_counts, COUNTRY_COUNTS};
use crate::storage::Store;

/// Summary of an aggregation run.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateReport {
    pub collections: usize,
    pub lines: usize,
    pub resolved: usize,
    pub skipped: usize,
}

/// Pulls the client address out of a stored log line.
///
/// The address sits at `ip_field` (zero-based, whitespace split); a trailing
/// comma left by proxy-prepended `X-Forwarded-For` lists is dropped.
pub fn extract_ip(line: &str, ip_field: usize) -> Result<&str, ParseError> {
    line.split_whitespace()
        .nth(ip_field)
        .map(|token| token.trim_end_matches(','))
        .filter(|token| !token.is_empty())
        .ok_or(ParseError::MissingIp(ip_field))
}

async fn count_location<S: Store + ?Sized>(
    store: &S,
    collection: &CollectionId,
    location: &CityLocation,
) -> Result<(), StoreError> {
    let key = LocationKey::from(location).to_string();
    store
        .counter_increment_field(&location_counts(collection), &key, 1)
        .await?;
    store
        .counter_increment_field(COUNTRY_COUNTS, &location.country, 1)
        .await?;
    store
        .counter_increment_field(&collection_country_counts(collection), &location.country, 1)
        .await?;
    Ok(())
}

/// Aggregates the lines of one collection into `report`.
pub async fn aggregate_collection<S: Store + ?Sized>(
    store: &S,
    collection: &CollectionId,
    config: &AggregateConfig,
    report: &mut AggregateReport,
    skips: &SkipStats,
) -> Result<(), StoreError> {
    let lines = get_logs(store, collection).await?;
    debug!("Aggregating {} line(s) of collection {}", lines.len(), collection);

    for line in &lines {
        report.lines += 1;

        let resolved = match extract_ip(line, config.ip_field) {
            Ok(ip) => find_city_by_ip(store, ip).await,
            Err(e) => Err(e.into()),
        };
        match resolved {
            Ok(Some(location)) => {
                count_location(store, collection, &location).await?;
                report.resolved += 1;
            }
            Ok(None) => {
                skips.increment(SkipReason::LocationNotFound);
                report.skipped += 1;
            }
            Err(LookupError::Parse(e)) => {
                debug!("Skipping line of collection {}: {}", collection, e);
                skips.increment(e.skip_reason());
                report.skipped += 1;
            }
            Err(LookupError::Store(e)) => return Err(e),
        }
    }
    Ok(())
}

/// Aggregates every known collection.
///
/// Lines whose address is missing, malformed, or unresolvable are skipped. Store
/// failures abort the run; counters already incremented stay incremented.
pub async fn aggregate_locations<S: Store + ?Sized>(
    store: &S,
    config: &AggregateConfig,
) -> Result<AggregateReport, StoreError> {
    let start = Instant::now();
    let skips = SkipStats::new();
    let mut report = AggregateReport::default();

    for (collection, _hits) in known_collections(store).await? {
        report.collections += 1;
        aggregate_collection(store, &collection, config, &mut report, &skips).await?;
    }

    skips.log_summary("log lines during aggregation");
    info!(
        "Aggregated {} collection(s): {} of {} line(s) resolved in {:.1}s",
        report.collections,
        report.resolved,
        report.lines,
        start.elapsed().as_secs_f64()
    );
    Ok(report)
}
