//! End-to-end tests: CSV imports, ingest, retrieval, and aggregation against SQLite.

mod helpers;

use loggeo::config::{AggregateConfig, ImportConfig, IngestConfig};
use loggeo::geoip::{import_blocks_csv, import_cities_csv};
use loggeo::{
    aggregate_locations, find_city_by_ip, get_logs, known_collections, CityLocation,
    CollectionId, IngestPipeline, SqliteStore, Store,
};
use tempfile::TempDir;

use helpers::{access_line, cities_csv, create_test_store, write_file, BLOCKS_CSV};

fn location(city: &str, region: &str, country: &str) -> Option<CityLocation> {
    Some(CityLocation {
        city: city.into(),
        region: region.into(),
        country: country.into(),
    })
}

fn id(s: &str) -> CollectionId {
    s.parse().expect("valid collection id")
}

async fn seeded_store(dir: &TempDir) -> SqliteStore {
    let store = create_test_store().await;
    let blocks = write_file(dir, "blocks.csv", BLOCKS_CSV.as_bytes());
    let cities = write_file(dir, "cities.csv", &cities_csv());
    let config = ImportConfig { chunk_size: 2 };

    let summary = import_blocks_csv(&store, &blocks, &config)
        .await
        .expect("blocks import");
    assert_eq!((summary.rows, summary.imported, summary.skipped), (5, 3, 2));

    let summary = import_cities_csv(&store, &cities, &config)
        .await
        .expect("cities import");
    assert_eq!((summary.rows, summary.imported, summary.skipped), (5, 3, 2));
    store
}

#[tokio::test]
async fn test_resolve_after_csv_import() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir).await;

    assert_eq!(
        find_city_by_ip(&store, "1.0.0.1").await.unwrap(),
        location("Melbourne", "07", "AU")
    );
    assert_eq!(
        find_city_by_ip(&store, "1.0.1.200").await.unwrap(),
        location("Singapore", "00", "SG")
    );
    // Two disjoint ranges map to the same city
    assert_eq!(
        find_city_by_ip(&store, "1.0.4.10").await.unwrap(),
        location("Melbourne", "07", "AU")
    );
    // Past the end of 1.0.1.0/24 but below the next range: nearest range below
    assert_eq!(
        find_city_by_ip(&store, "1.0.2.1").await.unwrap(),
        location("Singapore", "00", "SG")
    );
    assert_eq!(find_city_by_ip(&store, "0.255.255.255").await.unwrap(), None);
}

#[tokio::test]
async fn test_latin1_city_names_survive_import() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir).await;

    let stored = store.hash_get("geo:cities", "50").await.unwrap();
    let parsed: Vec<String> = serde_json::from_str(&stored.expect("city 50 stored")).unwrap();
    assert_eq!(parsed, vec!["Zürich", "25", "CH"]);
}

#[tokio::test]
async fn test_import_is_idempotent() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir).await;
    let blocks = write_file(&dir, "blocks.csv", BLOCKS_CSV.as_bytes());

    import_blocks_csv(&store, &blocks, &ImportConfig::default())
        .await
        .unwrap();
    assert_eq!(store.ordered_range_all("geo:index").await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_missing_csv_file_is_an_error() {
    let store = create_test_store().await;
    let result = import_blocks_csv(
        &store,
        std::path::Path::new("/nonexistent/blocks.csv"),
        &ImportConfig::default(),
    )
    .await;
    assert!(result.is_err());
}

#[tokio::test]
async fn test_ingest_retrieve_and_aggregate() {
    let dir = TempDir::new().unwrap();
    let store = seeded_store(&dir).await;

    // Arrival order differs from timestamp order, as with several web servers
    let lines = [
        access_line("1.0.1.5", "01/Jan/2013:00:00:09", "/c", "42"),
        access_line("1.0.0.7", "01/Jan/2013:00:00:01", "/a", "42"),
        access_line("1.0.4.3", "01/Jan/2013:00:00:05", "/b", "42"),
        access_line("1.0.1.9", "02/Jan/2013:10:00:00", "/", "7"),
        "garbage without a collection".to_string(),
        access_line("not-an-ip", "03/Jan/2013:10:00:00", "/", "7"),
    ];
    let input = lines.join("\n") + "\n";

    let config = IngestConfig {
        batch_size: 2,
        ..Default::default()
    };
    let report = IngestPipeline::new(&store, config)
        .run(input.as_bytes())
        .await
        .expect("ingest");
    assert_eq!(report.lines_read, 6);
    assert_eq!(report.lines_staged, 5);
    assert_eq!(report.lines_skipped, 1);
    assert_eq!(report.flushes, 3);

    assert_eq!(
        get_logs(&store, &id("42")).await.unwrap(),
        vec![lines[1].clone(), lines[2].clone(), lines[0].clone()]
    );
    assert!(get_logs(&store, &id("999")).await.unwrap().is_empty());
    assert_eq!(
        known_collections(&store).await.unwrap(),
        vec![(id("42"), 3), (id("7"), 2)]
    );

    let report = aggregate_locations(&store, &AggregateConfig::default())
        .await
        .expect("aggregate");
    assert_eq!(report.collections, 2);
    assert_eq!(report.lines, 5);
    assert_eq!(report.resolved, 4);
    assert_eq!(report.skipped, 1);

    let locations = store.hash_get_all("locations:42").await.unwrap();
    assert_eq!(locations.get("AU-07-Melbourne").map(String::as_str), Some("2"));
    assert_eq!(locations.get("SG-00-Singapore").map(String::as_str), Some("1"));

    let countries = store.hash_get_all("countries").await.unwrap();
    assert_eq!(countries.get("AU").map(String::as_str), Some("2"));
    assert_eq!(countries.get("SG").map(String::as_str), Some("2"));

    let per_collection = store.hash_get_all("countries:7").await.unwrap();
    assert_eq!(per_collection.len(), 1);
    assert_eq!(per_collection.get("SG").map(String::as_str), Some("1"));
}

#[tokio::test]
async fn test_ingested_logs_persist_across_reopen() {
    let dir = TempDir::new().unwrap();
    let db_path = dir.path().join("loggeo.db");
    let line = access_line("1.0.0.1", "01/Jan/2013:00:00:00", "/", "42");

    {
        let store = SqliteStore::open(&db_path).await.unwrap();
        let config = IngestConfig {
            batch_size: 1,
            ..Default::default()
        };
        IngestPipeline::new(&store, config)
            .run(line.as_bytes())
            .await
            .unwrap();
        store.pool().close().await;
    }

    let store = SqliteStore::open(&db_path).await.unwrap();
    assert_eq!(get_logs(&store, &id("42")).await.unwrap(), vec![line]);
    assert_eq!(
        store.hash_get("known", "hits:42").await.unwrap().as_deref(),
        Some("1")
    );
}
