// Shared test helpers for store setup and test data creation.
//
// This module provides common utilities used across multiple test files to reduce duplication.

use std::io::Write;
use std::path::PathBuf;

use tempfile::TempDir;

use loggeo::SqliteStore;

/// Creates an in-memory SQLite store with the schema applied.
#[allow(dead_code)] // Used by other test files
pub async fn create_test_store() -> SqliteStore {
    SqliteStore::in_memory()
        .await
        .expect("Failed to create test store")
}

/// Writes `contents` to `name` inside `dir` and returns the path.
#[allow(dead_code)]
pub fn write_file(dir: &TempDir, name: &str, contents: &[u8]) -> PathBuf {
    let path = dir.path().join(name);
    let mut file = std::fs::File::create(&path).expect("Failed to create test file");
    file.write_all(contents).expect("Failed to write test file");
    path
}

/// GeoLite-style blocks file: a copyright line, a header, then three ranges.
#[allow(dead_code)]
pub const BLOCKS_CSV: &str = "\
Copyright (c) 2012 MaxMind LLC.  All Rights Reserved.
startIpNum,endIpNum,locId
\"16777216\",\"16777471\",\"17\"
\"16777472\",\"16777727\",\"49\"
\"16778240\",\"16779263\",\"17\"
";

/// Locations file matching [`BLOCKS_CSV`]. The Zürich row is Latin-1 encoded.
#[allow(dead_code)]
pub fn cities_csv() -> Vec<u8> {
    let mut csv = b"Copyright (c) 2012 MaxMind LLC.  All Rights Reserved.\n\
locId,country,region,city,postalCode,latitude,longitude,metroCode,areaCode\n\
17,\"AU\",\"07\",\"Melbourne\",\"\",-37.8139,144.9634,,\n\
49,\"SG\",\"00\",\"Singapore\",\"\",1.2931,103.8558,,\n"
        .to_vec();
    csv.extend_from_slice(b"50,\"CH\",\"25\",\"Z\xfcrich\",\"\",47.3667,8.5500,,\n");
    csv
}

/// An access log line with the client address in field 1 and the date in field 4.
#[allow(dead_code)]
pub fn access_line(client: &str, date: &str, path: &str, collection: &str) -> String {
    format!(r#"10.0.0.1 {client} - - [{date} -0800] "GET {path} HTTP/1.1" 200 512 {collection}"#)
}
