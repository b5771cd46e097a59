//! User-facing command output.

use std::io::{self, Write};

use crate::geoip::CityLocation;
use crate::models::CollectionId;

/// Writes one stored log line per output line.
pub fn write_logs<W: Write>(out: &mut W, lines: &[String]) -> io::Result<()> {
    for line in lines {
        writeln!(out, "{line}")?;
    }
    Ok(())
}

/// Writes a `collection<TAB>hits` table.
pub fn write_collections<W: Write>(
    out: &mut W,
    collections: &[(CollectionId, i64)],
) -> io::Result<()> {
    if collections.is_empty() {
        return writeln!(out, "No known collections");
    }
    writeln!(out, "collection\thits")?;
    for (id, hits) in collections {
        writeln!(out, "{id}\t{hits}")?;
    }
    Ok(())
}

pub fn write_location<W: Write>(
    out: &mut W,
    query: &str,
    location: Option<&CityLocation>,
) -> io::Result<()> {
    match location {
        Some(loc) => writeln!(out, "{}, {}, {}", loc.city, loc.region, loc.country),
        None => writeln!(out, "No location found for {query}"),
    }
}
