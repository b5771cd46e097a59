//! GeoIP data structures.
//!
//! Composite keys are structured types inside the crate and only become strings
//! at the store boundary.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error_handling::ParseError;

/// Identifier of one IP range in the geo index.
///
/// A city can own several disjoint ranges, so the raw city id is paired with the
/// ordinal of the input row that defined the range. Serialized as
/// `<city_id>_<ordinal>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CityBlockId {
    pub city_id: u64,
    pub ordinal: u64,
}

impl fmt::Display for CityBlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.city_id, self.ordinal)
    }
}

impl FromStr for CityBlockId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let malformed = || ParseError::MalformedRow(format!("city block id {s:?}"));
        let (city, ordinal) = s.split_once('_').ok_or_else(malformed)?;
        Ok(CityBlockId {
            city_id: parse_digits(city).ok_or_else(malformed)?,
            ordinal: parse_digits(ordinal).ok_or_else(malformed)?,
        })
    }
}

/// Parses a non-empty run of ASCII digits.
pub(crate) fn parse_digits(s: &str) -> Option<u64> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

/// City metadata of one city id.
///
/// Stored as the JSON array `[city, region, country]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    from = "(String, String, String)",
    into = "(String, String, String)"
)]
pub struct CityLocation {
    pub city: String,
    pub region: String,
    pub country: String,
}

impl From<(String, String, String)> for CityLocation {
    fn from((city, region, country): (String, String, String)) -> Self {
        CityLocation {
            city,
            region,
            country,
        }
    }
}

impl From<CityLocation> for (String, String, String) {
    fn from(location: CityLocation) -> Self {
        (location.city, location.region, location.country)
    }
}

/// Location tally key, broad to specific. Serialized as `country-region-city`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct LocationKey {
    pub country: String,
    pub region: String,
    pub city: String,
}

impl From<&CityLocation> for LocationKey {
    fn from(location: &CityLocation) -> Self {
        LocationKey {
            country: location.country.clone(),
            region: location.region.clone(),
            city: location.city.clone(),
        }
    }
}

impl fmt::Display for LocationKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}-{}", self.country, self.region, self.city)
    }
}

/// Outcome of one geo import run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    /// Rows read, including skipped ones
    pub rows: usize,
    /// Rows written to the store
    pub imported: usize,
    /// Header, short, or malformed rows that were dropped
    pub skipped: usize,
}
