//! Shared data types for the ingest and retrieval pipelines.

use std::fmt;
use std::str::FromStr;

use crate::error_handling::ParseError;

/// Identifier of a tracked log source: a non-empty run of ASCII digits.
///
/// Kept as text so leading zeros survive the round trip through key names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionId(String);

impl CollectionId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CollectionId {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ParseError::MissingCollectionId);
        }
        Ok(CollectionId(s.to_string()))
    }
}

impl fmt::Display for CollectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A parsed log line ready to be staged.
#[derive(Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub collection: CollectionId,
    /// Seconds since the Unix epoch (UTC)
    pub timestamp: f64,
    /// The trimmed line exactly as it is stored
    pub line: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collection_id_parse() {
        let id: CollectionId = "0042".parse().unwrap();
        assert_eq!(id.as_str(), "0042");
        assert_eq!(id.to_string(), "0042");
        assert_eq!(" 7 ".parse::<CollectionId>().unwrap().as_str(), "7");
    }

    #[test]
    fn test_collection_id_rejects_non_digits() {
        for bad in ["", "abc", "12a", "-1", "1.0", "+3"] {
            assert_eq!(
                bad.parse::<CollectionId>(),
                Err(ParseError::MissingCollectionId),
                "{bad:?} should be rejected"
            );
        }
    }
}
