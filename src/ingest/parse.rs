//! Log line parsing.
//!
//! A line is accepted when its final whitespace-delimited token is a numeric
//! collection id and the token at the configured offset (splitting on single
//! spaces) is an Apache-style `[dd/Mon/yyyy:HH:MM:SS` date.

use chrono::NaiveDateTime;

use crate::config::LOG_DATE_FORMAT;
use crate::error_handling::ParseError;
use crate::models::{CollectionId, LogEntry};

/// Converts a bracketed Apache date token into epoch seconds.
///
/// The timezone offset is a separate token and is not consulted; the time is
/// taken as UTC so that every ingest host scores a line identically.
pub fn parse_log_date(token: &str) -> Result<f64, ParseError> {
    NaiveDateTime::parse_from_str(token, LOG_DATE_FORMAT)
        .map(|dt| dt.and_utc().timestamp() as f64)
        .map_err(|_| ParseError::InvalidDate(token.to_string()))
}

/// Parses one raw input line.
pub fn parse_log_line(line: &str, date_field: usize) -> Result<LogEntry, ParseError> {
    let line = line.trim();
    if line.is_empty() {
        return Err(ParseError::EmptyLine);
    }

    let collection: CollectionId = line
        .split_whitespace()
        .last()
        .ok_or(ParseError::MissingCollectionId)?
        .parse()?;

    let date = line
        .split(' ')
        .nth(date_field)
        .ok_or(ParseError::MissingDate(date_field))?;
    let timestamp = parse_log_date(date)?;

    Ok(LogEntry {
        collection,
        timestamp,
        line: line.to_string(),
    })
}
