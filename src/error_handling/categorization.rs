//! Retry strategy for batch flushes.

use std::time::Duration;
use tokio_retry::strategy::ExponentialBackoff;

use crate::config::{IngestConfig, RETRY_FACTOR, RETRY_MAX_DELAY_SECS};

/// Creates the exponential backoff used when a batch flush fails.
///
/// The first delay is `config.retry_initial_delay_ms` and each later one is
/// [`RETRY_FACTOR`] times the previous, up to [`RETRY_MAX_DELAY_SECS`].
/// Yields at most `config.flush_retries` delays, so a flush is attempted
/// `1 + flush_retries` times in total. Retrying is safe because a failed
/// atomic batch applied none of its operations.
pub fn flush_retry_strategy(config: &IngestConfig) -> impl Iterator<Item = Duration> {
    // ExponentialBackoff yields factor * base^n for n = 1, 2, ...
    let scale = (config.retry_initial_delay_ms / RETRY_FACTOR).max(1);
    ExponentialBackoff::from_millis(RETRY_FACTOR)
        .factor(scale)
        .max_delay(Duration::from_secs(RETRY_MAX_DELAY_SECS))
        .take(config.flush_retries)
}
