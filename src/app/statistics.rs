//! Run summaries.
//!
//! Written through the `log` facade so they follow the plain or JSON format
//! chosen on the command line.

use log::info;

use crate::aggregate::AggregateReport;
use crate::geoip::ImportSummary;
use crate::ingest::IngestReport;

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

/// Logs the outcome of a geo import.
pub fn print_import_summary(what: &str, summary: &ImportSummary) {
    info!(
        "✅ Imported {} {} row{} ({} read, {} skipped)",
        summary.imported,
        what,
        plural(summary.imported),
        summary.rows,
        summary.skipped
    );
}

/// Logs the outcome of an ingest run.
pub fn print_ingest_summary(report: &IngestReport) {
    info!(
        "✅ Stored {} log line{} ({} read, {} skipped) in {} flush{} over {:.1}s",
        report.lines_staged,
        plural(report.lines_staged),
        report.lines_read,
        report.lines_skipped,
        report.flushes,
        if report.flushes == 1 { "" } else { "es" },
        report.elapsed_seconds
    );
}

/// Logs the outcome of an aggregation run.
pub fn print_aggregate_summary(report: &AggregateReport) {
    info!(
        "✅ Located {} of {} log line{} across {} collection{} ({} skipped)",
        report.resolved,
        report.lines,
        plural(report.lines),
        report.collections,
        plural(report.collections),
        report.skipped
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural() {
        assert_eq!(plural(0), "s");
        assert_eq!(plural(1), "");
        assert_eq!(plural(2), "s");
    }

    #[test]
    fn test_print_summaries_empty() {
        // Should not panic on empty runs
        print_import_summary("city", &ImportSummary::default());
        print_ingest_summary(&IngestReport::default());
        print_aggregate_summary(&AggregateReport::default());
    }
}
