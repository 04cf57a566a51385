//! Report collectors for finished scans.
//!
//! A [`ScanReport`] is handed to any number of [`ReportCollector`]s: the
//! colored console summary, the timestamped text files and the per-year
//! table export.

pub mod console;
pub mod table;
pub mod text;

pub use console::ConsoleReport;
pub use table::TableExport;
pub use text::TextReport;

use crate::constants::PRECIP_UNIT;
use crate::error::Result;
use crate::models::{FileOutcome, FileStatus, ScanReport};

/// Consumer of a completed scan
pub trait ReportCollector {
    /// Short name used in log messages
    fn name(&self) -> &str;

    /// Emit the report
    fn collect(&mut self, report: &ScanReport) -> Result<()>;
}

/// Run every collector over the report, stopping at the first failure
pub fn collect_all(
    collectors: &mut [Box<dyn ReportCollector>],
    report: &ScanReport,
) -> Result<()> {
    for collector in collectors.iter_mut() {
        tracing::debug!("Running {} report", collector.name());
        collector.collect(report)?;
    }
    Ok(())
}

/// Precipitation amount with unit, two decimals
pub(crate) fn format_amount(value: f64) -> String {
    format!("{:.2} {}", value, PRECIP_UNIT)
}

/// One-line verdict for a scanned file
pub(crate) fn describe_outcome(outcome: &FileOutcome) -> String {
    match &outcome.status {
        FileStatus::Accepted(result) => format!(
            "{} lines, {} values, {} missing ({:.2}%)",
            result.lines_accepted,
            result.total_values,
            result.missing_values,
            result.missing_percentage()
        ),
        FileStatus::Rejected(reason) => reason.to_string(),
    }
}
