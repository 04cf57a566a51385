//! Timestamped review log and results file.
//!
//! Each run writes two files into the output directory:
//! `review_<timestamp>.log` with the per-file header verdicts and skipped
//! lines, and `results_<timestamp>.txt` with counts and statistics.

use super::{ReportCollector, describe_outcome, format_amount};
use crate::constants::{
    LOG_FILE_PREFIX, REPORT_DATETIME_FORMAT, REPORT_TIMESTAMP_FORMAT, RESULTS_FILE_PREFIX,
};
use crate::error::{PrecipError, Result};
use crate::models::{FileStatus, ScanReport};
use chrono::{Local, NaiveDateTime};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes the review log and the results file
#[derive(Debug, Clone)]
pub struct TextReport {
    output_dir: PathBuf,
    timestamp: NaiveDateTime,
}

impl TextReport {
    /// Report stamped with the current local time
    pub fn new(output_dir: PathBuf) -> Self {
        Self::at(output_dir, Local::now().naive_local())
    }

    /// Report stamped with a fixed time
    pub fn at(output_dir: PathBuf, timestamp: NaiveDateTime) -> Self {
        Self {
            output_dir,
            timestamp,
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.log",
            LOG_FILE_PREFIX,
            self.timestamp.format(REPORT_TIMESTAMP_FORMAT)
        ))
    }

    pub fn results_path(&self) -> PathBuf {
        self.output_dir.join(format!(
            "{}_{}.txt",
            RESULTS_FILE_PREFIX,
            self.timestamp.format(REPORT_TIMESTAMP_FORMAT)
        ))
    }

    /// Per-file review: header verdict, skipped lines, incomplete years
    pub fn render_log(&self, report: &ScanReport) -> String {
        let mut lines = vec![
            "File review".to_string(),
            format!("Date and time: {}", self.timestamp.format(REPORT_DATETIME_FORMAT)),
            format!("Directory: {}", report.directory.display()),
            format!("Header line 2 rule: {}", report.line2_rule),
            String::new(),
        ];

        for outcome in &report.files {
            let path = outcome.path.display();
            lines.push(format!("Checking file: {}", path));
            match &outcome.status {
                FileStatus::Accepted(result) => {
                    lines.push(format!("{}: header ok", path));
                    for diagnostic in &result.diagnostics {
                        lines.push(format!("{}: {}", path, diagnostic));
                    }
                    for incomplete in &result.incomplete_years {
                        lines.push(format!(
                            "{}: year {} has {} lines (expected {})",
                            path, incomplete.year, incomplete.lines, incomplete.expected
                        ));
                    }
                }
                FileStatus::Rejected(reason) => {
                    lines.push(format!("{}: header rejected, {}", path, reason));
                }
            }
        }

        lines.join("\n") + "\n"
    }

    /// Counts, file listings and statistics
    pub fn render_results(&self, report: &ScanReport) -> String {
        let stats = &report.statistics;
        let mut lines = vec![
            "Precipitation results".to_string(),
            format!("Date and time: {}", self.timestamp.format(REPORT_DATETIME_FORMAT)),
            format!("Aggregation: {}", report.granularity.description()),
            String::new(),
            format!("Good files: {}", report.accepted_count()),
        ];
        for outcome in report.accepted_files() {
            lines.push(format!("  {}: {}", outcome.file_name(), describe_outcome(outcome)));
        }

        lines.push(format!("Bad files: {}", report.rejected_count()));
        for outcome in report.rejected_files() {
            lines.push(format!("  {}: {}", outcome.file_name(), describe_outcome(outcome)));
        }

        lines.push(String::new());
        lines.push(format!("Files processed: {}", report.files.len()));
        lines.push(format!("Lines processed: {}", report.lines_processed()));
        lines.push(format!("Lines skipped: {}", report.lines_skipped()));
        lines.push(format!("Values processed: {}", report.total_values()));
        lines.push(format!("Missing values (-999): {}", report.missing_values()));
        lines.push(format!("Missing percentage: {:.2}%", report.missing_percentage()));

        if let (Some(wettest), Some(driest)) = (stats.wettest_year, stats.driest_year) {
            lines.push(String::new());
            lines.push(format!("Total precipitation: {}", format_amount(stats.grand_total)));
            lines.push(format!(
                "Wettest year: {} ({})",
                wettest.year,
                format_amount(wettest.total)
            ));
            lines.push(format!(
                "Driest year: {} ({})",
                driest.year,
                format_amount(driest.total)
            ));

            lines.push(String::new());
            lines.push("Yearly total:".to_string());
            for year in &stats.years {
                lines.push(format!("{}: {}", year.year, format_amount(year.total)));
            }

            lines.push(String::new());
            lines.push(format!(
                "Yearly average (per {}):",
                report.granularity.average_unit()
            ));
            for year in &stats.years {
                if let Some(average) = year.average {
                    lines.push(format!("{}: {}", year.year, format_amount(average)));
                }
            }

            lines.push(String::new());
            lines.push("Yearly variation:".to_string());
            for year in &stats.years {
                if let Some(variation) = year.variation {
                    lines.push(format!("{}: {}", year.year, variation));
                }
            }
        }

        lines.join("\n") + "\n"
    }

    fn write(&self, path: &Path, content: &str) -> Result<()> {
        fs::write(path, content).map_err(|e| PrecipError::ReportFailed {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }
}

impl ReportCollector for TextReport {
    fn name(&self) -> &str {
        "text"
    }

    fn collect(&mut self, report: &ScanReport) -> Result<()> {
        fs::create_dir_all(&self.output_dir).map_err(|e| PrecipError::ReportFailed {
            path: self.output_dir.clone(),
            reason: e.to_string(),
        })?;

        let log_path = self.log_path();
        self.write(&log_path, &self.render_log(report))?;

        let results_path = self.results_path();
        self.write(&results_path, &self.render_results(report))?;

        info!(
            "Reports written to {} and {}",
            log_path.display(),
            results_path.display()
        );
        Ok(())
    }
}
