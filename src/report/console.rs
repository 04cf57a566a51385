//! Colored terminal summary of a scan

use super::{ReportCollector, describe_outcome, format_amount};
use crate::error::Result;
use crate::models::ScanReport;
use colored::*;

/// Prints the scan summary to stdout
#[derive(Debug, Clone)]
pub struct ConsoleReport {
    show_files: bool,
}

impl ConsoleReport {
    pub fn new() -> Self {
        Self { show_files: true }
    }

    /// Omit the per-file listing, keep the totals
    pub fn without_file_listing(mut self) -> Self {
        self.show_files = false;
        self
    }

    /// Build the summary text
    pub fn render(&self, report: &ScanReport) -> String {
        let mut lines = Vec::new();

        lines.push(format!("{}", "Precipitation Scan Summary".bright_green().bold()));
        lines.push(format!(
            "  {} {}",
            "Directory:".bright_cyan(),
            report.directory.display()
        ));
        lines.push(format!("  {} {}", "Header line 2:".bright_cyan(), report.line2_rule));
        lines.push(format!(
            "  {} {}",
            "Granularity:".bright_cyan(),
            report.granularity.description()
        ));

        lines.push(String::new());
        lines.push(format!(
            "  {} {}",
            "Good files:".bright_cyan(),
            report.accepted_count().to_string().bright_green().bold()
        ));
        if self.show_files {
            for outcome in report.accepted_files() {
                lines.push(format!(
                    "    {} {}",
                    outcome.file_name().green(),
                    describe_outcome(outcome).dimmed()
                ));
            }
        }

        let bad_count = report.rejected_count();
        let bad_count_text = if bad_count > 0 {
            bad_count.to_string().bright_red().bold()
        } else {
            bad_count.to_string().bright_white().bold()
        };
        lines.push(format!("  {} {}", "Bad files:".bright_cyan(), bad_count_text));
        if self.show_files {
            for outcome in report.rejected_files() {
                lines.push(format!(
                    "    {} {}",
                    outcome.file_name().red(),
                    describe_outcome(outcome)
                ));
            }
        }

        lines.push(String::new());
        lines.push(format!(
            "  {} {}",
            "Lines processed:".bright_cyan(),
            report.lines_processed().to_string().bright_white().bold()
        ));
        lines.push(format!(
            "  {} {}",
            "Lines skipped:".bright_cyan(),
            report.lines_skipped().to_string().bright_yellow()
        ));
        lines.push(format!(
            "  {} {}",
            "Values read:".bright_cyan(),
            report.total_values().to_string().bright_white().bold()
        ));
        lines.push(format!(
            "  {} {} ({:.2}%)",
            "Missing values:".bright_cyan(),
            report.missing_values().to_string().bright_yellow(),
            report.missing_percentage()
        ));

        let stats = &report.statistics;
        if stats.is_empty() {
            lines.push(String::new());
            lines.push(format!("{}", "No precipitation data aggregated".bright_yellow()));
        } else {
            lines.push(String::new());
            lines.push(format!("{}", "Yearly precipitation".bright_green().bold()));
            lines.push(format!(
                "  {:<6} {:>16} {:>16} {:>12}",
                "Year",
                "Total",
                format!("Avg/{}", report.granularity.average_unit()),
                "Variation"
            ));
            for year in &stats.years {
                let average = year
                    .average
                    .map(|a| format!("{:.2}", a))
                    .unwrap_or_else(|| "-".to_string());
                let variation = year
                    .variation
                    .map(|v| v.to_string())
                    .unwrap_or_else(|| "-".to_string());
                lines.push(format!(
                    "  {:<6} {:>16.2} {:>16} {:>12}",
                    year.year, year.total, average, variation
                ));
            }

            lines.push(String::new());
            if let Some(wettest) = stats.wettest_year {
                lines.push(format!(
                    "  {} {} ({})",
                    "Wettest year:".bright_cyan(),
                    wettest.year.to_string().bright_white().bold(),
                    format_amount(wettest.total)
                ));
            }
            if let Some(driest) = stats.driest_year {
                lines.push(format!(
                    "  {} {} ({})",
                    "Driest year:".bright_cyan(),
                    driest.year.to_string().bright_white().bold(),
                    format_amount(driest.total)
                ));
            }
            lines.push(format!(
                "  {} {}",
                "Total precipitation:".bright_cyan(),
                format_amount(stats.grand_total).bright_white().bold()
            ));
        }

        lines.push(format!(
            "  {} {:.2}s",
            "Processing time:".bright_cyan(),
            report.processing_time_ms as f64 / 1000.0
        ));

        lines.join("\n")
    }
}

impl Default for ConsoleReport {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportCollector for ConsoleReport {
    fn name(&self) -> &str {
        "console"
    }

    fn collect(&mut self, report: &ScanReport) -> Result<()> {
        println!("\n{}", self.render(report));
        Ok(())
    }
}
