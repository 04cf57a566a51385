//! Configuration management and validation.
//!
//! The two settings on which existing data sets disagree (the header line 2
//! rule and the aggregation granularity) have no default and must be chosen
//! by the caller.

use crate::constants::DEFAULT_LINES_PER_YEAR;
use crate::error::{PrecipError, Result};
use crate::models::{Granularity, Line2Rule};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Configuration for a directory scan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorConfig {
    /// Rule applied to header line 2
    pub line2_rule: Line2Rule,

    /// What each year bucket collects
    pub granularity: Granularity,

    /// Maximum files parsed concurrently (1 = sequential)
    pub max_concurrent_files: usize,

    /// Optional glob applied to file names
    pub file_pattern: Option<String>,

    /// Body lines expected per year in one file
    pub expected_lines_per_year: usize,

    /// Draw a progress bar while scanning
    pub show_progress: bool,
}

impl ProcessorConfig {
    /// Create a configuration with explicit header and granularity choices
    pub fn new(line2_rule: Line2Rule, granularity: Granularity) -> Self {
        Self {
            line2_rule,
            granularity,
            max_concurrent_files: num_cpus::get().max(1),
            file_pattern: None,
            expected_lines_per_year: DEFAULT_LINES_PER_YEAR,
            show_progress: true,
        }
    }

    /// Set maximum concurrent files
    pub fn with_max_concurrent_files(mut self, max_files: usize) -> Self {
        self.max_concurrent_files = max_files;
        self
    }

    /// Restrict the scan to file names matching a glob
    pub fn with_file_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.file_pattern = Some(pattern.into());
        self
    }

    /// Set the expected body lines per year
    pub fn with_expected_lines_per_year(mut self, lines: usize) -> Self {
        self.expected_lines_per_year = lines;
        self
    }

    /// Disable the progress bar
    pub fn without_progress(mut self) -> Self {
        self.show_progress = false;
        self
    }

    /// Check the configuration for values that cannot work
    pub fn validate(&self) -> Result<()> {
        if self.line2_rule.pattern().is_empty() {
            return Err(PrecipError::configuration(
                "header line 2 rule needs a non-empty suffix or prefix",
            ));
        }

        if self.max_concurrent_files == 0 {
            return Err(PrecipError::configuration(
                "max_concurrent_files must be at least 1",
            ));
        }

        if self.expected_lines_per_year == 0 {
            return Err(PrecipError::configuration(
                "expected_lines_per_year must be at least 1",
            ));
        }

        debug!(
            "Configuration valid: line 2 {}, granularity {}, {} workers",
            self.line2_rule, self.granularity, self.max_concurrent_files
        );
        Ok(())
    }
}
