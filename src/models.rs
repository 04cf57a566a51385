//! Core data structures and types for precipitation processing.
//!
//! Defines the header line 2 rule, aggregation granularity, parsed body
//! lines, per-file results and the final scan report.

use crate::aggregate::YearMap;
use crate::constants::MISSING_SENTINEL;
use crate::error::{LineIssue, RejectReason};
use crate::stats::Statistics;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

/// Rule applied to the second header line
///
/// Data sets in circulation disagree on this line: some end the model
/// identifier with `-1`, others start it with `P`. Neither is assumed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Line2Rule {
    /// Line must end with the given text
    EndsWith(String),
    /// Line must start with the given text
    StartsWith(String),
}

impl Line2Rule {
    /// Check a header line against the rule
    pub fn matches(&self, line: &str) -> bool {
        match self {
            Line2Rule::EndsWith(suffix) => line.ends_with(suffix.as_str()),
            Line2Rule::StartsWith(prefix) => line.starts_with(prefix.as_str()),
        }
    }

    /// Text the rule checks for
    pub fn pattern(&self) -> &str {
        match self {
            Line2Rule::EndsWith(s) | Line2Rule::StartsWith(s) => s,
        }
    }
}

impl fmt::Display for Line2Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Line2Rule::EndsWith(suffix) => write!(f, "ends with \"{}\"", suffix),
            Line2Rule::StartsWith(prefix) => write!(f, "starts with \"{}\"", prefix),
        }
    }
}

/// What a year bucket collects for every accepted body line
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Granularity {
    /// Each non-missing daily value
    Daily,
    /// One sum of the non-missing daily values per line (per month)
    MonthlySum,
}

impl Granularity {
    /// Unit an average refers to under this granularity
    pub fn average_unit(&self) -> &'static str {
        match self {
            Granularity::Daily => "day",
            Granularity::MonthlySum => "month",
        }
    }

    /// Human-readable description for reports
    pub fn description(&self) -> &'static str {
        match self {
            Granularity::Daily => "daily values (averages are per recorded day)",
            Granularity::MonthlySum => "monthly sums (averages are per recorded month)",
        }
    }
}

impl FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "daily" | "day" => Ok(Granularity::Daily),
            "monthly" | "monthly-sum" | "month" => Ok(Granularity::MonthlySum),
            other => Err(format!(
                "unknown granularity '{}', expected 'daily' or 'monthly'",
                other
            )),
        }
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Granularity::Daily => write!(f, "daily"),
            Granularity::MonthlySum => write!(f, "monthly"),
        }
    }
}

/// One well-formed body line
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataLine {
    /// First token, carried but not used downstream
    pub tag: String,
    pub year: i32,
    /// Month token when it is an integer in 1..=12
    pub month: Option<u32>,
    /// One value per calendar day, sentinel for missing
    pub daily_values: Vec<f64>,
}

impl DataLine {
    /// Number of sentinel values on the line
    pub fn missing_count(&self) -> usize {
        self.daily_values
            .iter()
            .filter(|v| is_missing(**v))
            .count()
    }

    /// Non-sentinel values in day order
    pub fn valid_values(&self) -> impl Iterator<Item = f64> + '_ {
        self.daily_values.iter().copied().filter(|v| !is_missing(*v))
    }

    /// Sum of the non-sentinel values
    pub fn valid_sum(&self) -> f64 {
        self.valid_values().sum()
    }
}

/// Check whether a value is the missing-data sentinel
pub fn is_missing(value: f64) -> bool {
    value == MISSING_SENTINEL
}

/// Body-line diagnostic with its 1-based file line number
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LineDiagnostic {
    pub line_number: usize,
    pub issue: LineIssue,
}

impl fmt::Display for LineDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line_number, self.issue)
    }
}

/// Year whose accepted line count in one file differs from the expected count
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IncompleteYear {
    pub year: i32,
    pub lines: usize,
    pub expected: usize,
}

/// Result of parsing the body of one file
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FileParseResult {
    /// Daily values on accepted lines, sentinels included
    pub total_values: usize,
    /// Sentinel values on accepted lines
    pub missing_values: usize,
    /// Accepted body lines
    pub lines_accepted: usize,
    /// Skipped body lines, in file order
    pub diagnostics: Vec<LineDiagnostic>,
    /// Per-year accumulation of this file; emptied once merged into a scan
    pub year_map: YearMap,
    /// Years with an unexpected number of lines
    pub incomplete_years: Vec<IncompleteYear>,
}

impl FileParseResult {
    /// Percentage of missing values, 0 when nothing was read
    pub fn missing_percentage(&self) -> f64 {
        percentage(self.missing_values, self.total_values)
    }
}

/// Classification of a scanned file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub enum FileStatus {
    Accepted(FileParseResult),
    Rejected(RejectReason),
}

/// Outcome of processing one file
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FileOutcome {
    pub path: PathBuf,
    pub status: FileStatus,
}

impl FileOutcome {
    pub fn accepted(path: PathBuf, result: FileParseResult) -> Self {
        Self {
            path,
            status: FileStatus::Accepted(result),
        }
    }

    pub fn rejected(path: PathBuf, reason: RejectReason) -> Self {
        Self {
            path,
            status: FileStatus::Rejected(reason),
        }
    }

    /// File name used in listings
    pub fn file_name(&self) -> String {
        display_name(&self.path)
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self.status, FileStatus::Accepted(_))
    }

    /// Parse result for accepted files
    pub fn parse_result(&self) -> Option<&FileParseResult> {
        match &self.status {
            FileStatus::Accepted(result) => Some(result),
            FileStatus::Rejected(_) => None,
        }
    }

    /// Rejection reason for rejected files
    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match &self.status {
            FileStatus::Accepted(_) => None,
            FileStatus::Rejected(reason) => Some(reason),
        }
    }
}

/// Complete result of a directory scan, handed to report collectors
#[derive(Debug, Clone, Serialize)]
pub struct ScanReport {
    pub directory: PathBuf,
    pub line2_rule: Line2Rule,
    pub granularity: Granularity,
    /// Every scanned file, in natural file name order
    pub files: Vec<FileOutcome>,
    /// Merged per-year data of all accepted files
    pub year_map: YearMap,
    pub statistics: Statistics,
    pub processing_time_ms: u128,
}

impl ScanReport {
    pub fn accepted_files(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| f.is_accepted())
    }

    pub fn rejected_files(&self) -> impl Iterator<Item = &FileOutcome> {
        self.files.iter().filter(|f| !f.is_accepted())
    }

    pub fn accepted_count(&self) -> usize {
        self.accepted_files().count()
    }

    pub fn rejected_count(&self) -> usize {
        self.rejected_files().count()
    }

    /// Daily values read across accepted files, sentinels included
    pub fn total_values(&self) -> usize {
        self.parse_results().map(|r| r.total_values).sum()
    }

    pub fn missing_values(&self) -> usize {
        self.parse_results().map(|r| r.missing_values).sum()
    }

    pub fn lines_processed(&self) -> usize {
        self.parse_results().map(|r| r.lines_accepted).sum()
    }

    pub fn lines_skipped(&self) -> usize {
        self.parse_results().map(|r| r.diagnostics.len()).sum()
    }

    pub fn missing_percentage(&self) -> f64 {
        percentage(self.missing_values(), self.total_values())
    }

    fn parse_results(&self) -> impl Iterator<Item = &FileParseResult> {
        self.files.iter().filter_map(|f| f.parse_result())
    }
}

/// `part / whole * 100`, 0 when `whole` is 0
pub fn percentage(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        (part as f64 / whole as f64) * 100.0
    }
}

/// File name of a path, falling back to the full path
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}
