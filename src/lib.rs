//! Precipitation Processor Library
//!
//! Validates directories of precipitation data files and derives yearly
//! statistics from the files that pass.
//!
//! This library provides tools for:
//! - Checking the fixed two-line header of every data file
//! - Parsing body lines of 31 daily values, skipping malformed lines
//! - Merging per-file results into per-year buckets in any order
//! - Computing totals, averages, variation and wettest/driest years
//! - Emitting console, text and tabular reports

pub mod aggregate;
pub mod cli;
pub mod config;
pub mod constants;
pub mod error;
pub mod header;
pub mod models;
pub mod parser;
pub mod processor;
pub mod report;
pub mod stats;

// Re-export commonly used types
pub use aggregate::{YearAggregator, YearBucket, YearMap};
pub use config::ProcessorConfig;
pub use error::{HeaderError, LineIssue, PrecipError, RejectReason, Result};
pub use header::HeaderValidator;
pub use models::{FileOutcome, FileStatus, Granularity, Line2Rule, ScanReport};
pub use parser::RecordParser;
pub use processor::PrecipProcessor;
pub use report::{ConsoleReport, ReportCollector, TableExport, TextReport};
pub use stats::{Statistics, StatisticsCalculator, Variation};
