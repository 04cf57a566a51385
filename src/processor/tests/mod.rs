//! Integration tests for the processor module
//!
//! Runs full directory scans over temporary data directories.

pub mod order_independence;

use crate::config::ProcessorConfig;
use crate::models::{Granularity, Line2Rule};
use std::fs;
use std::path::Path;

pub const LINE1: &str = "precip\tMIROC5\tRCP60\tREGRESION\tdecimas\t1";

/// Body line with the same value on all 31 days
pub fn body_line(year: i32, month: u32, value: f64) -> String {
    let values = vec![format!("{}", value); 31].join(" ");
    format!("P {} {:02} {}", year, month, values)
}

/// Body lines for every month of a year
pub fn full_year(year: i32, value: f64) -> Vec<String> {
    (1..=12).map(|month| body_line(year, month, value)).collect()
}

/// Write a data file with a valid header and the given body
pub fn write_data_file(dir: &Path, name: &str, body: &[String]) {
    let mut content = format!("{}\nPMIROC5-r1\n", LINE1);
    for line in body {
        content.push_str(line);
        content.push('\n');
    }
    fs::write(dir.join(name), content).unwrap();
}

pub fn test_config(granularity: Granularity) -> ProcessorConfig {
    ProcessorConfig::new(Line2Rule::StartsWith("P".to_string()), granularity).without_progress()
}
