//! Per-year table export (CSV, optionally Parquet) built with polars

use super::ReportCollector;
use crate::constants::TABLE_FILE_STEM;
use crate::error::{PrecipError, Result};
use crate::models::ScanReport;
use crate::stats::Statistics;
use polars::prelude::*;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::info;

/// Writes `year, total, average, variation` rows
#[derive(Debug, Clone)]
pub struct TableExport {
    output_dir: PathBuf,
    csv: bool,
    parquet: bool,
}

impl TableExport {
    /// CSV export only
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            output_dir,
            csv: true,
            parquet: false,
        }
    }

    pub fn with_csv(mut self, enabled: bool) -> Self {
        self.csv = enabled;
        self
    }

    pub fn with_parquet(mut self, enabled: bool) -> Self {
        self.parquet = enabled;
        self
    }

    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", TABLE_FILE_STEM))
    }

    pub fn parquet_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.parquet", TABLE_FILE_STEM))
    }

    fn write_csv(&self, df: &mut DataFrame) -> Result<PathBuf> {
        let path = self.csv_path();
        let mut file = File::create(&path).map_err(|e| report_failed(&path, e))?;
        CsvWriter::new(&mut file)
            .include_header(true)
            .finish(df)
            .map_err(|e| report_failed(&path, e))?;
        Ok(path)
    }

    fn write_parquet(&self, df: &mut DataFrame) -> Result<PathBuf> {
        let path = self.parquet_path();
        let file = File::create(&path).map_err(|e| report_failed(&path, e))?;
        ParquetWriter::new(file)
            .with_compression(ParquetCompression::Snappy)
            .finish(df)
            .map_err(|e| report_failed(&path, e))?;
        Ok(path)
    }
}

/// Build the yearly table; undefined variation and empty averages are null
pub fn yearly_frame(statistics: &Statistics) -> Result<DataFrame> {
    let years: Vec<i32> = statistics.years.iter().map(|y| y.year).collect();
    let totals: Vec<f64> = statistics.years.iter().map(|y| y.total).collect();
    let averages: Vec<Option<f64>> = statistics.years.iter().map(|y| y.average).collect();
    let variations: Vec<Option<f64>> = statistics
        .years
        .iter()
        .map(|y| y.variation.and_then(|v| v.percent()))
        .collect();

    let df = df!(
        "year" => years,
        "total" => totals,
        "average" => averages,
        "variation" => variations
    )?;
    Ok(df)
}

fn report_failed(path: &Path, err: impl std::fmt::Display) -> PrecipError {
    PrecipError::ReportFailed {
        path: path.to_path_buf(),
        reason: err.to_string(),
    }
}

impl ReportCollector for TableExport {
    fn name(&self) -> &str {
        "table"
    }

    fn collect(&mut self, report: &ScanReport) -> Result<()> {
        if !self.csv && !self.parquet {
            return Ok(());
        }

        fs::create_dir_all(&self.output_dir).map_err(|e| report_failed(&self.output_dir, e))?;
        let mut df = yearly_frame(&report.statistics)?;

        if self.csv {
            let path = self.write_csv(&mut df)?;
            info!("Yearly table written to {}", path.display());
        }
        if self.parquet {
            let path = self.write_parquet(&mut df)?;
            info!("Yearly table written to {}", path.display());
        }
        Ok(())
    }
}
