//! Directory scan orchestration.
//!
//! Discovers candidate files, validates each header, parses accepted bodies
//! on blocking worker tasks and merges the per-file year maps into a single
//! [`ScanReport`]. Per-line and per-file failures are recorded in the report;
//! only a missing directory aborts the scan.

pub mod discovery;

#[cfg(test)]
pub mod tests;

use self::discovery::FileDiscovery;

use crate::aggregate::YearAggregator;
use crate::config::ProcessorConfig;
use crate::error::{PrecipError, RejectReason, Result};
use crate::header::HeaderValidator;
use crate::models::{FileOutcome, FileStatus, ScanReport};
use crate::parser::RecordParser;
use crate::stats::StatisticsCalculator;

use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::task;
use tracing::{debug, info, warn};

/// Header validator and record parser shared by worker tasks
#[derive(Debug)]
struct FilePipeline {
    validator: HeaderValidator,
    parser: RecordParser,
}

impl FilePipeline {
    fn from_config(config: &ProcessorConfig) -> Self {
        Self {
            validator: HeaderValidator::new(config.line2_rule.clone()),
            parser: RecordParser::new(config.granularity, config.expected_lines_per_year),
        }
    }

    /// Validate and parse one file; never fails, rejections are data
    fn process_file(&self, path: &Path) -> FileOutcome {
        match self.validator.check_file(path) {
            Ok(Ok(())) => {}
            Ok(Err(header_error)) => {
                return FileOutcome::rejected(path.to_path_buf(), header_error.into());
            }
            Err(e) => {
                return FileOutcome::rejected(path.to_path_buf(), RejectReason::Io(e.to_string()));
            }
        }

        let parsed = File::open(path).and_then(|file| self.parser.parse_reader(BufReader::new(file)));
        match parsed {
            Ok(result) => FileOutcome::accepted(path.to_path_buf(), result),
            Err(e) => FileOutcome::rejected(path.to_path_buf(), RejectReason::Io(e.to_string())),
        }
    }
}

/// Main processor for a precipitation data directory
#[derive(Debug)]
pub struct PrecipProcessor {
    directory: PathBuf,
    config: ProcessorConfig,
    file_discovery: FileDiscovery,
    pipeline: Arc<FilePipeline>,
}

impl PrecipProcessor {
    /// Create a new processor for a directory
    pub fn new(directory: PathBuf, config: ProcessorConfig) -> Result<Self> {
        config.validate()?;

        if !directory.is_dir() {
            return Err(PrecipError::DirectoryNotFound { path: directory });
        }

        let file_discovery = FileDiscovery::new(directory.clone(), config.file_pattern.as_deref())?;
        let pipeline = Arc::new(FilePipeline::from_config(&config));

        Ok(Self {
            directory,
            config,
            file_discovery,
            pipeline,
        })
    }

    pub fn config(&self) -> &ProcessorConfig {
        &self.config
    }

    /// Validate and parse a single file with this processor's settings
    pub fn process_file(&self, path: &Path) -> FileOutcome {
        self.pipeline.process_file(path)
    }

    /// Scan the directory and build the report
    pub async fn process(&self) -> Result<ScanReport> {
        let start_time = Instant::now();
        info!("Scanning {}", self.directory.display());

        let files = self.file_discovery.discover_files().await?;
        let outcomes = self.process_files(files).await;

        let report = self.build_report(outcomes, start_time.elapsed().as_millis());
        info!(
            "Scan complete: {} accepted, {} rejected, {} years",
            report.accepted_count(),
            report.rejected_count(),
            report.year_map.len()
        );
        Ok(report)
    }

    /// Process files concurrently, at most `max_concurrent_files` at a time
    async fn process_files(&self, files: Vec<PathBuf>) -> Vec<FileOutcome> {
        let pb = self.progress_bar(files.len() as u64);
        let concurrent_limit = self.config.max_concurrent_files.min(files.len()).max(1);
        debug!(
            "Processing {} files with {} workers",
            files.len(),
            concurrent_limit
        );

        let outcomes = stream::iter(files)
            .map(|file_path| {
                let pipeline = Arc::clone(&self.pipeline);
                let pb = pb.clone();
                async move {
                    if let Some(file_name) = file_path.file_name() {
                        pb.set_message(format!("Processing: {}", file_name.to_string_lossy()));
                    }

                    let task_path = file_path.clone();
                    let outcome = task::spawn_blocking(move || pipeline.process_file(&task_path))
                        .await
                        .unwrap_or_else(|e| {
                            FileOutcome::rejected(
                                file_path.clone(),
                                RejectReason::Io(format!("worker failed: {}", e)),
                            )
                        });
                    pb.inc(1);
                    log_outcome(&outcome);
                    outcome
                }
            })
            .buffer_unordered(concurrent_limit)
            .collect::<Vec<_>>()
            .await;

        pb.finish_and_clear();
        outcomes
    }

    /// Merge accepted files and compute statistics
    ///
    /// Outcomes may arrive in any order; the merge is order-independent and
    /// the file listing is re-sorted by name. Per-file year maps are moved
    /// into the merged map, leaving only counters and diagnostics behind.
    fn build_report(&self, mut outcomes: Vec<FileOutcome>, processing_time_ms: u128) -> ScanReport {
        outcomes.sort_by(|a, b| discovery::natural_cmp(&a.file_name(), &b.file_name()));

        let mut aggregator = YearAggregator::new();
        for outcome in &mut outcomes {
            if let FileStatus::Accepted(result) = &mut outcome.status {
                aggregator.add(std::mem::take(&mut result.year_map));
            }
        }
        debug!("Merged {} files", aggregator.files_merged());

        let year_map = aggregator.finish();
        let statistics = StatisticsCalculator::compute(&year_map);

        ScanReport {
            directory: self.directory.clone(),
            line2_rule: self.config.line2_rule.clone(),
            granularity: self.config.granularity,
            files: outcomes,
            year_map,
            statistics,
            processing_time_ms,
        }
    }

    fn progress_bar(&self, len: u64) -> ProgressBar {
        if !self.config.show_progress {
            return ProgressBar::hidden();
        }

        let pb = ProgressBar::new(len);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
        );
        pb.set_message("Processing files");
        pb
    }
}

fn log_outcome(outcome: &FileOutcome) {
    match &outcome.status {
        FileStatus::Accepted(result) => {
            info!(
                "{}: header ok, {} lines accepted, {} skipped",
                outcome.path.display(),
                result.lines_accepted,
                result.diagnostics.len()
            );
            for incomplete in &result.incomplete_years {
                warn!(
                    "{}: year {} has {} lines (expected {})",
                    outcome.path.display(),
                    incomplete.year,
                    incomplete.lines,
                    incomplete.expected
                );
            }
        }
        FileStatus::Rejected(reason) => {
            warn!("{}: rejected, {}", outcome.path.display(), reason);
        }
    }
}
