//! Command-line interface components.

use crate::config::ProcessorConfig;
use crate::constants::DEFAULT_OUTPUT_DIR;
use crate::error::Result;
use crate::models::{Granularity, Line2Rule};
use clap::{ArgGroup, Parser};
use std::path::PathBuf;
use tracing::debug;

/// Validate precipitation data files and compute yearly statistics
///
/// The header line 2 rule and the granularity differ between data set
/// generations, so both must be given explicitly.
#[derive(Parser, Debug, Clone)]
#[command(name = "precip_processor")]
#[command(about = "Validate precipitation data files and compute yearly statistics")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(group(
    ArgGroup::new("line2")
        .required(true)
        .args(["line2_suffix", "line2_prefix"])
))]
pub struct Args {
    /// Directory containing the data files
    #[arg(value_name = "DIRECTORY")]
    pub directory: PathBuf,

    /// Require header line 2 to end with this text
    #[arg(long, value_name = "SUFFIX", allow_hyphen_values = true)]
    pub line2_suffix: Option<String>,

    /// Require header line 2 to start with this text
    #[arg(long, value_name = "PREFIX", allow_hyphen_values = true)]
    pub line2_prefix: Option<String>,

    /// Collect daily values or one sum per monthly line (daily, monthly)
    #[arg(short, long, value_name = "GRANULARITY")]
    pub granularity: Granularity,

    /// Output directory for report files
    #[arg(short, long, value_name = "DIR", default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Only scan file names matching this glob
    #[arg(long, value_name = "GLOB")]
    pub pattern: Option<String>,

    /// Number of files parsed in parallel (defaults to CPU count)
    #[arg(short = 'j', long, value_name = "COUNT")]
    pub workers: Option<usize>,

    /// Export the yearly table as CSV
    #[arg(long)]
    pub csv: bool,

    /// Export the yearly table as Parquet
    #[arg(long)]
    pub parquet: bool,

    /// Do not write the review log and results files
    #[arg(long)]
    pub no_files: bool,

    /// Increase logging verbosity (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Only show errors
    #[arg(short, long)]
    pub quiet: bool,
}

impl Args {
    /// Header line 2 rule selected on the command line
    pub fn line2_rule(&self) -> Line2Rule {
        match (&self.line2_suffix, &self.line2_prefix) {
            (Some(suffix), _) => Line2Rule::EndsWith(suffix.clone()),
            (None, Some(prefix)) => Line2Rule::StartsWith(prefix.clone()),
            // clap enforces one of the two
            (None, None) => Line2Rule::StartsWith(String::new()),
        }
    }

    /// Build and validate the processor configuration
    pub fn to_config(&self) -> Result<ProcessorConfig> {
        let mut config = ProcessorConfig::new(self.line2_rule(), self.granularity);

        if let Some(workers) = self.workers {
            config = config.with_max_concurrent_files(workers);
        }
        if let Some(pattern) = &self.pattern {
            config = config.with_file_pattern(pattern.clone());
        }
        if !self.show_progress() {
            config = config.without_progress();
        }

        config.validate()?;
        Ok(config)
    }

    /// Determine the appropriate log level based on verbosity flags
    pub fn get_log_level(&self) -> &'static str {
        if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        }
    }

    /// Check if we should show progress bars (not in quiet mode)
    pub fn show_progress(&self) -> bool {
        !self.quiet
    }
}

/// Set up structured logging on stderr
pub fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("precip_processor={}", log_level)));

    if args.quiet {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_writer(std::io::stderr)
                    .compact(),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_level(true)
                    .with_timer(fmt::time::uptime())
                    .with_writer(std::io::stderr),
            )
            .init();
    }

    debug!("Logging initialized at level: {}", log_level);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::PrecipError;

    fn parse(args: &[&str]) -> std::result::Result<Args, clap::Error> {
        Args::try_parse_from(std::iter::once("precip_processor").chain(args.iter().copied()))
    }

    #[test]
    fn test_parse_minimal() {
        let args = parse(&["data", "--line2-prefix", "P", "--granularity", "daily"]).unwrap();

        assert_eq!(args.directory, PathBuf::from("data"));
        assert_eq!(args.line2_rule(), Line2Rule::StartsWith("P".to_string()));
        assert_eq!(args.granularity, Granularity::Daily);
        assert_eq!(args.output, PathBuf::from("logs"));
        assert!(!args.csv);
        assert_eq!(args.get_log_level(), "warn");
    }

    #[test]
    fn test_line2_rule_required() {
        assert!(parse(&["data", "--granularity", "daily"]).is_err());
    }

    #[test]
    fn test_line2_rules_conflict() {
        let result = parse(&[
            "data",
            "--line2-prefix",
            "P",
            "--line2-suffix",
            "-1",
            "--granularity",
            "daily",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_granularity_required_and_parsed() {
        assert!(parse(&["data", "--line2-suffix", "-1"]).is_err());
        assert!(parse(&["data", "--line2-suffix", "-1", "-g", "weekly"]).is_err());

        let args = parse(&["data", "--line2-suffix", "-1", "-g", "monthly"]).unwrap();
        assert_eq!(args.granularity, Granularity::MonthlySum);
        assert_eq!(args.line2_rule(), Line2Rule::EndsWith("-1".to_string()));
    }

    #[test]
    fn test_hyphenated_prefix() {
        let args = parse(&["data", "--line2-prefix", "-P", "-g", "daily"]).unwrap();
        assert_eq!(args.line2_rule(), Line2Rule::StartsWith("-P".to_string()));
    }

    #[test]
    fn test_to_config() {
        let args = parse(&[
            "data",
            "--line2-prefix",
            "P",
            "-g",
            "daily",
            "-j",
            "2",
            "--pattern",
            "*.dat",
            "-q",
        ])
        .unwrap();
        let config = args.to_config().unwrap();

        assert_eq!(config.max_concurrent_files, 2);
        assert_eq!(config.file_pattern.as_deref(), Some("*.dat"));
        assert!(!config.show_progress);
        assert_eq!(args.get_log_level(), "error");
    }

    #[test]
    fn test_to_config_rejects_zero_workers() {
        let args = parse(&["data", "--line2-prefix", "P", "-g", "daily", "-j", "0"]).unwrap();
        assert!(matches!(
            args.to_config(),
            Err(PrecipError::Configuration { .. })
        ));
    }

    #[test]
    fn test_verbosity_levels() {
        let args = parse(&["data", "--line2-prefix", "P", "-g", "daily", "-vv"]).unwrap();
        assert_eq!(args.get_log_level(), "debug");
    }
}
