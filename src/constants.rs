//! Application constants for the precipitation processor
//!
//! Fixed header contract, record layout and default output settings shared
//! by the validator, the parser and the report writers.

// =============================================================================
// Header Contract
// =============================================================================

/// Tokens of the first header line, in order
pub const HEADER_LINE1_FIELDS: &[&str] = &["precip", "MIROC5", "RCP60", "REGRESION", "decimas", "1"];

/// Separator between header line 1 fields
pub const HEADER_FIELD_SEPARATOR: &str = "\t";

/// Number of header lines preceding the body
pub const HEADER_LINE_COUNT: usize = 2;

/// Build the exact literal expected on header line 1
pub fn header_line1() -> String {
    HEADER_LINE1_FIELDS.join(HEADER_FIELD_SEPARATOR)
}

// =============================================================================
// Record Layout
// =============================================================================

/// Metadata tokens at the start of every body line (tag, year, month)
pub const METADATA_TOKENS: usize = 3;

/// Daily values carried by every body line
pub const DAYS_PER_LINE: usize = 31;

/// Token count of a well-formed body line
pub const TOKENS_PER_LINE: usize = METADATA_TOKENS + DAYS_PER_LINE;

/// Token index of the year
pub const YEAR_TOKEN: usize = 1;

/// Token index of the month
pub const MONTH_TOKEN: usize = 2;

/// Sentinel marking a missing daily measurement
pub const MISSING_SENTINEL: f64 = -999.0;

/// Body lines expected per year in one file (one per month)
pub const DEFAULT_LINES_PER_YEAR: usize = 12;

// =============================================================================
// Output
// =============================================================================

/// Default directory for report files
pub const DEFAULT_OUTPUT_DIR: &str = "logs";

/// Timestamp format embedded in report file names
pub const REPORT_TIMESTAMP_FORMAT: &str = "%d-%m-%Y_%H-%M-%S";

/// Timestamp format printed inside report files
pub const REPORT_DATETIME_FORMAT: &str = "%d-%m-%Y %H:%M:%S";

/// Review log file name prefix
pub const LOG_FILE_PREFIX: &str = "review";

/// Results file name prefix
pub const RESULTS_FILE_PREFIX: &str = "results";

/// Yearly table export file stem
pub const TABLE_FILE_STEM: &str = "yearly_precipitation";

/// Precipitation unit used in reports
pub const PRECIP_UNIT: &str = "L/m²";
