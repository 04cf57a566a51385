//! Header contract validation.
//!
//! Every data file opens with two fixed lines: a literal tab-separated
//! data set description and a model identifier line checked against a
//! configurable [`Line2Rule`].

use crate::constants::{HEADER_LINE_COUNT, header_line1};
use crate::error::HeaderError;
use crate::models::Line2Rule;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;
use tracing::debug;

/// Validator for the two-line header
#[derive(Debug, Clone)]
pub struct HeaderValidator {
    line1: String,
    line2_rule: Line2Rule,
}

impl HeaderValidator {
    pub fn new(line2_rule: Line2Rule) -> Self {
        Self {
            line1: header_line1(),
            line2_rule,
        }
    }

    pub fn line2_rule(&self) -> &Line2Rule {
        &self.line2_rule
    }

    /// Validate the first header lines of a file
    ///
    /// Lines must already have their terminators removed; any other
    /// whitespace is significant. Lines beyond the second are ignored.
    pub fn validate<S: AsRef<str>>(&self, lines: &[S]) -> Result<(), HeaderError> {
        if lines.len() < HEADER_LINE_COUNT {
            return Err(HeaderError::MissingLine {
                line: lines.len() + 1,
            });
        }

        let line1 = lines[0].as_ref();
        if line1 != self.line1 {
            return Err(HeaderError::HeaderMismatch {
                line: 1,
                content: line1.to_string(),
            });
        }

        let line2 = lines[1].as_ref();
        if !self.line2_rule.matches(line2) {
            return Err(HeaderError::HeaderMismatch {
                line: 2,
                content: line2.to_string(),
            });
        }

        Ok(())
    }

    /// Read a file's header lines and validate them
    pub fn check_file(&self, path: &Path) -> io::Result<Result<(), HeaderError>> {
        let lines = read_header_lines(path)?;
        let verdict = self.validate(&lines);
        debug!("Header of {}: {:?}", path.display(), verdict);
        Ok(verdict)
    }
}

/// Read up to the first two lines of a file, terminators stripped
pub fn read_header_lines(path: &Path) -> io::Result<Vec<String>> {
    let reader = BufReader::new(File::open(path)?);
    reader.lines().take(HEADER_LINE_COUNT).collect()
}
