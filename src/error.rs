//! Error handling for precipitation processing operations.
//!
//! Fatal errors surface as [`PrecipError`]. Header and body-line defects are
//! recoverable and carried as data ([`HeaderError`], [`LineIssue`]) so a
//! scan always completes with a report.

use serde::Serialize;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PrecipError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    #[error("Directory not found: {path}")]
    DirectoryNotFound { path: PathBuf },

    #[error("Configuration error: {message}")]
    Configuration { message: String },

    #[error("Invalid file pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Failed to write report {path}: {reason}")]
    ReportFailed { path: PathBuf, reason: String },

    #[error("Processing interrupted: {reason}")]
    ProcessingInterrupted { reason: String },
}

impl PrecipError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a processing interrupted error
    pub fn processing_interrupted(reason: impl Into<String>) -> Self {
        Self::ProcessingInterrupted {
            reason: reason.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PrecipError>;

/// Header contract violation; the file is rejected
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum HeaderError {
    #[error("line {line} does not exist")]
    MissingLine { line: usize },

    #[error("line {line} does not meet the requirements: {content}")]
    HeaderMismatch { line: usize, content: String },
}

impl HeaderError {
    /// 1-based header line the failure refers to
    pub fn line_number(&self) -> usize {
        match self {
            HeaderError::MissingLine { line } | HeaderError::HeaderMismatch { line, .. } => *line,
        }
    }
}

/// Body-line defect; the line is skipped and processing continues
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum LineIssue {
    #[error("malformed line, expected {expected} tokens but found {found} ({raw})")]
    MalformedLine {
        expected: usize,
        found: usize,
        raw: String,
    },

    #[error("line could not be parsed ({cause})")]
    UnparsableLine { cause: String },

    #[error("incomplete values, expected {expected} but found {found}")]
    IncompleteValues { expected: usize, found: usize },
}

/// Why a file was excluded from aggregation
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize)]
pub enum RejectReason {
    #[error("header check failed: {0}")]
    Header(#[from] HeaderError),

    #[error("read error: {0}")]
    Io(String),
}

impl RejectReason {
    /// Header line number the rejection refers to, if any
    pub fn line_number(&self) -> Option<usize> {
        match self {
            RejectReason::Header(err) => Some(err.line_number()),
            RejectReason::Io(_) => None,
        }
    }
}
