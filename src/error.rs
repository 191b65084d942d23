//! Error taxonomy for the migration pipelines.
//!
//! File-level failures ([`MigrateError`]) abort a run before any output is
//! written. Row-level failures ([`SkipReason`]) never abort: the row is dropped
//! and recorded in [`RowDiagnostics`], which keeps the first few samples for
//! reporting and counts the rest.

use std::path::PathBuf;

use log::warn;
use thiserror::Error;

/// Number of row failures surfaced as diagnostics before the rest are only counted.
pub const MAX_REPORTED_ROW_ERRORS: usize = 5;

#[derive(Debug, Error)]
pub enum MigrateError {
    #[error("Input file not found: {0:?}")]
    MissingInput(PathBuf),
    #[error("Input file {0:?} contains no records")]
    EmptyInput(PathBuf),
    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),
    #[error("Encoding '{0}' can be read but not written")]
    UnwritableEncoding(String),
    #[error("Invalid configuration: {0}")]
    Config(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkipReason {
    #[error("expected {expected} field(s) but found {found}")]
    FieldCount { expected: usize, found: usize },
    #[error("column {index} is missing")]
    MissingColumn { index: usize },
    #[error("column '{column}' value '{value}' is not an integer")]
    InvalidInteger { column: String, value: String },
    #[error("column '{column}' value '{value}' is not a number")]
    InvalidFloat { column: String, value: String },
}

impl SkipReason {
    /// Field-count mismatches are filtered rows, not conversion failures.
    pub fn is_shape_mismatch(&self) -> bool {
        matches!(self, SkipReason::FieldCount { .. })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedRow {
    pub line: usize,
    pub reason: SkipReason,
    pub raw: String,
}

/// Bounded record of skipped rows.
///
/// Conversion failures are logged as they occur until
/// [`MAX_REPORTED_ROW_ERRORS`] have been seen; later ones are only counted.
/// Field-count mismatches are counted separately and never logged per row.
#[derive(Debug, Default)]
pub struct RowDiagnostics {
    samples: Vec<SkippedRow>,
    failures: usize,
    mismatched: usize,
    skipped: Vec<SkippedRow>,
}

impl RowDiagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, line: usize, reason: SkipReason, raw: &str) {
        let row = SkippedRow {
            line,
            reason,
            raw: raw.to_string(),
        };
        if row.reason.is_shape_mismatch() {
            self.mismatched += 1;
        } else {
            self.failures += 1;
            if self.samples.len() < MAX_REPORTED_ROW_ERRORS {
                warn!("Row {} skipped: {}", row.line, row.reason);
                self.samples.push(row.clone());
            }
        }
        self.skipped.push(row);
    }

    /// The first conversion failures, in input order.
    pub fn samples(&self) -> &[SkippedRow] {
        &self.samples
    }

    pub fn failure_count(&self) -> usize {
        self.failures
    }

    pub fn mismatch_count(&self) -> usize {
        self.mismatched
    }

    /// Every skipped row, for the optional rejects report.
    pub fn skipped(&self) -> &[SkippedRow] {
        &self.skipped
    }

    pub fn is_empty(&self) -> bool {
        self.skipped.is_empty()
    }
}
