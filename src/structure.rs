//! Structural facts read straight off raw bytes, before any decoding.

use std::fmt;

use log::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineTerminator {
    CrLf,
    Lf,
}

impl LineTerminator {
    pub fn as_bytes(self) -> &'static [u8] {
        match self {
            LineTerminator::CrLf => b"\r\n",
            LineTerminator::Lf => b"\n",
        }
    }
}

impl fmt::Display for LineTerminator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineTerminator::CrLf => f.write_str("CRLF"),
            LineTerminator::Lf => f.write_str("LF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureReport {
    pub terminator: LineTerminator,
    /// False when the first line carried no terminator and LF was assumed.
    pub terminator_detected: bool,
    /// Comma bytes in the first line plus one. Ignores quoting.
    pub column_estimate: usize,
}

/// Inspects the first physical line of `bytes`.
pub fn analyze(bytes: &[u8]) -> StructureReport {
    let first_line = match bytes.iter().position(|&b| b == b'\n') {
        Some(end) => &bytes[..=end],
        None => bytes,
    };
    let (terminator, terminator_detected) = if first_line.ends_with(b"\r\n") {
        (LineTerminator::CrLf, true)
    } else if first_line.ends_with(b"\n") {
        (LineTerminator::Lf, true)
    } else {
        (LineTerminator::Lf, false)
    };
    let column_estimate = first_line.iter().filter(|&&b| b == b',').count() + 1;
    StructureReport {
        terminator,
        terminator_detected,
        column_estimate,
    }
}

/// Logs the report the way the analysis commands present it.
pub fn log_report(report: &StructureReport) {
    if report.terminator_detected {
        info!("Detected line terminator: {}", report.terminator);
    } else {
        warn!(
            "Could not detect a line terminator; assuming {}",
            report.terminator
        );
    }
    info!("Estimated column count: {}", report.column_estimate);
}

/// Splits `bytes` on `terminator`, dropping records that are blank after trimming.
///
/// Only the detected terminator is stripped, so a CRLF file read with an LF
/// terminator keeps its trailing `\r` bytes inside each record.
pub fn split_records(bytes: &[u8], terminator: LineTerminator) -> Vec<&[u8]> {
    numbered_records(bytes, terminator)
        .into_iter()
        .map(|(_, record)| record)
        .collect()
}

/// Like [`split_records`], paired with each record's 1-based physical line.
pub fn numbered_records(bytes: &[u8], terminator: LineTerminator) -> Vec<(usize, &[u8])> {
    split_on(bytes, terminator.as_bytes())
        .into_iter()
        .enumerate()
        .map(|(idx, record)| (idx + 1, record))
        .filter(|(_, record)| !record.trim_ascii().is_empty())
        .collect()
}

fn split_on<'a>(bytes: &'a [u8], separator: &[u8]) -> Vec<&'a [u8]> {
    let mut records = Vec::new();
    let mut start = 0;
    let mut idx = 0;
    while idx + separator.len() <= bytes.len() {
        if &bytes[idx..idx + separator.len()] == separator {
            records.push(&bytes[start..idx]);
            idx += separator.len();
            start = idx;
        } else {
            idx += 1;
        }
    }
    records.push(&bytes[start..]);
    records
}
