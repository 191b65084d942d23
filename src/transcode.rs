//! Trial re-encoding fan-out.
//!
//! Writes one candidate file per trial label and prints a comparison table.
//! Picking the right candidate is left to whoever reads the table.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::TranscodeArgs,
    encoding::{self, CandidateInspection, Trial},
    io_utils::{self, TextEncoding},
    table,
};

#[derive(Debug)]
pub struct CandidateReport {
    pub ordinal: usize,
    pub label: String,
    pub path: Option<PathBuf>,
    pub result: Result<(CandidateInspection, usize), String>,
}

/// Writes every successful trial under `output_dir` and inspects what was written.
///
/// Inspection reads back the encoded bytes, so characters the target cannot
/// represent show up as the numeric references that landed on disk.
pub fn write_candidates(
    input: &Path,
    output_dir: &Path,
    trials: Vec<Trial>,
    target: TextEncoding,
) -> Vec<CandidateReport> {
    trials
        .into_iter()
        .map(|trial| {
            let decoded = match trial.outcome {
                Ok(decoded) => decoded,
                Err(err) => {
                    warn!("Trial {} ({}) failed: {err}", trial.ordinal, trial.label);
                    return CandidateReport {
                        ordinal: trial.ordinal,
                        label: trial.label,
                        path: None,
                        result: Err(err.to_string()),
                    };
                }
            };
            let path = encoding::candidate_path(input, output_dir, trial.ordinal);
            let encoded = io_utils::encode_text(&decoded.text, target);
            let written = io_utils::write_bytes(&path, &encoded);
            let result = match written {
                Ok(()) => {
                    info!(
                        "Trial {} ({}) written to {:?}",
                        trial.ordinal, trial.label, path
                    );
                    let on_disk = io_utils::decode_lossy(&encoded, target);
                    Ok((
                        encoding::inspect_candidate(&on_disk.text),
                        decoded.replacement_count(),
                    ))
                }
                Err(err) => {
                    warn!("Trial {} ({}) failed: {err:#}", trial.ordinal, trial.label);
                    Err(format!("{err:#}"))
                }
            };
            CandidateReport {
                ordinal: trial.ordinal,
                label: trial.label,
                path: Some(path),
                result,
            }
        })
        .collect()
}

pub fn execute(args: &TranscodeArgs) -> Result<()> {
    let target = io_utils::resolve_output_encoding(&args.target_encoding)?;
    let output_dir = match &args.output_dir {
        Some(dir) => dir.clone(),
        None => args
            .input
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default(),
    };

    if let Some(label) = &args.source_encoding {
        let source = io_utils::resolve_encoding(label)?;
        let destination = encoding::fixed_path(&args.input, &output_dir);
        let decoded = encoding::convert_file(&args.input, &destination, source, target)
            .with_context(|| format!("Converting {:?} from {}", args.input, source.name()))?;
        if decoded.had_errors {
            warn!(
                "{} undecodable sequence(s) replaced while reading {} input",
                decoded.replacement_count(),
                source.name()
            );
        }
        info!(
            "Converted {:?} from {} to {} -> {:?}",
            args.input,
            source.name(),
            target.name(),
            destination
        );
        return Ok(());
    }

    let bytes = io_utils::read_input(&args.input)?;
    info!("Input {:?} is {} byte(s)", args.input, bytes.len());
    let guess = encoding::detect_file(&args.input, args.sample_bytes)?;
    let labels = encoding::trial_labels(&guess.label);
    let trials = encoding::trial_decodings(&bytes, &labels);

    std::fs::create_dir_all(&output_dir)
        .with_context(|| format!("Creating output directory {output_dir:?}"))?;

    let reports = write_candidates(&args.input, &output_dir, trials, target);
    print_reports(&reports);
    info!(
        "{} of {} candidate(s) written as {}; compare them and keep the one that reads correctly",
        reports.iter().filter(|report| report.result.is_ok()).count(),
        reports.len(),
        target.name()
    );
    Ok(())
}

fn print_reports(reports: &[CandidateReport]) {
    let headers = ["#", "encoding", "file", "lines", "commas", "replaced", "header"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    let rows = reports
        .iter()
        .map(|report| {
            let file = report
                .path
                .as_deref()
                .and_then(Path::file_name)
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "-".to_string());
            (report, file)
        })
        .map(|(report, file)| match &report.result {
            Ok((inspection, replaced)) => vec![
                report.ordinal.to_string(),
                report.label.clone(),
                file,
                inspection.line_count.to_string(),
                inspection.header_commas.to_string(),
                replaced.to_string(),
                inspection.preview.first().cloned().unwrap_or_default(),
            ],
            Err(message) => vec![
                report.ordinal.to_string(),
                report.label.clone(),
                file,
                "-".to_string(),
                "-".to_string(),
                "-".to_string(),
                format!("failed: {message}"),
            ],
        })
        .collect::<Vec<_>>();
    table::print_table(&headers, &rows);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inspection_reflects_the_encoded_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let input = dir.path().join("catalog.csv");
        let trials = encoding::trial_decodings("No,😀\n1,2\n".as_bytes(), &["utf-8".to_string()]);
        let target = io_utils::resolve_output_encoding("shift_jis").expect("label");

        let reports = write_candidates(&input, dir.path(), trials, target);

        let (inspection, replaced) = reports[0].result.as_ref().expect("written");
        assert_eq!(inspection.preview[0], "No,&#128512;");
        assert_eq!(inspection.line_count, 2);
        assert_eq!(*replaced, 0);
        let on_disk = std::fs::read(dir.path().join("catalog_enc1.csv")).expect("read");
        assert!(on_disk.starts_with(b"No,&#128512;"));
    }
}
