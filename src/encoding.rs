//! Encoding detection and multi-candidate re-encoding.
//!
//! Detection is a single best-effort guess from `chardetng`; nothing here
//! decides which candidate is correct. [`trial_decodings`] decodes the same
//! bytes under every candidate label so a person can compare the results.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chardetng::EncodingDetector;
use log::{debug, info, warn};

use crate::{
    error::MigrateError,
    io_utils::{self, DecodedText, TextEncoding},
};

/// Bytes sampled from the start of a file for detection.
pub const DEFAULT_SAMPLE_BYTES: usize = 10_000;

pub const FALLBACK_LABEL: &str = "utf-8";

/// Labels tried after the detected guess, in order.
pub const TRIAL_LABELS: [&str; 6] = [
    "utf-8",
    "utf-8-sig",
    "shift_jis",
    "cp932",
    "euc-jp",
    "iso-2022-jp",
];

#[derive(Debug, Clone, PartialEq)]
pub struct EncodingGuess {
    pub label: String,
    /// Share of decoded characters that were not replacement characters.
    /// `None` when the guess is the fallback.
    pub confidence: Option<f32>,
}

impl EncodingGuess {
    fn fallback() -> Self {
        Self {
            label: FALLBACK_LABEL.to_string(),
            confidence: None,
        }
    }
}

/// Guesses the encoding of `sample`, a prefix of some file.
///
/// `complete` tells the detector whether the sample ends at end of file, so a
/// multi-byte sequence cut off by the prefix boundary is not held against a
/// candidate.
pub fn detect_encoding(sample: &[u8], complete: bool) -> EncodingGuess {
    if sample.is_empty() {
        return EncodingGuess::fallback();
    }
    let mut detector = EncodingDetector::new();
    detector.feed(sample, complete);
    let encoding = detector.guess(None, true);

    let (text, _) = encoding.decode_without_bom_handling(sample);
    let total = text.chars().count();
    if total == 0 {
        return EncodingGuess::fallback();
    }
    let replaced = text.matches('\u{FFFD}').count();
    let confidence = 1.0 - replaced as f32 / total as f32;
    debug!(
        "Detector chose {} ({replaced} replacement(s) in {total} char(s))",
        encoding.name()
    );
    EncodingGuess {
        label: encoding.name().to_ascii_lowercase(),
        confidence: Some(confidence),
    }
}

pub fn detect_file(path: &Path, sample_bytes: usize) -> Result<EncodingGuess> {
    let sample = io_utils::read_prefix(path, sample_bytes)?;
    let guess = detect_encoding(&sample, sample.len() < sample_bytes);
    match guess.confidence {
        Some(confidence) => info!(
            "Detected encoding for {path:?}: {} (confidence {confidence:.2})",
            guess.label
        ),
        None => warn!(
            "Could not classify {path:?}; falling back to {}",
            guess.label
        ),
    }
    Ok(guess)
}

/// The labels tried by the trial fan-out: the detected guess first, then the
/// fixed Japanese-catalog list. Duplicates are kept so ordinals stay stable.
pub fn trial_labels(detected: &str) -> Vec<String> {
    std::iter::once(detected.to_string())
        .chain(TRIAL_LABELS.iter().map(|label| label.to_string()))
        .collect()
}

/// Decodes `bytes` from `source` and re-encodes the text as `target`.
pub fn transcode(
    bytes: &[u8],
    source: TextEncoding,
    target: TextEncoding,
) -> (Vec<u8>, DecodedText) {
    let decoded = io_utils::decode_lossy(bytes, source);
    let encoded = io_utils::encode_text(&decoded.text, target);
    (encoded, decoded)
}

/// Re-encodes the file at `source_path` into `destination`.
///
/// Undecodable input never fails the conversion; it only shows up in the
/// returned [`DecodedText`] as replacement characters.
pub fn convert_file(
    source_path: &Path,
    destination: &Path,
    source: TextEncoding,
    target: TextEncoding,
) -> Result<DecodedText> {
    let bytes = io_utils::read_input(source_path)?;
    let (encoded, decoded) = transcode(&bytes, source, target);
    io_utils::write_bytes(destination, &encoded)
        .with_context(|| format!("Writing {} candidate {destination:?}", source.name()))?;
    Ok(decoded)
}

#[derive(Debug)]
pub struct Trial {
    /// 1-based position in the candidate list.
    pub ordinal: usize,
    pub label: String,
    pub outcome: Result<DecodedText, MigrateError>,
}

/// Decodes `bytes` under every label. Unknown labels yield a failed outcome
/// instead of stopping the fan-out.
pub fn trial_decodings(bytes: &[u8], labels: &[String]) -> Vec<Trial> {
    labels
        .iter()
        .enumerate()
        .map(|(idx, label)| Trial {
            ordinal: idx + 1,
            label: label.clone(),
            outcome: io_utils::resolve_encoding(label)
                .map(|encoding| io_utils::decode_lossy(bytes, encoding)),
        })
        .collect()
}

/// Summary used to eyeball whether a candidate decoded sensibly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateInspection {
    pub line_count: usize,
    pub header_commas: usize,
    pub preview: Vec<String>,
}

pub const PREVIEW_LINES: usize = 3;
pub const PREVIEW_CHARS: usize = 100;

pub fn inspect_candidate(text: &str) -> CandidateInspection {
    let header = text.lines().next().unwrap_or("").trim();
    CandidateInspection {
        line_count: text.lines().count(),
        header_commas: header.matches(',').count(),
        preview: text
            .lines()
            .take(PREVIEW_LINES)
            .map(|line| io_utils::truncate_chars(line.trim(), PREVIEW_CHARS).into_owned())
            .collect(),
    }
}

/// Output path for the `ordinal`-th candidate of `input`: `<stem>_enc<N>.<ext>`.
pub fn candidate_path(input: &Path, output_dir: &Path, ordinal: usize) -> PathBuf {
    suffixed_path(input, output_dir, &format!("enc{ordinal}"))
}

/// Output path for a single chosen conversion: `<stem>_fixed.<ext>`.
pub fn fixed_path(input: &Path, output_dir: &Path) -> PathBuf {
    suffixed_path(input, output_dir, "fixed")
}

fn suffixed_path(input: &Path, output_dir: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input".to_string());
    let file_name = match input.extension() {
        Some(ext) => format!("{stem}_{suffix}.{}", ext.to_string_lossy()),
        None => format!("{stem}_{suffix}"),
    };
    output_dir.join(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::SHIFT_JIS;

    #[test]
    fn empty_sample_falls_back_to_utf8() {
        let guess = detect_encoding(b"", true);
        assert_eq!(guess.label, "utf-8");
        assert_eq!(guess.confidence, None);
    }

    #[test]
    fn utf8_japanese_is_recognised() {
        let text = "No,商品名,型式,カテゴリ,メーカー\n1,ソニー テレビ プレミアム,MD-テレ231234,テレビ,ソニー\n";
        let guess = detect_encoding(text.as_bytes(), true);
        assert_eq!(guess.label, "utf-8");
        assert_eq!(guess.confidence, Some(1.0));
    }

    #[test]
    fn shift_jis_bytes_decode_under_sjis_trials() {
        let (bytes, _, _) = SHIFT_JIS.encode("No,型式\n1,テレビ\n");
        let trials = trial_decodings(&bytes, &trial_labels("utf-8"));
        assert_eq!(trials.len(), 7);
        let sjis = trials
            .iter()
            .find(|trial| trial.label == "shift_jis")
            .expect("shift_jis trial");
        let decoded = sjis.outcome.as_ref().expect("decoded");
        assert_eq!(decoded.text, "No,型式\n1,テレビ\n");
        assert!(!decoded.had_errors);
        let utf8 = trials[1].outcome.as_ref().expect("decoded");
        assert!(utf8.had_errors);
    }

    #[test]
    fn unknown_label_is_a_failed_trial_not_an_abort() {
        let trials = trial_decodings(b"a,b\n", &["nonsense".to_string(), "utf-8".to_string()]);
        assert!(trials[0].outcome.is_err());
        assert!(trials[1].outcome.is_ok());
        assert_eq!(trials[1].ordinal, 2);
    }

    #[test]
    fn inspection_counts_lines_and_header_commas() {
        let inspection = inspect_candidate("a,b,c\n1,2,3\n4,5,6\n7,8,9\n");
        assert_eq!(inspection.line_count, 4);
        assert_eq!(inspection.header_commas, 2);
        assert_eq!(inspection.preview, vec!["a,b,c", "1,2,3", "4,5,6"]);
    }

    #[test]
    fn candidate_paths_carry_ordinal_suffix() {
        let path = candidate_path(Path::new("data/electronics.csv"), Path::new("out"), 3);
        assert_eq!(path, Path::new("out/electronics_enc3.csv"));
        assert_eq!(
            fixed_path(Path::new("electronics"), Path::new("out")),
            Path::new("out/electronics_fixed")
        );
    }

    #[test]
    fn convert_file_replaces_undecodable_bytes() {
        let dir = tempfile::tempdir().expect("temp dir");
        let source = dir.path().join("in.csv");
        let destination = dir.path().join("out.csv");
        let (mut bytes, _, _) = SHIFT_JIS.encode("No,型式\n");
        bytes.to_mut().push(0xFF);
        std::fs::write(&source, &bytes).expect("write source");

        let decoded = convert_file(
            &source,
            &destination,
            io_utils::resolve_encoding("shift_jis").expect("label"),
            TextEncoding::utf8(),
        )
        .expect("conversion");
        assert!(decoded.had_errors);
        let written = std::fs::read_to_string(&destination).expect("read output");
        assert_eq!(written, "No,型式\n\u{FFFD}");
    }
}
