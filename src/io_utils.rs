//! I/O utilities for whole-file reads, encoding resolution, and output writing.
//!
//! All file I/O in catalog-migrate flows through this module. It provides:
//!
//! - **Input loading**: whole-file buffering with an explicit missing-input error.
//! - **Encoding labels**: WHATWG labels via `encoding_rs`, plus the aliases the
//!   catalog tooling uses (`utf-8-sig`, `cp932`, underscore spellings).
//! - **Lossy decoding**: malformed sequences become U+FFFD and are reported,
//!   never fatal.
//! - **Output**: text artifacts are written in one shot, re-encoded when the
//!   target is not UTF-8; reject reports go through a `csv` writer.

use std::{
    borrow::Cow,
    fs::{self, File},
    io::{BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result};
use csv::QuoteStyle;
use encoding_rs::{Encoding, SHIFT_JIS, UTF_8};
use log::warn;

use crate::error::MigrateError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// A resolved character encoding together with its byte-order-mark policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextEncoding {
    pub encoding: &'static Encoding,
    /// Strip a leading BOM on decode and write one on encode.
    pub signature: bool,
}

impl TextEncoding {
    pub fn utf8() -> Self {
        Self {
            encoding: UTF_8,
            signature: false,
        }
    }

    pub fn name(&self) -> String {
        if self.signature {
            format!("{}-sig", self.encoding.name())
        } else {
            self.encoding.name().to_string()
        }
    }
}

/// Result of a replacement-policy decode.
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub had_errors: bool,
}

impl DecodedText {
    pub fn replacement_count(&self) -> usize {
        self.text.matches('\u{FFFD}').count()
    }
}

pub fn resolve_encoding(label: &str) -> Result<TextEncoding, MigrateError> {
    let normalized = label.trim().to_ascii_lowercase();
    match normalized.as_str() {
        "utf-8-sig" | "utf_8_sig" | "utf8-sig" => {
            return Ok(TextEncoding {
                encoding: UTF_8,
                signature: true,
            });
        }
        // encoding_rs' Shift_JIS decoder already covers the Microsoft extensions.
        "cp932" | "windows-932" => {
            return Ok(TextEncoding {
                encoding: SHIFT_JIS,
                signature: false,
            });
        }
        _ => {}
    }
    Encoding::for_label(normalized.as_bytes())
        .or_else(|| Encoding::for_label(normalized.replace('_', "-").as_bytes()))
        .map(|encoding| TextEncoding {
            encoding,
            signature: false,
        })
        .ok_or_else(|| MigrateError::UnknownEncoding(label.to_string()))
}

/// Resolves a label for writing. `encoding_rs` only decodes UTF-16 and
/// `replacement`; encoding to them would silently produce UTF-8.
pub fn resolve_output_encoding(label: &str) -> Result<TextEncoding, MigrateError> {
    let resolved = resolve_encoding(label)?;
    if resolved.encoding.output_encoding() != resolved.encoding {
        return Err(MigrateError::UnwritableEncoding(label.to_string()));
    }
    Ok(resolved)
}

pub fn read_input(path: &Path) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(MigrateError::MissingInput(path.to_path_buf()).into());
    }
    fs::read(path).with_context(|| format!("Reading input file {path:?}"))
}

/// Reads at most `limit` bytes from the start of `path`.
pub fn read_prefix(path: &Path, limit: usize) -> Result<Vec<u8>> {
    if !path.is_file() {
        return Err(MigrateError::MissingInput(path.to_path_buf()).into());
    }
    let file = File::open(path).with_context(|| format!("Opening input file {path:?}"))?;
    let mut bytes = Vec::with_capacity(limit.min(64 * 1024));
    file.take(limit as u64)
        .read_to_end(&mut bytes)
        .with_context(|| format!("Reading input file {path:?}"))?;
    Ok(bytes)
}

/// Decodes without any BOM interpretation unless the encoding asks for it.
pub fn decode_lossy(bytes: &[u8], encoding: TextEncoding) -> DecodedText {
    let (text, had_errors) = if encoding.signature {
        encoding.encoding.decode_with_bom_removal(bytes)
    } else {
        encoding.encoding.decode_without_bom_handling(bytes)
    };
    DecodedText {
        text: text.into_owned(),
        had_errors,
    }
}

/// Decodes input text, letting a leading BOM override the declared encoding.
pub fn decode_input(bytes: &[u8], encoding: TextEncoding, path: &Path) -> String {
    let (text, actual, had_errors) = encoding.encoding.decode(bytes);
    if actual != encoding.encoding {
        warn!(
            "{path:?}: byte-order mark selects {} over declared {}",
            actual.name(),
            encoding.name()
        );
    }
    if had_errors {
        let replaced = text.matches('\u{FFFD}').count();
        warn!(
            "{path:?}: {replaced} undecodable sequence(s) replaced while decoding as {}",
            actual.name()
        );
    }
    text.into_owned()
}

pub fn encode_text(text: &str, encoding: TextEncoding) -> Vec<u8> {
    let (encoded, output, had_errors) = encoding.encoding.encode(text);
    if had_errors {
        warn!(
            "Characters not representable in {} were written as numeric references",
            output.name()
        );
    }
    let mut bytes = Vec::with_capacity(encoded.len() + UTF8_BOM.len());
    if encoding.signature && output == UTF_8 {
        bytes.extend_from_slice(UTF8_BOM);
    }
    bytes.extend_from_slice(encoded.as_ref());
    bytes
}

fn ensure_parent_dir(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .with_context(|| format!("Creating output directory {parent:?}"))?;
    }
    Ok(())
}

pub fn write_bytes(path: &Path, bytes: &[u8]) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut writer = BufWriter::new(
        File::create(path).with_context(|| format!("Creating output file {path:?}"))?,
    );
    writer
        .write_all(bytes)
        .with_context(|| format!("Writing output file {path:?}"))?;
    writer
        .flush()
        .with_context(|| format!("Flushing output file {path:?}"))
}

pub fn write_text(path: &Path, text: &str) -> Result<()> {
    write_bytes(path, text.as_bytes())
}

pub fn open_csv_writer(path: &Path) -> Result<csv::Writer<BufWriter<File>>> {
    ensure_parent_dir(path)?;
    let file = File::create(path).with_context(|| format!("Creating output file {path:?}"))?;
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(b',')
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    Ok(builder.from_writer(BufWriter::new(file)))
}

/// Shortens `value` to at most `max` characters for previews.
pub fn truncate_chars(value: &str, max: usize) -> Cow<'_, str> {
    match value.char_indices().nth(max) {
        Some((idx, _)) => Cow::Owned(format!("{}...", &value[..idx])),
        None => Cow::Borrowed(value),
    }
}
