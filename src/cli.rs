use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

use crate::encoding::DEFAULT_SAMPLE_BYTES;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Repair catalog CSV exports and convert them into SQL INSERT scripts",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Guess the character encoding of a file from a byte sample
    Detect(DetectArgs),
    /// Re-encode a file under every candidate encoding for manual comparison
    Transcode(TranscodeArgs),
    /// Report line terminator, column estimate, and header roles from raw bytes
    Analyze(AnalyzeArgs),
    /// Parse a catalog CSV with quote-aware rules and emit product SQL
    Convert(ConvertArgs),
    /// Emit minimal product and placeholder inventory SQL straight from raw bytes
    Salvage(SalvageArgs),
}

#[derive(Debug, Args)]
pub struct DetectArgs {
    /// File to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Number of leading bytes handed to the detector
    #[arg(long, default_value_t = DEFAULT_SAMPLE_BYTES)]
    pub sample_bytes: usize,
}

#[derive(Debug, Args)]
pub struct TranscodeArgs {
    /// File to re-encode
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Directory receiving the `<stem>_enc<N>` candidates (defaults to the input's directory)
    #[arg(short = 'o', long = "output-dir")]
    pub output_dir: Option<PathBuf>,
    /// Encoding written to every candidate file
    #[arg(long = "target-encoding", default_value = "utf-8")]
    pub target_encoding: String,
    /// Skip the trials and convert once from this encoding into `<stem>_fixed.<ext>`
    #[arg(long = "source-encoding")]
    pub source_encoding: Option<String>,
    /// Number of leading bytes handed to the detector
    #[arg(long, default_value_t = DEFAULT_SAMPLE_BYTES)]
    pub sample_bytes: usize,
}

#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// File to inspect
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Encoding used to decode the header preview (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ConvertArgs {
    /// Catalog CSV file to convert
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Directory receiving the numbered .sql scripts
    #[arg(short = 'o', long = "output-dir", default_value = "sql_import")]
    pub output_dir: PathBuf,
    /// Character encoding of the input file, or `auto` to detect it (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
    /// How inventory rows are produced
    #[arg(long, value_enum, default_value = "none")]
    pub inventory: InventoryMode,
    /// YAML file overriding database name, placeholders, and lookup tables
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Database named in the `USE` directive
    #[arg(long)]
    pub database: Option<String>,
    /// Write skipped and rejected rows to this CSV file
    #[arg(long)]
    pub rejects: Option<PathBuf>,
}

#[derive(Debug, Args)]
pub struct SalvageArgs {
    /// Catalog CSV file of unknown encoding
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Directory receiving the .sql scripts
    #[arg(short = 'o', long = "output-dir", default_value = "sql_binary")]
    pub output_dir: PathBuf,
    /// YAML file overriding database name and placeholder inventory values
    #[arg(short = 'c', long = "config")]
    pub config: Option<PathBuf>,
    /// Database named in the `USE` directive
    #[arg(long)]
    pub database: Option<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum, PartialEq, Eq, Default)]
#[value(rename_all = "kebab-case")]
pub enum InventoryMode {
    /// Products only
    #[default]
    None,
    /// Inventory and shipments read from the catalog's stock columns
    Source,
    /// One placeholder inventory row per product
    Synthetic,
}
