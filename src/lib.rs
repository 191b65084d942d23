pub mod analyze;
pub mod clean;
pub mod cli;
pub mod config;
pub mod convert;
pub mod encoding;
pub mod error;
pub mod fields;
pub mod header;
pub mod io_utils;
pub mod lookup;
pub mod salvage;
pub mod sql;
pub mod structure;
pub mod table;
pub mod transcode;

use std::{env, sync::OnceLock};

use anyhow::Result;
use clap::Parser;
use log::LevelFilter;

use crate::cli::{Cli, Commands};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("catalog_migrate", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Detect(args) => handle_detect(&args),
        Commands::Transcode(args) => transcode::execute(&args),
        Commands::Analyze(args) => analyze::execute(&args),
        Commands::Convert(args) => convert::execute(&args),
        Commands::Salvage(args) => salvage::execute(&args),
    }
}

fn handle_detect(args: &cli::DetectArgs) -> Result<()> {
    let guess = encoding::detect_file(&args.input, args.sample_bytes)?;
    let confidence = guess
        .confidence
        .map(|value| format!("{value:.2}"))
        .unwrap_or_else(|| "unknown".to_string());
    println!("encoding: {}", guess.label);
    println!("confidence: {confidence}");
    Ok(())
}
