//! Byte-level conversion for files that will not decode cleanly.
//!
//! Records are split on the detected terminator and fields on raw comma
//! bytes, with no quote handling. Product ids are the 1-based data-row
//! ordinal, model numbers keep only their ASCII bytes, and inventory is one
//! placeholder row per data record.

use anyhow::Result;
use log::info;

use crate::{
    cli::SalvageArgs,
    clean::strip_non_ascii,
    config::MigrationConfig,
    error::{MigrateError, RowDiagnostics, SkipReason},
    fields,
    header::{self, ColumnRoleMap},
    io_utils,
    sql::{self, InsertBatch, SqlValue},
    structure::{self, StructureReport},
};

pub const PRODUCTS_FILE: &str = "simple_products.sql";
pub const INVENTORY_FILE: &str = "simple_inventory.sql";

#[derive(Debug)]
pub struct Salvage {
    pub structure: StructureReport,
    pub headers: Vec<String>,
    pub roles: ColumnRoleMap,
    pub data_rows: usize,
    pub products: InsertBatch,
    pub inventory: InsertBatch,
    pub diagnostics: RowDiagnostics,
}

/// Salvages `bytes`. Returns `None` when no non-blank record exists.
pub fn salvage_bytes(bytes: &[u8], config: &MigrationConfig) -> Option<Salvage> {
    let structure = structure::analyze(bytes);
    let records = structure::numbered_records(bytes, structure.terminator);
    let ((_, header_record), data) = records.split_first()?;

    let headers = fields::split_bytes(header_record)
        .into_iter()
        .map(|field| String::from_utf8_lossy(field).into_owned())
        .collect::<Vec<_>>();
    let roles = header::resolve_roles(&headers);

    let mut products = InsertBatch::new("products", &sql::SIMPLE_PRODUCT_COLUMNS);
    let mut diagnostics = RowDiagnostics::new();
    for (ordinal, (line, record)) in data.iter().enumerate().map(|(idx, r)| (idx + 1, r)) {
        let row = fields::split_bytes(record);
        if roles.identifier() >= row.len() {
            diagnostics.record(
                *line,
                SkipReason::MissingColumn {
                    index: roles.identifier(),
                },
                &String::from_utf8_lossy(record),
            );
            continue;
        }
        let model_number = match row.get(roles.model_number()) {
            Some(raw) => strip_non_ascii(raw),
            None => format!("MODEL-{ordinal}"),
        };
        products.push(vec![
            SqlValue::Integer(ordinal as i64),
            SqlValue::Text(model_number),
        ]);
    }

    let inventory = sql::synthetic_inventory(
        (1..=data.len()).map(|ordinal| ordinal as i64),
        &config.warehouse_code,
        config.placeholder_stock,
    );

    Some(Salvage {
        structure,
        headers,
        roles,
        data_rows: data.len(),
        products,
        inventory,
        diagnostics,
    })
}

pub fn execute(args: &SalvageArgs) -> Result<()> {
    let config = MigrationConfig::resolve(args.config.as_deref())?
        .with_database(args.database.as_deref())?;
    let bytes = io_utils::read_input(&args.input)?;
    info!("Salvaging {:?} ({} byte(s))", args.input, bytes.len());

    let salvage = salvage_bytes(&bytes, &config)
        .ok_or_else(|| MigrateError::EmptyInput(args.input.clone()))?;
    structure::log_report(&salvage.structure);
    info!(
        "Header has {} column(s); {} data record(s)",
        salvage.headers.len(),
        salvage.data_rows
    );
    salvage.roles.log_summary();
    if !salvage.diagnostics.is_empty() {
        info!(
            "{} record(s) skipped without an identifier field",
            salvage.diagnostics.failure_count()
        );
    }

    let database = config.database.as_str();
    salvage.products.write(
        &args.output_dir.join(PRODUCTS_FILE),
        "product data (salvaged)",
        database,
    )?;
    salvage.inventory.write(
        &args.output_dir.join(INVENTORY_FILE),
        "inventory data (placeholder)",
        database,
    )?;
    Ok(())
}
