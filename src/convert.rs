//! Quote-aware catalog conversion: decoded text in, numbered SQL scripts out.
//!
//! Every non-blank line after the header is split by [`fields::parse_line`].
//! Lines whose field count differs from the header are rejected. The rest are
//! converted one at a time; a conversion error skips that row and nothing
//! else.

use std::path::Path;

use anyhow::{Context, Result};
use log::{info, warn};

use crate::{
    cli::{ConvertArgs, InventoryMode},
    config::MigrationConfig,
    encoding,
    error::{MigrateError, RowDiagnostics, SkipReason},
    fields,
    header::{self, ColumnRoleMap, HeaderIndex},
    io_utils::{self, TextEncoding},
    sql::{self, InsertBatch, SqlValue},
};

pub const PRODUCT_NAME: &str = "商品名";
pub const CATEGORY: &str = "カテゴリ";
pub const MANUFACTURER: &str = "メーカー";
pub const PRICE: &str = "価格";
pub const SIZE: &str = "サイズ";
pub const SIZE_UNIT: &str = "サイズ単位";
pub const COLOR: &str = "カラー";
pub const FEATURES: &str = "特徴";
pub const SERIES: &str = "シリーズ";
pub const RELEASE_DATE: &str = "発売日";
pub const WARRANTY_PERIOD: &str = "保証期間";
pub const ENERGY_RATING: &str = "省エネ評価";
pub const CURRENT_STOCK: &str = "在庫数";
pub const STOCK_STATUS: &str = "在庫状況";
pub const WAREHOUSE_CODE: &str = "倉庫コード";
pub const INCOMING_QUANTITY: &str = "入荷数";
pub const INCOMING_DATE: &str = "入荷日";
pub const OUTGOING_QUANTITY: &str = "出荷数";
pub const OUTGOING_DATE: &str = "出荷日";

const DEFAULT_RELEASE_DATE: &str = "2023-01-01";
const DEFAULT_WARRANTY_PERIOD: i64 = 1;

pub const PRODUCTS_FILE: &str = "01_products.sql";
pub const INVENTORY_FILE: &str = "02_inventory.sql";
pub const INCOMING_FILE: &str = "03_incoming_shipments.sql";
pub const OUTGOING_FILE: &str = "04_outgoing_shipments.sql";

#[derive(Debug)]
pub struct Conversion {
    pub headers: Vec<String>,
    pub roles: ColumnRoleMap,
    pub data_rows: usize,
    pub products: InsertBatch,
    pub inventory: Option<InsertBatch>,
    pub incoming: Option<InsertBatch>,
    pub outgoing: Option<InsertBatch>,
    pub diagnostics: RowDiagnostics,
}

/// Everything one source row contributes to the output batches.
#[derive(Debug, Clone, PartialEq)]
struct ConvertedRow {
    product_id: i64,
    product: Vec<SqlValue>,
    inventory: Option<Vec<SqlValue>>,
    incoming: Option<Vec<SqlValue>>,
    outgoing: Option<Vec<SqlValue>>,
}

struct RowContext<'a> {
    roles: &'a ColumnRoleMap,
    columns: HeaderIndex,
    headers: &'a [String],
    config: &'a MigrationConfig,
    mode: InventoryMode,
}

impl RowContext<'_> {
    fn role_field<'r>(&self, row: &'r [String], index: usize) -> Result<&'r str, SkipReason> {
        row.get(index)
            .map(String::as_str)
            .ok_or(SkipReason::MissingColumn { index })
    }

    fn label(&self, index: usize) -> String {
        self.headers
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("#{index}"))
    }

    fn text(&self, row: &[String], column: &str) -> SqlValue {
        SqlValue::text(self.columns.get(row, column).unwrap_or(""))
    }

    fn float(&self, row: &[String], column: &str, default: f64) -> Result<SqlValue, SkipReason> {
        match self.columns.get(row, column) {
            None => Ok(SqlValue::Float(default)),
            Some(value) => parse_float(column, value).map(SqlValue::Float),
        }
    }

    fn integer(&self, row: &[String], column: &str, default: i64) -> Result<i64, SkipReason> {
        match self.columns.get(row, column) {
            None => Ok(default),
            Some(value) => parse_integer(column, value),
        }
    }

    fn convert(&self, row: &[String]) -> Result<ConvertedRow, SkipReason> {
        let id_index = self.roles.identifier();
        let product_id = parse_integer(&self.label(id_index), self.role_field(row, id_index)?)?;
        let model_number = self.role_field(row, self.roles.model_number())?;

        let category = self.columns.get(row, CATEGORY).unwrap_or("");
        let manufacturer = self.columns.get(row, MANUFACTURER).unwrap_or("");
        let product = vec![
            SqlValue::Integer(product_id),
            self.text(row, PRODUCT_NAME),
            SqlValue::text(model_number),
            SqlValue::Integer(self.config.categories.resolve(category).into()),
            SqlValue::Integer(self.config.manufacturers.resolve(manufacturer).into()),
            self.float(row, PRICE, 0.0)?,
            self.float(row, SIZE, 0.0)?,
            self.text(row, SIZE_UNIT),
            self.text(row, COLOR),
            self.text(row, FEATURES),
            self.text(row, SERIES),
            SqlValue::text(
                self.columns
                    .get(row, RELEASE_DATE)
                    .unwrap_or(DEFAULT_RELEASE_DATE),
            ),
            SqlValue::Integer(self.integer(row, WARRANTY_PERIOD, DEFAULT_WARRANTY_PERIOD)?),
            self.text(row, ENERGY_RATING),
        ];

        let mut converted = ConvertedRow {
            product_id,
            product,
            inventory: None,
            incoming: None,
            outgoing: None,
        };
        if self.mode == InventoryMode::Source {
            converted.inventory = Some(vec![
                SqlValue::Integer(product_id),
                self.text(row, WAREHOUSE_CODE),
                SqlValue::Integer(self.integer(row, CURRENT_STOCK, 0)?),
                self.text(row, STOCK_STATUS),
            ]);
            converted.incoming =
                self.shipment(row, product_id, INCOMING_QUANTITY, INCOMING_DATE);
            converted.outgoing =
                self.shipment(row, product_id, OUTGOING_QUANTITY, OUTGOING_DATE);
        }
        Ok(converted)
    }

    /// A shipment row exists only with a date and a positive quantity.
    fn shipment(
        &self,
        row: &[String],
        product_id: i64,
        quantity_column: &str,
        date_column: &str,
    ) -> Option<Vec<SqlValue>> {
        let date = self.columns.get(row, date_column).filter(|d| !d.is_empty())?;
        let quantity = self
            .columns
            .get(row, quantity_column)
            .and_then(|q| q.parse::<i64>().ok())
            .filter(|q| *q > 0)?;
        Some(vec![
            SqlValue::Integer(product_id),
            SqlValue::Integer(quantity),
            SqlValue::text(date),
        ])
    }
}

fn parse_integer(column: &str, value: &str) -> Result<i64, SkipReason> {
    value
        .trim()
        .parse::<i64>()
        .map_err(|_| SkipReason::InvalidInteger {
            column: column.to_string(),
            value: value.to_string(),
        })
}

fn parse_float(column: &str, value: &str) -> Result<f64, SkipReason> {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|parsed| parsed.is_finite())
        .ok_or_else(|| SkipReason::InvalidFloat {
            column: column.to_string(),
            value: value.to_string(),
        })
}

/// Converts decoded catalog text. Returns `None` when there is no header line.
pub fn convert_text(text: &str, config: &MigrationConfig, mode: InventoryMode) -> Option<Conversion> {
    let mut lines = text
        .lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty());

    let (_, header_line) = lines.next()?;
    let headers = fields::parse_line(header_line);
    let roles = header::resolve_roles(&headers);
    let context = RowContext {
        roles: &roles,
        columns: HeaderIndex::new(&headers),
        headers: &headers,
        config,
        mode,
    };

    let mut products = InsertBatch::new("products", &sql::PRODUCT_COLUMNS);
    let mut inventory = InsertBatch::new("inventory", &sql::SOURCE_INVENTORY_COLUMNS);
    let mut incoming = InsertBatch::new("incoming_shipments", &sql::SHIPMENT_COLUMNS);
    let mut outgoing = InsertBatch::new("outgoing_shipments", &sql::SHIPMENT_COLUMNS);
    let mut product_ids = Vec::new();
    let mut diagnostics = RowDiagnostics::new();
    let mut data_rows = 0usize;

    for (line_no, line) in lines {
        data_rows += 1;
        let row = fields::parse_line(line);
        if row.len() != headers.len() {
            diagnostics.record(
                line_no,
                SkipReason::FieldCount {
                    expected: headers.len(),
                    found: row.len(),
                },
                line,
            );
            continue;
        }
        match context.convert(&row) {
            Ok(converted) => {
                product_ids.push(converted.product_id);
                products.push(converted.product);
                if let Some(values) = converted.inventory {
                    inventory.push(values);
                }
                if let Some(values) = converted.incoming {
                    incoming.push(values);
                }
                if let Some(values) = converted.outgoing {
                    outgoing.push(values);
                }
            }
            Err(reason) => diagnostics.record(line_no, reason, line),
        }
    }

    let (inventory, incoming, outgoing) = match mode {
        InventoryMode::None => (None, None, None),
        InventoryMode::Source => (Some(inventory), Some(incoming), Some(outgoing)),
        InventoryMode::Synthetic => (
            Some(sql::synthetic_inventory(
                product_ids,
                &config.warehouse_code,
                config.placeholder_stock,
            )),
            None,
            None,
        ),
    };

    Some(Conversion {
        headers,
        roles,
        data_rows,
        products,
        inventory,
        incoming,
        outgoing,
        diagnostics,
    })
}

pub fn execute(args: &ConvertArgs) -> Result<()> {
    let config = MigrationConfig::resolve(args.config.as_deref())?
        .with_database(args.database.as_deref())?;
    let bytes = io_utils::read_input(&args.input)?;
    let input_encoding = resolve_input_encoding(args.input_encoding.as_deref(), &bytes)?;
    info!(
        "Converting {:?} decoded as {}",
        args.input,
        input_encoding.name()
    );
    let text = io_utils::decode_input(&bytes, input_encoding, &args.input);

    let conversion = convert_text(&text, &config, args.inventory)
        .ok_or_else(|| MigrateError::EmptyInput(args.input.clone()))?;
    info!("Header has {} column(s)", conversion.headers.len());
    conversion.roles.log_summary();
    report_diagnostics(&conversion);

    let database = config.database.as_str();
    let output_dir = args.output_dir.as_path();
    conversion
        .products
        .write(&output_dir.join(PRODUCTS_FILE), "product data", database)?;
    if let Some(batch) = &conversion.inventory {
        batch.write(&output_dir.join(INVENTORY_FILE), "inventory data", database)?;
    }
    if let Some(batch) = &conversion.incoming {
        batch.write(&output_dir.join(INCOMING_FILE), "incoming shipments", database)?;
    }
    if let Some(batch) = &conversion.outgoing {
        batch.write(&output_dir.join(OUTGOING_FILE), "outgoing shipments", database)?;
    }

    if let Some(path) = &args.rejects {
        write_rejects(path, &conversion.diagnostics)
            .with_context(|| format!("Writing rejected rows to {path:?}"))?;
    }
    Ok(())
}

fn resolve_input_encoding(label: Option<&str>, bytes: &[u8]) -> Result<TextEncoding> {
    match label {
        Some(label) if label.trim().eq_ignore_ascii_case("auto") => {
            let sample = &bytes[..bytes.len().min(encoding::DEFAULT_SAMPLE_BYTES)];
            let guess = encoding::detect_encoding(sample, sample.len() == bytes.len());
            Ok(io_utils::resolve_encoding(&guess.label)?)
        }
        Some(label) => Ok(io_utils::resolve_encoding(label)?),
        None => Ok(TextEncoding::utf8()),
    }
}

fn report_diagnostics(conversion: &Conversion) {
    let diagnostics = &conversion.diagnostics;
    info!(
        "{} data row(s): {} converted, {} rejected for field count, {} skipped on error",
        conversion.data_rows,
        conversion.products.len(),
        diagnostics.mismatch_count(),
        diagnostics.failure_count()
    );
    let unreported = diagnostics
        .failure_count()
        .saturating_sub(diagnostics.samples().len());
    if unreported > 0 {
        warn!("{unreported} further row error(s) not shown");
    }
}

pub fn write_rejects(path: &Path, diagnostics: &RowDiagnostics) -> Result<()> {
    let mut writer = io_utils::open_csv_writer(path)?;
    writer.write_record(["line", "reason", "raw"])?;
    for row in diagnostics.skipped() {
        writer.write_record([row.line.to_string(), row.reason.to_string(), row.raw.clone()])?;
    }
    writer.flush()?;
    info!(
        "Wrote {} rejected row(s) to {:?}",
        diagnostics.skipped().len(),
        path
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(text: &str, mode: InventoryMode) -> Conversion {
        convert_text(text, &MigrationConfig::default(), mode).expect("header present")
    }

    #[test]
    fn blank_text_has_no_header() {
        assert!(convert_text("\n  \n", &MigrationConfig::default(), InventoryMode::None).is_none());
    }

    #[test]
    fn quoted_model_number_keeps_embedded_comma() {
        let conversion = convert(
            "No,型式,商品名\n1,\"ABC-123, v2\",Widget\n",
            InventoryMode::None,
        );
        assert_eq!(conversion.products.len(), 1);
        let row = &conversion.products.rows()[0];
        assert_eq!(row[0], SqlValue::Integer(1));
        assert_eq!(row[1], SqlValue::text("Widget"));
        assert_eq!(row[2], SqlValue::text("ABC-123, v2"));
        assert_eq!(row[3], SqlValue::Integer(1));
        assert_eq!(row[5], SqlValue::Float(0.0));
        assert_eq!(row[11], SqlValue::text("2023-01-01"));
        assert_eq!(row[12], SqlValue::Integer(1));
    }

    #[test]
    fn bad_numbers_skip_only_their_row() {
        let conversion = convert(
            "No,型式,価格\n1,A,100\nx,B,200\n3,C,cheap\n4,D,400\n",
            InventoryMode::None,
        );
        assert_eq!(conversion.products.len(), 2);
        assert_eq!(conversion.diagnostics.failure_count(), 2);
        assert_eq!(conversion.diagnostics.samples()[0].line, 3);
        assert!(matches!(
            conversion.diagnostics.samples()[1].reason,
            SkipReason::InvalidFloat { .. }
        ));
    }

    #[test]
    fn field_count_mismatch_is_rejected() {
        let conversion = convert("No,型式\n1,A,extra\n2,B\n", InventoryMode::None);
        assert_eq!(conversion.products.len(), 1);
        assert_eq!(conversion.diagnostics.mismatch_count(), 1);
        assert_eq!(conversion.diagnostics.failure_count(), 0);
    }

    #[test]
    fn source_inventory_and_shipments_follow_stock_columns() {
        let text = "No,型式,在庫数,入荷数,入荷日,出荷数,出荷日,在庫状況,倉庫コード\n\
                    1,A,5,10,2024-01-02,5,2024-02-01,在庫あり,OS02\n\
                    2,B,10,10,2024-01-03,0,,残りわずか,TK01\n";
        let conversion = convert(text, InventoryMode::Source);
        let inventory = conversion.inventory.expect("inventory");
        assert_eq!(
            inventory.rows()[0],
            vec![
                SqlValue::Integer(1),
                SqlValue::text("OS02"),
                SqlValue::Integer(5),
                SqlValue::text("在庫あり")
            ]
        );
        assert_eq!(conversion.incoming.expect("incoming").len(), 2);
        let outgoing = conversion.outgoing.expect("outgoing");
        assert_eq!(outgoing.len(), 1);
        assert_eq!(outgoing.rows()[0][1], SqlValue::Integer(5));
    }

    #[test]
    fn synthetic_inventory_tracks_converted_products() {
        let conversion = convert("No,型式\n7,A\nbad,B\n9,C\n", InventoryMode::Synthetic);
        let inventory = conversion.inventory.expect("inventory");
        let ids: Vec<_> = inventory.rows().iter().map(|row| row[0].clone()).collect();
        assert_eq!(ids, vec![SqlValue::Integer(7), SqlValue::Integer(9)]);
        assert!(conversion.incoming.is_none());
    }
}
