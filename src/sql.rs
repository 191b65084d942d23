//! Batched INSERT statements and their text serialization.
//!
//! A script is a comment line, a `USE <database>;` directive, and a single
//! multi-row INSERT whose tuples are joined by `,\n`. Numbers are written bare;
//! text is single-quoted after [`escape_sql_literal`]. Nothing else guards
//! against injection.

use std::{fmt, path::Path};

use anyhow::Result;
use itertools::Itertools;
use log::info;

use crate::{clean::escape_sql_literal, io_utils};

#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl SqlValue {
    pub fn text(value: impl Into<String>) -> Self {
        SqlValue::Text(value.into())
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SqlValue::Integer(value) => write!(f, "{value}"),
            // Debug keeps a trailing ".0" on whole numbers, so floats stay floats.
            SqlValue::Float(value) => write!(f, "{value:?}"),
            SqlValue::Text(value) => write!(f, "'{}'", escape_sql_literal(value)),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InsertBatch {
    table: &'static str,
    columns: &'static [&'static str],
    rows: Vec<Vec<SqlValue>>,
}

impl InsertBatch {
    pub fn new(table: &'static str, columns: &'static [&'static str]) -> Self {
        Self {
            table,
            columns,
            rows: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<SqlValue>) {
        debug_assert_eq!(
            row.len(),
            self.columns.len(),
            "tuple width must match the column list of {}",
            self.table
        );
        self.rows.push(row);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<SqlValue>] {
        &self.rows
    }

    pub fn render(&self, comment: &str, database: &str) -> String {
        let mut script = format!("-- {comment}\nUSE {database};\n\n");
        if self.rows.is_empty() {
            script.push_str("-- no rows\n");
            return script;
        }
        script.push_str(&format!(
            "INSERT INTO {} ({}) VALUES\n",
            self.table,
            self.columns.join(", ")
        ));
        let tuples = self
            .rows
            .iter()
            .map(|row| format!("({})", row.iter().join(", ")))
            .join(",\n");
        script.push_str(&tuples);
        script.push_str(";\n");
        script
    }

    pub fn write(&self, path: &Path, comment: &str, database: &str) -> Result<()> {
        io_utils::write_text(path, &self.render(comment, database))?;
        info!(
            "Wrote {} row(s) for {} to {:?}",
            self.rows.len(),
            self.table,
            path
        );
        Ok(())
    }
}

pub const PRODUCT_COLUMNS: [&str; 14] = [
    "product_id",
    "product_name",
    "model_number",
    "category_id",
    "manufacturer_id",
    "price",
    "size",
    "size_unit",
    "color",
    "features",
    "series",
    "release_date",
    "warranty_period",
    "energy_rating",
];

pub const SIMPLE_PRODUCT_COLUMNS: [&str; 2] = ["product_id", "model_number"];

pub const SYNTHETIC_INVENTORY_COLUMNS: [&str; 3] = ["product_id", "warehouse_id", "current_stock"];

pub const SOURCE_INVENTORY_COLUMNS: [&str; 4] =
    ["product_id", "warehouse_id", "current_stock", "stock_status"];

pub const SHIPMENT_COLUMNS: [&str; 3] = ["product_id", "quantity", "shipment_date"];

/// One placeholder inventory row per product id: fixed warehouse, fixed stock.
pub fn synthetic_inventory(
    product_ids: impl IntoIterator<Item = i64>,
    warehouse_code: &str,
    stock: i64,
) -> InsertBatch {
    let mut batch = InsertBatch::new("inventory", &SYNTHETIC_INVENTORY_COLUMNS);
    for product_id in product_ids {
        batch.push(vec![
            SqlValue::Integer(product_id),
            SqlValue::text(warehouse_code),
            SqlValue::Integer(stock),
        ]);
    }
    batch
}
