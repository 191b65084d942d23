//! Optional YAML configuration for the SQL emitting commands.
//!
//! ```yaml
//! database: electronics_inventory
//! warehouse_code: TK01
//! placeholder_stock: 50
//! categories:
//!   テレビ: 1
//! manufacturers:
//!   ソニー: 1
//! ```
//!
//! Every key is optional. A lookup dictionary given here replaces the built-in
//! one wholesale rather than merging with it.

use std::{collections::HashMap, fs::File, io::BufReader, path::Path};

use anyhow::{Context, Result};
use log::warn;
use serde::Deserialize;

use crate::{
    error::MigrateError,
    lookup::{DEFAULT_KEY, LookupTable},
};

pub const DEFAULT_DATABASE: &str = "electronics_inventory";
pub const DEFAULT_WAREHOUSE: &str = "TK01";
pub const DEFAULT_PLACEHOLDER_STOCK: i64 = 50;

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    database: Option<String>,
    warehouse_code: Option<String>,
    placeholder_stock: Option<i64>,
    categories: Option<HashMap<String, u32>>,
    manufacturers: Option<HashMap<String, u32>>,
}

#[derive(Debug, Clone)]
pub struct MigrationConfig {
    pub database: String,
    pub warehouse_code: String,
    pub placeholder_stock: i64,
    pub categories: LookupTable,
    pub manufacturers: LookupTable,
}

impl Default for MigrationConfig {
    fn default() -> Self {
        Self {
            database: DEFAULT_DATABASE.to_string(),
            warehouse_code: DEFAULT_WAREHOUSE.to_string(),
            placeholder_stock: DEFAULT_PLACEHOLDER_STOCK,
            categories: LookupTable::categories(),
            manufacturers: LookupTable::manufacturers(),
        }
    }
}

impl MigrationConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let file = File::open(path).with_context(|| format!("Opening config file {path:?}"))?;
        let raw: RawConfig = serde_yaml::from_reader(BufReader::new(file))
            .with_context(|| format!("Parsing config YAML {path:?}"))?;
        Self::from_raw(raw).map_err(Into::into)
    }

    pub fn from_yaml_str(input: &str) -> Result<Self> {
        let raw: RawConfig = serde_yaml::from_str(input).context("Parsing config YAML")?;
        Self::from_raw(raw).map_err(Into::into)
    }

    /// Loads `path` when given, otherwise the built-in defaults.
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn from_raw(raw: RawConfig) -> Result<Self, MigrateError> {
        let mut config = Self::default();
        if let Some(database) = raw.database {
            if !is_identifier(&database) {
                return Err(MigrateError::Config(format!(
                    "database name '{database}' must be alphanumeric or underscore"
                )));
            }
            config.database = database;
        }
        if let Some(code) = raw.warehouse_code {
            config.warehouse_code = code;
        }
        if let Some(stock) = raw.placeholder_stock {
            config.placeholder_stock = stock;
        }
        if let Some(categories) = raw.categories {
            config.categories = checked_table("category", categories)?;
        }
        if let Some(manufacturers) = raw.manufacturers {
            config.manufacturers = checked_table("manufacturer", manufacturers)?;
        }
        Ok(config)
    }

    pub fn with_database(mut self, database: Option<&str>) -> Result<Self, MigrateError> {
        if let Some(database) = database {
            if !is_identifier(database) {
                return Err(MigrateError::Config(format!(
                    "database name '{database}' must be alphanumeric or underscore"
                )));
            }
            self.database = database.to_string();
        }
        Ok(self)
    }
}

fn checked_table(
    name: &'static str,
    entries: HashMap<String, u32>,
) -> Result<LookupTable, MigrateError> {
    if let Some((label, _)) = entries.iter().find(|(_, key)| **key == 0) {
        return Err(MigrateError::Config(format!(
            "{name} '{label}' must map to a positive key"
        )));
    }
    let table = LookupTable::new(name, entries);
    if table.is_empty() {
        warn!("Configured {name} table is empty; every {name} maps to key {DEFAULT_KEY}");
    }
    Ok(table)
}

fn is_identifier(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|ch| ch.is_ascii_alphanumeric() || ch == '_')
}
