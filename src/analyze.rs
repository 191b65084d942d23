//! Structural report for a file of unknown encoding.
//!
//! Terminator and column estimate come from raw bytes. The header preview
//! decodes only the first record, lossily, and shows which column each role
//! resolved to.

use anyhow::Result;
use log::info;

use crate::{
    cli::AnalyzeArgs,
    error::MigrateError,
    fields,
    header::{self, ColumnRoleMap, Role},
    io_utils::{self, TextEncoding},
    structure, table,
};

pub fn header_rows(headers: &[String], roles: &ColumnRoleMap) -> Vec<Vec<String>> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, label)| {
            let role = Role::ALL
                .iter()
                .filter(|role| roles.index(**role) == idx)
                .map(|role| match (role, roles.was_detected(*role)) {
                    (Role::Identifier, true) => "identifier",
                    (Role::Identifier, false) => "identifier (default)",
                    (Role::ModelNumber, true) => "model number",
                    (Role::ModelNumber, false) => "model number (default)",
                })
                .collect::<Vec<_>>()
                .join(", ");
            vec![idx.to_string(), label.clone(), role]
        })
        .collect()
}

pub fn execute(args: &AnalyzeArgs) -> Result<()> {
    let encoding = match args.input_encoding.as_deref() {
        Some(label) => io_utils::resolve_encoding(label)?,
        None => TextEncoding::utf8(),
    };
    let bytes = io_utils::read_input(&args.input)?;
    info!("Analyzing {:?} ({} byte(s))", args.input, bytes.len());

    let report = structure::analyze(&bytes);
    structure::log_report(&report);

    let records = structure::split_records(&bytes, report.terminator);
    info!("{} non-blank record(s)", records.len());
    let header_record = records
        .first()
        .ok_or_else(|| MigrateError::EmptyInput(args.input.clone()))?;
    let decoded = io_utils::decode_lossy(header_record, encoding);
    let headers = fields::parse_line(decoded.text.trim());
    if headers.len() != report.column_estimate {
        info!(
            "Quote-aware header split found {} column(s)",
            headers.len()
        );
    }
    let roles = header::resolve_roles(&headers);
    roles.log_summary();

    let table_headers = ["#", "header", "role"]
        .iter()
        .map(|h| h.to_string())
        .collect::<Vec<_>>();
    table::print_table(&table_headers, &header_rows(&headers, &roles));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_rows_label_resolved_roles() {
        let headers = vec!["No".to_string(), "型式".to_string(), "商品名".to_string()];
        let roles = header::resolve_roles(&headers);
        let rows = header_rows(&headers, &roles);
        assert_eq!(rows[0][2], "identifier");
        assert_eq!(rows[1][2], "model number");
        assert_eq!(rows[2][2], "");
    }
}
