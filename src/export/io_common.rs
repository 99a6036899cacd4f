use std::path::Path;

use chrono::{Local, NaiveDate};
use snafu::prelude::*;

use crate::export::*;

pub const DEFAULT_FILE_PREFIX: &str = "GIS_204_Export_";

/// The supported formats for the input tables.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub enum Provider {
    Xlsx,
    Csv,
}

/// The provider given explicitly, or the one matching the extension of the file.
pub fn infer_provider(path: &str, provider: Option<&str>) -> GisResult<Provider> {
    let name = match provider {
        Some(p) => p.to_lowercase(),
        None => Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default(),
    };
    match name.as_str() {
        "xlsx" => Ok(Provider::Xlsx),
        "csv" => Ok(Provider::Csv),
        _ => UnknownProviderSnafu {
            provider: name.as_str(),
            path,
        }
        .fail(),
    }
}

pub fn is_blank_row(row: &[String]) -> bool {
    row.iter().all(|c| c.trim().is_empty())
}

/// Assembles a table from a header and rows of possibly different lengths.
///
/// All the rows are padded to the widest row. Cells beyond the header get a
/// generated column name.
pub fn assemble_table(header: Vec<String>, rows: Vec<Vec<String>>) -> Table {
    let width = rows
        .iter()
        .map(|r| r.len())
        .max()
        .unwrap_or(0)
        .max(header.len());
    let mut columns = header;
    for idx in columns.len()..width {
        columns.push(format!("Column{}", idx + 1));
    }
    let rows = rows
        .into_iter()
        .map(|mut r| {
            r.resize(width, String::new());
            r
        })
        .collect();
    Table { columns, rows }
}

/// The name of the export file: the prefix and the date as `06Nov24`.
pub fn export_file_name(prefix: &str, date: NaiveDate) -> String {
    format!("{}{}.csv", prefix, date.format("%d%b%y"))
}

pub fn today_file_name(prefix: &str) -> String {
    export_file_name(prefix, Local::now().date_naive())
}
