// Primitives for reading and writing CSV files.

use std::fs::File;

use log::debug;
use snafu::prelude::*;

use crate::export::{io_common::*, *};

pub fn read_csv_table(path: &str) -> GisResult<Table> {
    let mut records = get_records(path)?;

    let header: Vec<String> = match records.next() {
        Some(line_r) => line_r
            .context(CsvLineParseSnafu { path, lineno: 1usize })?
            .iter()
            // A byte order mark may start the first header.
            .map(|s| s.trim_start_matches('\u{feff}').to_string())
            .collect(),
        None => return EmptyInputSnafu { path }.fail(),
    };
    debug!("read_csv_table: header: {:?}", header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, line_r) in records.enumerate() {
        // The header is the first line.
        let lineno = idx + 2;
        let line = line_r.context(CsvLineParseSnafu { path, lineno })?;
        let row: Vec<String> = line.iter().map(|s| s.to_string()).collect();
        if is_blank_row(&row) {
            debug!("read_csv_table: lineno: {:?}: skipping blank row", lineno);
            continue;
        }
        rows.push(row);
    }
    Ok(assemble_table(header, rows))
}

fn get_records(path: &str) -> GisResult<csv::StringRecordsIntoIter<File>> {
    let rdr = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_path(path)
        .context(CsvOpenSnafu { path })?;
    Ok(rdr.into_records())
}

/// Serializes a table to CSV, with the header as the first record.
/// Records end with CRLF, which is what spreadsheet and GIS tools expect.
pub fn write_csv_string(table: &Table) -> GisResult<String> {
    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::CRLF)
        .from_writer(vec![]);
    wtr.write_record(&table.columns)
        .context(CsvWriteSnafu {})?;
    for row in table.rows.iter() {
        wtr.write_record(row).context(CsvWriteSnafu {})?;
    }
    let bytes = match wtr.into_inner() {
        Ok(bytes) => bytes,
        Err(e) => whatever!("Cannot flush the CSV export: {}", e),
    };
    match String::from_utf8(bytes) {
        Ok(s) => Ok(s),
        Err(e) => whatever!("The CSV export is not valid UTF-8: {}", e),
    }
}
