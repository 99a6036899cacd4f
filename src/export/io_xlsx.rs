use calamine::{open_workbook, DataType, Range, Reader, Xlsx};
use log::debug;
use snafu::prelude::*;

use crate::export::{io_common::*, *};

/// Reads the first row as the header and all the following non-blank rows.
pub fn read_xlsx_table(path: &str, worksheet_name: Option<&str>) -> GisResult<Table> {
    let wrange = get_range(path, worksheet_name)?;

    let mut iter = wrange.rows();
    let header_cells = iter.next().context(EmptyInputSnafu { path })?;
    let header: Vec<String> = header_cells
        .iter()
        .map(|c| read_cell(c, path, 1))
        .collect::<GisResult<_>>()?;
    debug!("read_xlsx_table: header: {:?}", header);

    let mut rows: Vec<Vec<String>> = Vec::new();
    for (idx, row) in iter.enumerate() {
        // Rows are numbered as in the spreadsheet, the header being the first one.
        let lineno = (idx + 2) as u64;
        let cells: Vec<String> = row
            .iter()
            .map(|c| read_cell(c, path, lineno))
            .collect::<GisResult<_>>()?;
        if is_blank_row(&cells) {
            debug!("read_xlsx_table: row {}: skipping blank row", lineno);
            continue;
        }
        rows.push(cells);
    }
    Ok(assemble_table(header, rows))
}

fn read_cell(cell: &DataType, path: &str, lineno: u64) -> GisResult<String> {
    match cell {
        DataType::String(s) => Ok(s.clone()),
        DataType::Float(f) => Ok(format_number(*f)),
        DataType::Int(i) => Ok(i.to_string()),
        DataType::Bool(b) => Ok(b.to_string()),
        // Dates are kept as their serial number.
        DataType::DateTime(f) => Ok(format_number(*f)),
        DataType::Empty => Ok("".to_string()),
        DataType::Error(_) => ExcelWrongCellTypeSnafu {
            path,
            lineno,
            content: format!("{:?}", cell),
        }
        .fail(),
        #[allow(unreachable_patterns)]
        _ => Ok(format!("{:?}", cell)),
    }
}

/// Integral numbers are written without decimals, so that a division code
/// stored as a number reads the same as when stored as text.
fn format_number(f: f64) -> String {
    if f.fract() == 0.0 && f.abs() < 1e15 {
        format!("{}", f as i64)
    } else {
        f.to_string()
    }
}

fn get_range(path: &str, worksheet_name: Option<&str>) -> GisResult<Range<DataType>> {
    debug!(
        "read_xlsx_table: path: {:?} worksheet: {:?}",
        path, worksheet_name
    );
    let mut workbook: Xlsx<_> = open_workbook(path).context(OpeningExcelSnafu { path })?;

    // A worksheet name was provided, use it.
    if let Some(name) = worksheet_name {
        let wrange = workbook
            .worksheet_range(name)
            .context(MissingWorksheetSnafu { path, name })?
            .context(OpeningExcelSnafu { path })?;
        Ok(wrange)
    } else {
        let all_worksheets = workbook.worksheets();
        match all_worksheets.as_slice() {
            [] => EmptyInputSnafu { path }.fail(),
            [(name, wrange)] => {
                debug!("read_xlsx_table: path: {:?} worksheet: {:?}", path, name);
                Ok(wrange.clone())
            }
            _ => AmbiguousWorksheetSnafu {
                path,
                names: all_worksheets
                    .iter()
                    .map(|(name, _)| name.clone())
                    .collect::<Vec<String>>(),
            }
            .fail(),
        }
    }
}
