//! Read side of workbook I/O, backed by calamine
//!
//! Worksheets are materialized into the core [`Sheet`] model with absolute
//! 1-based coordinates, so column resolution behaves the same regardless of
//! where the used range of a worksheet starts.

use std::path::Path;

use calamine::{open_workbook, Data, Reader, Xlsx};
use testtrack_core::{CellValue, Sheet};

use crate::error::{Result, XlsxError};

fn open<P: AsRef<Path>>(path: P) -> Result<Xlsx<std::io::BufReader<std::fs::File>>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(XlsxError::MissingFile(path.to_path_buf()));
    }
    open_workbook(path)
        .map_err(|e| XlsxError::Workbook(format!("failed to open {}: {e}", path.display())))
}

fn to_cell(data: &Data) -> CellValue {
    #[allow(clippy::cast_precision_loss)] // row ids and counts, well within f64 range
    match data {
        Data::Empty => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        // Booleans, dates, and error cells are only ever displayed
        other => CellValue::Text(other.to_string()),
    }
}

/// List the worksheet names of a workbook, in workbook order.
///
/// # Errors
///
/// Returns [`XlsxError::MissingFile`] or [`XlsxError::Workbook`] when the
/// file is absent or unreadable.
pub fn sheet_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    Ok(open(path)?.sheet_names())
}

/// Read one named worksheet into the core sheet model.
///
/// # Errors
///
/// Returns [`XlsxError::MissingSheet`] when the workbook has no sheet with
/// that name.
pub fn read_sheet<P: AsRef<Path>>(path: P, name: &str) -> Result<Sheet> {
    let mut workbook = open(path)?;
    if !workbook.sheet_names().iter().any(|n| n == name) {
        return Err(XlsxError::MissingSheet(name.to_string()));
    }
    let range = workbook
        .worksheet_range(name)
        .map_err(|e| XlsxError::Workbook(format!("failed to read sheet {name:?}: {e}")))?;
    Ok(range_to_sheet(name, &range))
}

/// Read every worksheet of a workbook, in workbook order.
///
/// # Errors
///
/// Returns [`XlsxError::Workbook`] when any sheet fails to read.
pub fn read_workbook<P: AsRef<Path>>(path: P) -> Result<Vec<Sheet>> {
    let mut workbook = open(path)?;
    let names = workbook.sheet_names();
    let mut sheets = Vec::with_capacity(names.len());
    for name in &names {
        let range = workbook
            .worksheet_range(name)
            .map_err(|e| XlsxError::Workbook(format!("failed to read sheet {name:?}: {e}")))?;
        sheets.push(range_to_sheet(name, &range));
    }
    Ok(sheets)
}

/// Convert a calamine range into a [`Sheet`], restoring absolute coordinates.
///
/// calamine ranges start at the first used cell; leading empty rows and
/// columns are padded back in so that (row 1, col 1) is always cell A1.
fn range_to_sheet(name: &str, range: &calamine::Range<Data>) -> Sheet {
    let (height, width) = range.get_size();
    let (start_row, start_col) = range.start().unwrap_or((0, 0));

    let mut rows: Vec<Vec<CellValue>> = Vec::with_capacity(start_row as usize + height);
    rows.resize_with(start_row as usize, Vec::new);
    for r in 0..height {
        let mut row = vec![CellValue::Empty; start_col as usize];
        row.extend((0..width).map(|c| to_cell(range.get((r, c)).unwrap_or(&Data::Empty))));
        rows.push(row);
    }
    Sheet::from_rows(name, rows)
}
