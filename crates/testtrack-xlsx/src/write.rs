//! Write side of workbook I/O, backed by umya-spreadsheet
//!
//! Mutations follow the load → mutate in memory → save cycle of the original
//! workflow: the workbook file is rewritten in place and the save is the only
//! commit point. A crash before the save leaves the file untouched and the
//! pending edits lost; there is no partial save and no rollback.

use std::path::Path;

use serde::Serialize;
use testtrack_core::{FixAnnotation, TrackError, FIX_SUMMARY_HEADER, STATUS_HEADER};
use umya_spreadsheet::{Spreadsheet, Worksheet};

use crate::error::{Result, XlsxError};

/// Where a batch of fixes landed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FixOutcome {
    /// Number of rows mutated
    pub updated: usize,
    /// True if the `Fix Summary` column was created by this batch
    pub created_column: bool,
    /// 1-based `Status` column index
    pub status_col: u32,
    /// 1-based `Fix Summary` column index
    pub fix_summary_col: u32,
}

/// Resolve a column by header substring on a live worksheet.
///
/// Same contract as the core resolver: leftmost header whose text contains
/// `needle`, case-sensitive, `None` when absent.
#[must_use]
pub fn find_header_column(sheet: &Worksheet, needle: &str) -> Option<u32> {
    (1..=sheet.get_highest_column()).find(|&col| sheet.get_value((col, 1)).contains(needle))
}

/// Ensure the `Fix Summary` column exists on a live worksheet.
///
/// Returns `(status_col, fix_summary_col, created)`. When created, the new
/// column sits immediately right of `Status` with a bold header, and every
/// column previously right of `Status` has shifted by one. The `Status`
/// index itself stays valid because the insertion happens to its right.
///
/// # Errors
///
/// Returns [`XlsxError::MissingSheet`] for an unknown sheet name and
/// [`TrackError::MissingColumn`] (wrapped) when the sheet has no `Status`
/// column to anchor the insertion.
pub fn ensure_fix_summary_column(
    book: &mut Spreadsheet,
    sheet_name: &str,
) -> Result<(u32, u32, bool)> {
    let sheet = book
        .get_sheet_by_name(sheet_name)
        .ok_or_else(|| XlsxError::MissingSheet(sheet_name.to_string()))?;

    let status = find_header_column(sheet, STATUS_HEADER)
        .ok_or_else(|| TrackError::MissingColumn(STATUS_HEADER.to_string()))?;
    if let Some(fix) = find_header_column(sheet, FIX_SUMMARY_HEADER) {
        return Ok((status, fix, false));
    }

    let fix = status + 1;
    book.insert_new_column_by_index(sheet_name, &fix, &1);
    let sheet = book
        .get_sheet_by_name_mut(sheet_name)
        .ok_or_else(|| XlsxError::MissingSheet(sheet_name.to_string()))?;
    sheet.get_cell_mut((fix, 1)).set_value(FIX_SUMMARY_HEADER);
    sheet.get_style_mut((fix, 1)).get_font_mut().set_bold(true);
    log::info!("created {FIX_SUMMARY_HEADER:?} column at index {fix} in sheet {sheet_name:?}");
    Ok((status, fix, true))
}

/// Apply a batch of fixes to one sheet of a workbook file and save in place.
///
/// For each annotation the `Status` cell is cleared and the `Fix Summary`
/// cell written. Row numbers are taken as given; there is no check that a
/// row is within the current data range or was previously failed.
///
/// # Errors
///
/// Returns [`XlsxError::MissingFile`] for an absent workbook,
/// [`XlsxError::MissingSheet`] / [`TrackError::MissingColumn`] when the
/// target cannot be resolved, and [`XlsxError::Workbook`] when the load or
/// the save fails.
pub fn apply_fixes_in_place<P: AsRef<Path>>(
    path: P,
    sheet_name: &str,
    fixes: &[FixAnnotation],
) -> Result<FixOutcome> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(XlsxError::MissingFile(path.to_path_buf()));
    }

    let mut book = umya_spreadsheet::reader::xlsx::read(path)
        .map_err(|e| XlsxError::Workbook(format!("failed to load {}: {e:?}", path.display())))?;

    let (status_col, fix_summary_col, created_column) =
        ensure_fix_summary_column(&mut book, sheet_name)?;

    let sheet = book
        .get_sheet_by_name_mut(sheet_name)
        .ok_or_else(|| XlsxError::MissingSheet(sheet_name.to_string()))?;
    for fix in fixes {
        let row = u32::try_from(fix.row).unwrap_or(u32::MAX);
        sheet.get_cell_mut((status_col, row)).set_value("");
        sheet
            .get_cell_mut((fix_summary_col, row))
            .set_value(fix.summary.as_str());
    }

    umya_spreadsheet::writer::xlsx::write(&book, path)
        .map_err(|e| XlsxError::Workbook(format!("failed to save {}: {e:?}", path.display())))?;

    log::info!(
        "updated {} rows in sheet {sheet_name:?} of {}",
        fixes.len(),
        path.display()
    );
    Ok(FixOutcome {
        updated: fixes.len(),
        created_column,
        status_col,
        fix_summary_col,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tracking_book() -> Spreadsheet {
        let mut book = umya_spreadsheet::new_file();
        let sheet = book.get_sheet_by_name_mut("Sheet1").unwrap();
        sheet.get_cell_mut((1, 1)).set_value("Test Case No");
        sheet.get_cell_mut((2, 1)).set_value("Status");
        sheet.get_cell_mut((3, 1)).set_value("Defect");
        sheet.get_cell_mut((1, 2)).set_value("TC1");
        sheet.get_cell_mut((2, 2)).set_value("Failed");
        sheet.get_cell_mut((3, 2)).set_value("D36");
        book
    }

    #[test]
    fn test_find_header_column() {
        let book = tracking_book();
        let sheet = book.get_sheet_by_name("Sheet1").unwrap();
        assert_eq!(find_header_column(sheet, "Status"), Some(2));
        assert_eq!(find_header_column(sheet, "Fix Summary"), None);
    }

    #[test]
    fn test_ensure_fix_summary_creates_after_status() {
        let mut book = tracking_book();
        let (status, fix, created) = ensure_fix_summary_column(&mut book, "Sheet1").unwrap();
        assert_eq!(status, 2);
        assert_eq!(fix, 3);
        assert!(created);

        let sheet = book.get_sheet_by_name("Sheet1").unwrap();
        assert_eq!(sheet.get_value((3, 1)), "Fix Summary");
        // Defect shifted one to the right, data intact
        assert_eq!(sheet.get_value((4, 1)), "Defect");
        assert_eq!(sheet.get_value((4, 2)), "D36");
    }

    #[test]
    fn test_ensure_fix_summary_is_idempotent() {
        let mut book = tracking_book();
        let (_, first, created) = ensure_fix_summary_column(&mut book, "Sheet1").unwrap();
        assert!(created);
        let (_, second, created_again) = ensure_fix_summary_column(&mut book, "Sheet1").unwrap();
        assert_eq!(first, second);
        assert!(!created_again);

        let sheet = book.get_sheet_by_name("Sheet1").unwrap();
        assert_ne!(sheet.get_value((4, 1)), "Fix Summary");
    }

    #[test]
    fn test_ensure_fix_summary_unknown_sheet() {
        let mut book = tracking_book();
        let err = ensure_fix_summary_column(&mut book, "Defect").unwrap_err();
        assert!(matches!(err, XlsxError::MissingSheet(_)));
    }

    #[test]
    fn test_apply_fixes_in_place_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tracking.xlsx");
        umya_spreadsheet::writer::xlsx::write(&tracking_book(), &path).unwrap();

        let fixes = vec![FixAnnotation {
            row: 2,
            summary: "validation tightened".to_string(),
        }];
        let outcome = apply_fixes_in_place(&path, "Sheet1", &fixes).unwrap();
        assert_eq!(outcome.updated, 1);
        assert!(outcome.created_column);

        let book = umya_spreadsheet::reader::xlsx::read(&path).unwrap();
        let sheet = book.get_sheet_by_name("Sheet1").unwrap();
        assert_eq!(sheet.get_value((2, 2)), "");
        assert_eq!(sheet.get_value((3, 2)), "validation tightened");
        assert_eq!(sheet.get_value((4, 2)), "D36");
    }

    #[test]
    fn test_apply_fixes_missing_file() {
        let err = apply_fixes_in_place("no/such/book.xlsx", "Sheet1", &[]).unwrap_err();
        assert!(matches!(err, XlsxError::MissingFile(_)));
    }
}
