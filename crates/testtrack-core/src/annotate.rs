//! Fix annotations and the batch row mutator
//!
//! A fix annotation pairs a 1-based row number with free-text remediation
//! notes. Applying a batch clears the `Status` cell and writes the
//! `Fix Summary` cell for each annotated row. Annotations live in an external
//! JSON data file rather than in source constants, so the mutation engine is
//! decoupled from any specific fix batch.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrackError};
use crate::sheet::{Sheet, FIX_SUMMARY_HEADER, STATUS_HEADER};

/// One (row, summary) fix record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixAnnotation {
    /// 1-based row number in the target sheet
    pub row: usize,
    /// Free-text remediation notes
    pub summary: String,
}

/// Load fix annotations from a JSON array file.
///
/// # Errors
///
/// Returns [`TrackError::MissingFile`] if the path does not exist and
/// [`TrackError::Annotation`] if the JSON does not parse as a list of
/// `{row, summary}` records.
pub fn load_annotations<P: AsRef<Path>>(path: P) -> Result<Vec<FixAnnotation>> {
    let path = path.as_ref();
    if !path.exists() {
        return Err(TrackError::MissingFile(path.to_path_buf()));
    }
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| TrackError::Annotation(e.to_string()))
}

/// Resolved column pair used by the batch mutator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixColumns {
    /// 1-based index of the `Status` column
    pub status: usize,
    /// 1-based index of the `Fix Summary` column
    pub fix_summary: usize,
}

/// Resolve (creating if needed) the Status / Fix Summary column pair.
///
/// Creation happens before resolution: inserting the `Fix Summary` column
/// shifts everything right of `Status`, so any index resolved earlier in the
/// same pass would be stale.
///
/// # Errors
///
/// Returns [`TrackError::MissingColumn`] if the sheet has no `Status` column.
pub fn resolve_fix_columns(sheet: &mut Sheet) -> Result<FixColumns> {
    let fix_summary = sheet.ensure_fix_summary_column()?;
    let status = sheet
        .find_column(STATUS_HEADER)
        .ok_or_else(|| TrackError::MissingColumn(STATUS_HEADER.to_string()))?;
    Ok(FixColumns {
        status,
        fix_summary,
    })
}

/// Apply a batch of fixes: clear `Status`, write `Fix Summary`, row by row.
///
/// There is no transactional grouping and no row-range validation; the
/// caller's save is the only commit point. Returns the resolved columns so
/// callers can report where the writes landed.
///
/// # Errors
///
/// Returns [`TrackError::MissingColumn`] if the sheet has no `Status` column.
pub fn apply_fixes(sheet: &mut Sheet, fixes: &[FixAnnotation]) -> Result<FixColumns> {
    let cols = resolve_fix_columns(sheet)?;
    for fix in fixes {
        sheet.clear_cell(fix.row, cols.status);
        sheet.set_cell(fix.row, cols.fix_summary, fix.summary.as_str());
    }
    log::debug!(
        "applied {} fixes to sheet {:?} (status col {}, fix col {})",
        fixes.len(),
        sheet.name(),
        cols.status,
        cols.fix_summary
    );
    Ok(cols)
}

/// Post-apply state of one annotated row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowVerification {
    /// 1-based row number
    pub row: usize,
    /// `Test Case No` cell, `N/A` when absent
    pub test_case: String,
    /// `Test Cases` cell, `N/A` when absent
    pub test_name: String,
    /// Remaining `Status` value; `None` means cleared
    pub status: Option<String>,
    /// `Fix Summary` value, if present
    pub fix_summary: Option<String>,
}

/// Read back the given rows and report whether each looks fixed.
///
/// Read-only: missing columns degrade to placeholders instead of failing.
#[must_use]
pub fn verify_rows(sheet: &Sheet, rows: &[usize]) -> Vec<RowVerification> {
    let test_case_col = sheet.find_column("Test Case No");
    let test_name_col = sheet.find_column("Test Cases");
    let status_col = sheet.find_column(STATUS_HEADER);
    let fix_col = sheet.find_column(FIX_SUMMARY_HEADER);

    let read = |row: usize, col: Option<usize>| -> Option<String> {
        let value = sheet.cell(row, col?);
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    };

    rows.iter()
        .map(|&row| RowVerification {
            row,
            test_case: read(row, test_case_col).unwrap_or_else(|| "N/A".to_string()),
            test_name: read(row, test_name_col).unwrap_or_else(|| "N/A".to_string()),
            status: read(row, status_col),
            fix_summary: read(row, fix_col),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheet::CellValue;

    fn tracking_sheet() -> Sheet {
        Sheet::from_rows(
            "Registration.Login",
            vec![
                vec!["Test Case No".into(), "Status".into(), "Defect".into()],
                vec!["TC1".into(), "Pass".into(), CellValue::Empty],
                vec!["TC2".into(), "Failed".into(), "D5".into()],
                vec!["TC3".into(), "Failed".into(), "D8".into()],
            ],
        )
    }

    #[test]
    fn test_apply_fixes_round_trip() {
        let mut sheet = tracking_sheet();
        let fixes = vec![
            FixAnnotation {
                row: 3,
                summary: "text3".to_string(),
            },
            FixAnnotation {
                row: 4,
                summary: "text4".to_string(),
            },
        ];
        let cols = apply_fixes(&mut sheet, &fixes).unwrap();
        assert_eq!(cols.status, 2);
        assert_eq!(cols.fix_summary, 3);

        assert!(sheet.cell(3, cols.status).is_empty());
        assert_eq!(sheet.cell(3, cols.fix_summary).to_string(), "text3");
        assert!(sheet.cell(4, cols.status).is_empty());
        assert_eq!(sheet.cell(4, cols.fix_summary).to_string(), "text4");

        // Untouched cells keep their values, shifted columns included
        assert_eq!(sheet.cell(2, cols.status).to_string(), "Pass");
        assert!(sheet.cell(2, 4).is_empty());
        assert_eq!(sheet.cell(3, 4).to_string(), "D5");
        assert_eq!(sheet.cell(4, 4).to_string(), "D8");
    }

    #[test]
    fn test_apply_fixes_requires_status_column() {
        let mut sheet = Sheet::from_rows("S", vec![vec!["A".into()]]);
        let err = apply_fixes(&mut sheet, &[]).unwrap_err();
        assert!(matches!(err, TrackError::MissingColumn(_)));
    }

    #[test]
    fn test_apply_fixes_reuses_existing_column() {
        let mut sheet = tracking_sheet();
        sheet.ensure_fix_summary_column().unwrap();
        let width = sheet.column_count();
        apply_fixes(
            &mut sheet,
            &[FixAnnotation {
                row: 2,
                summary: "done".to_string(),
            }],
        )
        .unwrap();
        assert_eq!(sheet.column_count(), width);
    }

    #[test]
    fn test_apply_fixes_past_row_count_extends_sheet() {
        let mut sheet = tracking_sheet();
        apply_fixes(
            &mut sheet,
            &[FixAnnotation {
                row: 10,
                summary: "late".to_string(),
            }],
        )
        .unwrap();
        assert_eq!(sheet.cell(10, 3).to_string(), "late");
    }

    #[test]
    fn test_verify_rows_reports_cleared_status() {
        let mut sheet = tracking_sheet();
        apply_fixes(
            &mut sheet,
            &[FixAnnotation {
                row: 3,
                summary: "fixed".to_string(),
            }],
        )
        .unwrap();

        let report = verify_rows(&sheet, &[2, 3]);
        assert_eq!(report.len(), 2);

        assert_eq!(report[0].row, 2);
        assert_eq!(report[0].status.as_deref(), Some("Pass"));
        assert_eq!(report[0].fix_summary, None);

        assert_eq!(report[1].row, 3);
        assert_eq!(report[1].status, None);
        assert_eq!(report[1].fix_summary.as_deref(), Some("fixed"));
        assert_eq!(report[1].test_case, "TC2");
    }

    #[test]
    fn test_verify_rows_without_columns_uses_placeholders() {
        let sheet = Sheet::from_rows("S", vec![vec!["A".into()], vec!["x".into()]]);
        let report = verify_rows(&sheet, &[2]);
        assert_eq!(report[0].test_case, "N/A");
        assert_eq!(report[0].status, None);
    }

    #[test]
    fn test_load_annotations_missing_file() {
        let err = load_annotations("no/such/fixes.json").unwrap_err();
        assert!(matches!(err, TrackError::MissingFile(_)));
    }
}
