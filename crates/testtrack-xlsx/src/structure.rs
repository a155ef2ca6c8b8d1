//! Workbook structure analysis
//!
//! Answers "what is actually in this workbook": per-sheet dimensions, header
//! labels, embedded-image counts, how many data rows carry content, and a few
//! sample rows. Rendered as a Markdown report for human review.

use std::fmt::Write as _;
use std::path::Path;

use serde::Serialize;
use testtrack_core::Sheet;

use crate::error::Result;
use crate::images;
use crate::read;

/// How many data rows to include as samples per sheet
const SAMPLE_ROWS: usize = 3;

/// Longest cell value rendered verbatim in the report
const TRUNCATE_AT: usize = 200;

/// Structure summary of one worksheet
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SheetStructure {
    /// Sheet name
    pub name: String,
    /// Total rows, header included
    pub rows: usize,
    /// Total columns
    pub columns: usize,
    /// Header labels with `ColumnN` fallbacks
    pub headers: Vec<String>,
    /// Embedded images anchored on this sheet
    pub image_count: usize,
    /// Data rows (row ≥ 2) with at least one non-empty cell
    pub data_row_count: usize,
    /// First few data rows as (row number, label → value) pairs
    pub sample_rows: Vec<(usize, Vec<(String, String)>)>,
}

/// Structure summary of the whole workbook
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkbookStructure {
    /// Per-sheet summaries, in workbook order
    pub sheets: Vec<SheetStructure>,
}

impl WorkbookStructure {
    /// Total embedded images across all sheets
    #[must_use]
    pub fn total_images(&self) -> usize {
        self.sheets.iter().map(|s| s.image_count).sum()
    }

    /// Total non-empty data rows across all sheets
    #[must_use]
    pub fn total_data_rows(&self) -> usize {
        self.sheets.iter().map(|s| s.data_row_count).sum()
    }

    /// Render the structure report as Markdown
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut md = String::new();
        md.push_str("# Workbook Structure Analysis\n\n## Overview\n\n");
        let _ = writeln!(md, "- **Total Sheets:** {}", self.sheets.len());
        let _ = writeln!(md, "- **Total Images:** {}", self.total_images());
        let _ = writeln!(md, "- **Total Data Rows:** {}", self.total_data_rows());
        md.push_str("\n---\n\n");

        for sheet in &self.sheets {
            let _ = writeln!(md, "## Sheet: {}\n", sheet.name);
            let _ = writeln!(
                md,
                "**Dimensions:** {} rows × {} columns",
                sheet.rows, sheet.columns
            );
            let _ = writeln!(md, "**Images:** {}", sheet.image_count);
            let _ = writeln!(md, "**Data Rows:** {}\n", sheet.data_row_count);

            md.push_str("### Column Headers\n\n");
            for (idx, header) in sheet.headers.iter().enumerate() {
                let _ = writeln!(md, "{}. {header}", idx + 1);
            }

            md.push_str("\n### Sample Data\n\n");
            for (row, fields) in &sheet.sample_rows {
                let _ = writeln!(md, "#### Row {row}:");
                for (label, value) in fields {
                    let _ = writeln!(md, "- **{label}:** {}", truncate(value));
                }
                md.push('\n');
            }
            md.push_str("---\n\n");
        }
        md
    }
}

fn truncate(value: &str) -> String {
    if value.chars().count() > TRUNCATE_AT {
        let cut: String = value.chars().take(TRUNCATE_AT).collect();
        format!("{cut}...")
    } else {
        value.to_string()
    }
}

fn sheet_structure(sheet: &Sheet, image_count: usize) -> SheetStructure {
    let data_rows: Vec<usize> = (2..=sheet.row_count())
        .filter(|&row| !sheet.is_row_empty(row))
        .collect();

    let sample_rows = data_rows
        .iter()
        .take(SAMPLE_ROWS)
        .map(|&row| {
            let fields = sheet
                .row_record(row)
                .fields()
                .iter()
                .map(|(label, value)| (label.clone(), value.to_string()))
                .collect();
            (row, fields)
        })
        .collect();

    SheetStructure {
        name: sheet.name().to_string(),
        rows: sheet.row_count(),
        columns: sheet.column_count(),
        headers: sheet.header_labels(),
        image_count,
        data_row_count: data_rows.len(),
        sample_rows,
    }
}

/// Analyze every sheet of a workbook.
///
/// # Errors
///
/// Fails with the underlying [`crate::XlsxError`] when the workbook cannot
/// be opened or a sheet cannot be read. A workbook whose ZIP container has
/// no drawing parts simply reports zero images.
pub fn analyze_structure<P: AsRef<Path>>(path: P) -> Result<WorkbookStructure> {
    let path = path.as_ref();
    let sheets = read::read_workbook(path)?;
    let image_counts = images::count_images(path)?;

    let sheets = sheets
        .iter()
        .map(|sheet| {
            let image_count = image_counts
                .iter()
                .find(|(name, _)| name == sheet.name())
                .map_or(0, |(_, count)| *count);
            sheet_structure(sheet, image_count)
        })
        .collect();

    Ok(WorkbookStructure { sheets })
}

#[cfg(test)]
mod tests {
    use super::*;
    use testtrack_core::CellValue;

    fn sample_sheet() -> Sheet {
        Sheet::from_rows(
            "Registration.Login",
            vec![
                vec!["Test Case No".into(), "Status".into()],
                vec!["TC1".into(), "Pass".into()],
                vec![CellValue::Empty, CellValue::Empty],
                vec!["TC3".into(), "Failed".into()],
            ],
        )
    }

    #[test]
    fn test_sheet_structure_counts_non_empty_data_rows() {
        let s = sheet_structure(&sample_sheet(), 2);
        assert_eq!(s.rows, 4);
        assert_eq!(s.columns, 2);
        assert_eq!(s.data_row_count, 2);
        assert_eq!(s.image_count, 2);
        assert_eq!(s.headers, vec!["Test Case No", "Status"]);
    }

    #[test]
    fn test_sample_rows_skip_empty_rows() {
        let s = sheet_structure(&sample_sheet(), 0);
        let rows: Vec<usize> = s.sample_rows.iter().map(|(row, _)| *row).collect();
        assert_eq!(rows, vec![2, 4]);
    }

    #[test]
    fn test_markdown_report_mentions_sheets() {
        let structure = WorkbookStructure {
            sheets: vec![sheet_structure(&sample_sheet(), 1)],
        };
        let md = structure.to_markdown();
        assert!(md.contains("## Sheet: Registration.Login"));
        assert!(md.contains("- **Total Images:** 1"));
        assert!(md.contains("1. Test Case No"));
    }

    #[test]
    fn test_truncate_long_values() {
        let long = "x".repeat(250);
        let out = truncate(&long);
        assert!(out.ends_with("..."));
        assert_eq!(out.chars().count(), 203);
    }
}
