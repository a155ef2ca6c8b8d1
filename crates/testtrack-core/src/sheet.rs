//! In-memory tabular sheet model
//!
//! A [`Sheet`] is an ordered sequence of rows of cell values in which row 1 is
//! the header row. All row and column indices are 1-based, matching the
//! spreadsheet convention used by the tracking workbook. Column lookups are
//! fuzzy by design: a column is addressed by a substring of its header label,
//! and the first (leftmost) match wins.

use std::collections::BTreeSet;
use std::fmt;

use crate::error::{Result, TrackError};

/// Header substring that addresses the pass/fail column
pub const STATUS_HEADER: &str = "Status";

/// Header label of the remediation-notes column, created on demand
pub const FIX_SUMMARY_HEADER: &str = "Fix Summary";

static EMPTY_CELL: CellValue = CellValue::Empty;

/// A single cell value
#[derive(Debug, Clone, PartialEq, Default)]
pub enum CellValue {
    /// Textual content
    Text(String),
    /// Numeric content
    Number(f64),
    /// No content
    #[default]
    Empty,
}

impl CellValue {
    /// True if the cell holds no content (absent or empty string)
    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.is_empty(),
            Self::Number(_) => false,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) => f.write_str(s),
            Self::Number(n) if n.fract() == 0.0 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Empty => Ok(()),
        }
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

/// One named worksheet of the tracking workbook
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Sheet {
    name: String,
    /// `rows[0]` is spreadsheet row 1, the header row
    rows: Vec<Vec<CellValue>>,
    /// Columns whose header cell is rendered bold (presentation only)
    bold_header_cols: BTreeSet<usize>,
}

impl Sheet {
    /// Create an empty sheet
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rows: Vec::new(),
            bold_header_cols: BTreeSet::new(),
        }
    }

    /// Create a sheet from pre-built rows (row 1 first)
    #[must_use]
    pub fn from_rows(name: impl Into<String>, rows: Vec<Vec<CellValue>>) -> Self {
        Self {
            name: name.into(),
            rows,
            bold_header_cols: BTreeSet::new(),
        }
    }

    /// Sheet name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of rows, header row included
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Width of the widest row
    #[must_use]
    pub fn column_count(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    /// The header row (row 1), empty if the sheet has no rows
    #[must_use]
    pub fn header(&self) -> &[CellValue] {
        self.rows.first().map_or(&[], Vec::as_slice)
    }

    /// Header labels for every column, with a `ColumnN` fallback for blanks
    #[must_use]
    pub fn header_labels(&self) -> Vec<String> {
        let header = self.header();
        (1..=self.column_count())
            .map(|col| {
                let label = header
                    .get(col - 1)
                    .map(ToString::to_string)
                    .unwrap_or_default();
                if label.is_empty() {
                    format!("Column{col}")
                } else {
                    label
                }
            })
            .collect()
    }

    /// Resolve a column by header substring.
    ///
    /// Scans the header row left to right and returns the 1-based index of
    /// the first column whose stringified header contains `needle`
    /// (case-sensitive). Returns `None` when no header matches. Two headers
    /// both containing the substring resolve to the leftmost one.
    #[must_use]
    pub fn find_column(&self, needle: &str) -> Option<usize> {
        self.header()
            .iter()
            .position(|cell| cell.to_string().contains(needle))
            .map(|idx| idx + 1)
    }

    /// Cell at (row, col), 1-based. Out-of-range cells read as empty.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> &CellValue {
        if row == 0 || col == 0 {
            return &EMPTY_CELL;
        }
        self.rows
            .get(row - 1)
            .and_then(|r| r.get(col - 1))
            .unwrap_or(&EMPTY_CELL)
    }

    /// Write a cell at (row, col), growing the sheet as needed.
    ///
    /// Row numbers are taken at face value: writing past the current row
    /// count extends the sheet with empty rows in between.
    pub fn set_cell(&mut self, row: usize, col: usize, value: impl Into<CellValue>) {
        assert!(row > 0 && col > 0, "sheet indices are 1-based");
        if self.rows.len() < row {
            self.rows.resize_with(row, Vec::new);
        }
        let r = &mut self.rows[row - 1];
        if r.len() < col {
            r.resize_with(col, CellValue::default);
        }
        r[col - 1] = value.into();
    }

    /// Clear a cell back to empty
    pub fn clear_cell(&mut self, row: usize, col: usize) {
        if row == 0 || col == 0 {
            return;
        }
        if let Some(r) = self.rows.get_mut(row - 1) {
            if let Some(c) = r.get_mut(col - 1) {
                *c = CellValue::Empty;
            }
        }
    }

    /// Insert an empty column at `col`, shifting that column and everything
    /// right of it one position further right. Column indices cached before
    /// the insertion are stale afterwards and must be re-resolved.
    pub fn insert_column(&mut self, col: usize) {
        assert!(col > 0, "sheet indices are 1-based");
        for row in &mut self.rows {
            if row.len() >= col {
                row.insert(col - 1, CellValue::Empty);
            }
        }
        self.bold_header_cols = self
            .bold_header_cols
            .iter()
            .map(|&c| if c >= col { c + 1 } else { c })
            .collect();
    }

    /// True if the header cell of `col` is flagged bold
    #[must_use]
    pub fn header_bold(&self, col: usize) -> bool {
        self.bold_header_cols.contains(&col)
    }

    /// Flag the header cell of `col` as bold
    pub fn set_header_bold(&mut self, col: usize) {
        self.bold_header_cols.insert(col);
    }

    /// Ensure the `Fix Summary` column exists and return its 1-based index.
    ///
    /// When the column is absent it is inserted immediately to the right of
    /// the resolved `Status` column with a bold header. Calling this twice
    /// never creates a second column.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::MissingColumn`] if no `Status` column exists to
    /// anchor the insertion.
    pub fn ensure_fix_summary_column(&mut self) -> Result<usize> {
        if let Some(col) = self.find_column(FIX_SUMMARY_HEADER) {
            return Ok(col);
        }
        let status = self
            .find_column(STATUS_HEADER)
            .ok_or_else(|| TrackError::MissingColumn(STATUS_HEADER.to_string()))?;
        let col = status + 1;
        self.insert_column(col);
        self.set_cell(1, col, FIX_SUMMARY_HEADER);
        self.set_header_bold(col);
        Ok(col)
    }

    /// True if every cell of `row` is empty
    #[must_use]
    pub fn is_row_empty(&self, row: usize) -> bool {
        (1..=self.column_count()).all(|col| self.cell(row, col).is_empty())
    }

    /// Build the transient label-to-value record for one data row.
    ///
    /// Only non-empty cells are carried, in header order. The record is a
    /// display/export view; it is never written back to the sheet.
    #[must_use]
    pub fn row_record(&self, row: usize) -> RowRecord {
        let fields = self
            .header_labels()
            .into_iter()
            .enumerate()
            .filter_map(|(idx, label)| {
                let value = self.cell(row, idx + 1);
                if value.is_empty() {
                    None
                } else {
                    Some((label, value.clone()))
                }
            })
            .collect();
        RowRecord { row, fields }
    }
}

/// A label-to-value view of one data row, plus its 1-based row number
#[derive(Debug, Clone, PartialEq)]
pub struct RowRecord {
    row: usize,
    fields: Vec<(String, CellValue)>,
}

impl RowRecord {
    /// 1-based row number in the source sheet
    #[must_use]
    pub fn row(&self) -> usize {
        self.row
    }

    /// Value for a header label, if the cell was non-empty
    #[must_use]
    pub fn get(&self, label: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(l, _)| l == label)
            .map(|(_, v)| v)
    }

    /// Stringified value for a header label, `"N/A"` when absent.
    ///
    /// Missing fields are an expected condition for read-side consumers, so
    /// they get a placeholder rather than an error.
    #[must_use]
    pub fn display(&self, label: &str) -> String {
        self.get(label)
            .map_or_else(|| "N/A".to_string(), ToString::to_string)
    }

    /// All carried (label, value) pairs in header order
    #[must_use]
    pub fn fields(&self) -> &[(String, CellValue)] {
        &self.fields
    }

    /// True if the row had no non-empty cells
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_sheet() -> Sheet {
        Sheet::from_rows(
            "Registration.Login",
            vec![
                vec![
                    "Test Case No".into(),
                    "Test Cases".into(),
                    "Status".into(),
                ],
                vec!["TC1".into(), "Valid login".into(), "Pass".into()],
                vec!["TC2".into(), "Invalid login".into(), "Failed".into()],
            ],
        )
    }

    #[test]
    fn test_find_column_first_match() {
        let sheet = test_sheet();
        assert_eq!(sheet.find_column("Status"), Some(3));
        assert_eq!(sheet.find_column("Test Case No"), Some(1));
        // Substring match: "Test Case" hits "Test Case No" before "Test Cases"
        assert_eq!(sheet.find_column("Test Case"), Some(1));
        assert_eq!(sheet.find_column("Defect"), None);
    }

    #[test]
    fn test_find_column_is_case_sensitive() {
        let sheet = test_sheet();
        assert_eq!(sheet.find_column("status"), None);
    }

    #[test]
    fn test_find_column_ambiguous_headers() {
        let sheet = Sheet::from_rows(
            "S",
            vec![vec!["Status".into(), "Employment Status".into()]],
        );
        // First match wins, even when a later header also contains the needle
        assert_eq!(sheet.find_column("Status"), Some(1));
    }

    #[test]
    fn test_cell_out_of_range_reads_empty() {
        let sheet = test_sheet();
        assert!(sheet.cell(99, 1).is_empty());
        assert!(sheet.cell(2, 99).is_empty());
    }

    #[test]
    fn test_set_cell_grows_sheet() {
        let mut sheet = Sheet::new("S");
        sheet.set_cell(3, 2, "x");
        assert_eq!(sheet.row_count(), 3);
        assert_eq!(sheet.cell(3, 2).to_string(), "x");
        assert!(sheet.cell(1, 1).is_empty());
    }

    #[test]
    fn test_insert_column_shifts_right() {
        let mut sheet = test_sheet();
        sheet.insert_column(3);
        assert_eq!(sheet.find_column("Status"), Some(4));
        assert!(sheet.cell(2, 3).is_empty());
        assert_eq!(sheet.cell(2, 4).to_string(), "Pass");
    }

    #[test]
    fn test_ensure_fix_summary_inserts_after_status() {
        let mut sheet = test_sheet();
        let col = sheet.ensure_fix_summary_column().unwrap();
        assert_eq!(col, 4);
        assert_eq!(sheet.cell(1, 4).to_string(), "Fix Summary");
        assert!(sheet.header_bold(4));
        // Status stays where it was; data beyond it is untouched
        assert_eq!(sheet.find_column("Status"), Some(3));
        assert_eq!(sheet.cell(2, 3).to_string(), "Pass");
    }

    #[test]
    fn test_ensure_fix_summary_is_idempotent() {
        let mut sheet = test_sheet();
        let first = sheet.ensure_fix_summary_column().unwrap();
        let width = sheet.column_count();
        let second = sheet.ensure_fix_summary_column().unwrap();
        assert_eq!(first, second);
        assert_eq!(sheet.column_count(), width);
    }

    #[test]
    fn test_ensure_fix_summary_without_status() {
        let mut sheet = Sheet::from_rows("S", vec![vec!["A".into(), "B".into()]]);
        let err = sheet.ensure_fix_summary_column().unwrap_err();
        assert!(matches!(err, TrackError::MissingColumn(_)));
    }

    #[test]
    fn test_ensure_fix_summary_mid_sheet_shifts_later_columns() {
        let mut sheet = Sheet::from_rows(
            "S",
            vec![
                vec!["Status".into(), "Defect".into()],
                vec!["Failed".into(), "D36".into()],
            ],
        );
        let col = sheet.ensure_fix_summary_column().unwrap();
        assert_eq!(col, 2);
        assert_eq!(sheet.find_column("Defect"), Some(3));
        assert_eq!(sheet.cell(2, 3).to_string(), "D36");
    }

    #[test]
    fn test_row_record_skips_empty_cells() {
        let mut sheet = test_sheet();
        sheet.clear_cell(2, 2);
        let record = sheet.row_record(2);
        assert_eq!(record.row(), 2);
        assert_eq!(record.get("Test Case No").unwrap().to_string(), "TC1");
        assert_eq!(record.get("Test Cases"), None);
        assert_eq!(record.display("Test Cases"), "N/A");
    }

    #[test]
    fn test_header_labels_fallback() {
        let sheet = Sheet::from_rows(
            "S",
            vec![
                vec!["A".into(), CellValue::Empty],
                vec!["1".into(), "2".into(), "3".into()],
            ],
        );
        assert_eq!(sheet.header_labels(), vec!["A", "Column2", "Column3"]);
    }

    #[test]
    fn test_number_display_trims_integral() {
        assert_eq!(CellValue::Number(4.0).to_string(), "4");
        assert_eq!(CellValue::Number(4.5).to_string(), "4.5");
    }
}
