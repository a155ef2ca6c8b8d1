//! Failed-row filter
//!
//! Lazily walks the data rows of a sheet and yields the rows that still need
//! attention: `Status` contains `"Fail"` and `Fix Summary` (when the column
//! exists) is empty. Rows in a caller-supplied exclusion set are skipped and
//! iteration stops once a result limit is reached. Read-only; the sheet is
//! never mutated.

use std::collections::HashSet;

use crate::error::{Result, TrackError};
use crate::sheet::{RowRecord, Sheet, FIX_SUMMARY_HEADER, STATUS_HEADER};

/// Substring of the `Status` cell that marks a row as failed
const FAILED_MARKER: &str = "Fail";

/// Iterator over failed-and-unfixed rows, ascending by row number
#[derive(Debug)]
pub struct FailedRowFilter<'a> {
    sheet: &'a Sheet,
    status_col: usize,
    fix_col: Option<usize>,
    skip: HashSet<usize>,
    limit: usize,
    next_row: usize,
    yielded: usize,
}

impl<'a> FailedRowFilter<'a> {
    /// Build a filter over `sheet` with no exclusions and no limit.
    ///
    /// # Errors
    ///
    /// Returns [`TrackError::MissingColumn`] if the sheet has no `Status`
    /// column; there is nothing meaningful to filter without one.
    pub fn new(sheet: &'a Sheet) -> Result<Self> {
        let status_col = sheet
            .find_column(STATUS_HEADER)
            .ok_or_else(|| TrackError::MissingColumn(STATUS_HEADER.to_string()))?;
        Ok(Self {
            sheet,
            status_col,
            fix_col: sheet.find_column(FIX_SUMMARY_HEADER),
            skip: HashSet::new(),
            limit: usize::MAX,
            next_row: 2, // data begins below the header row
            yielded: 0,
        })
    }

    /// Exclude specific row numbers (already-processed rows)
    #[must_use]
    pub fn skip_rows<I: IntoIterator<Item = usize>>(mut self, rows: I) -> Self {
        self.skip.extend(rows);
        self
    }

    /// Stop after yielding `limit` rows
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    fn row_needs_fix(&self, row: usize) -> bool {
        let status = self.sheet.cell(row, self.status_col);
        if status.is_empty() || !status.to_string().contains(FAILED_MARKER) {
            return false;
        }
        // A row that already carries a fix summary is done
        self.fix_col
            .is_none_or(|col| self.sheet.cell(row, col).is_empty())
    }
}

impl Iterator for FailedRowFilter<'_> {
    type Item = RowRecord;

    fn next(&mut self) -> Option<RowRecord> {
        if self.yielded >= self.limit {
            return None;
        }
        while self.next_row <= self.sheet.row_count() {
            let row = self.next_row;
            self.next_row += 1;
            if self.skip.contains(&row) || !self.row_needs_fix(row) {
                continue;
            }
            self.yielded += 1;
            return Some(self.sheet.row_record(row));
        }
        None
    }
}
