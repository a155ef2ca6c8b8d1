//! # testtrack-core
//!
//! Core data model for the `JobFinder` QA test-tracking workbook: an
//! in-memory tabular sheet with header-substring column resolution, row
//! records, a failed-row filter, and the fix-annotation batch mutator.
//!
//! Workbook file I/O lives in `testtrack-xlsx`; this crate only models the
//! sheet and the operations on it.
//!
//! ## Quick Start
//!
//! ```
//! use testtrack_core::{apply_fixes, FailedRowFilter, FixAnnotation, Sheet};
//!
//! let mut sheet = Sheet::from_rows(
//!     "Registration.Login",
//!     vec![
//!         vec!["Test Case No".into(), "Status".into()],
//!         vec!["TC1".into(), "Failed".into()],
//!     ],
//! );
//!
//! // Rows still needing a fix
//! let pending: Vec<_> = FailedRowFilter::new(&sheet)?.collect();
//! assert_eq!(pending.len(), 1);
//!
//! // Clear Status, write Fix Summary (column created on demand)
//! apply_fixes(
//!     &mut sheet,
//!     &[FixAnnotation { row: 2, summary: "validation tightened".into() }],
//! )?;
//! assert!(sheet.cell(2, 2).is_empty());
//! # Ok::<(), testtrack_core::TrackError>(())
//! ```

mod annotate;
mod error;
mod filter;
mod sheet;

pub use annotate::{
    apply_fixes, load_annotations, resolve_fix_columns, verify_rows, FixAnnotation, FixColumns,
    RowVerification,
};
pub use error::{Result, TrackError};
pub use filter::FailedRowFilter;
pub use sheet::{CellValue, RowRecord, Sheet, FIX_SUMMARY_HEADER, STATUS_HEADER};
