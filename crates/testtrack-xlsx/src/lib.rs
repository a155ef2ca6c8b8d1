//! Workbook I/O for the test-tracking workflow
//!
//! This crate owns every touchpoint with `.xlsx` files:
//!
//! - **Reading** (`calamine`): materialize worksheets into the core
//!   [`testtrack_core::Sheet`] model with absolute 1-based coordinates.
//! - **Writing** (`umya-spreadsheet`): apply fix batches in place with the
//!   load → mutate → save cycle, including on-demand creation of the
//!   `Fix Summary` column right of `Status`.
//! - **Image extraction** (`zip` + `quick-xml`): pull embedded screenshots
//!   out of the ZIP container, named `{SheetName}_image_{N}.{ext}`.
//! - **Structure analysis**: per-sheet dimensions, headers, image counts,
//!   and sample rows, rendered as Markdown.
//!
//! Reading and writing intentionally use different backends: reads want the
//! fast columnar access calamine provides, while writes must preserve the
//! untouched parts of the workbook (styles, other sheets, embedded media),
//! which requires the full-fidelity umya-spreadsheet model.

mod error;
mod images;
mod read;
mod structure;
mod write;

pub use error::{Result, XlsxError};
pub use images::{count_images, extract_images, ExtractedImage};
pub use read::{read_sheet, read_workbook, sheet_names};
pub use structure::{analyze_structure, SheetStructure, WorkbookStructure};
pub use write::{
    apply_fixes_in_place, ensure_fix_summary_column, find_header_column, FixOutcome,
};
