//! Screenshot analysis for the test-tracking workflow
//!
//! Screenshots extracted from a tracking workbook follow the
//! `{Category}_image_{N}.{ext}` naming convention. This crate correlates
//! those filenames back to their worksheets, reads image metadata, runs
//! optional OCR through the system `tesseract` binary, and rolls a batch up
//! into JSON and Markdown reports plus a fix checklist.
//!
//! OCR is a soft capability: [`OcrEngine::detect`] probes the PATH once, and
//! an absent binary degrades every record to metadata-only instead of
//! failing the batch.

mod analyze;
mod error;
mod name;
mod report;

pub use analyze::{analyze_directory, analyze_image, ImageAnalysis, OcrEngine};
pub use error::{ImageError, Result};
pub use name::{ImageName, UNKNOWN_CATEGORY};
pub use report::{AnalysisReport, ImageEntry, ReportSummary, SheetImages};
