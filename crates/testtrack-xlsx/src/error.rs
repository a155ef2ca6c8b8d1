//! Error types for workbook I/O

use std::io;
use std::path::PathBuf;
use testtrack_core::TrackError;
use thiserror::Error;

/// Errors that can occur while reading, mutating, or unpacking a workbook
#[derive(Debug, Error)]
pub enum XlsxError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Workbook file does not exist
    #[error("workbook not found: {0}")]
    MissingFile(PathBuf),

    /// Named sheet not present in the workbook
    #[error("sheet {0:?} not found in workbook")]
    MissingSheet(String),

    /// Underlying spreadsheet library failure
    #[error("workbook error: {0}")]
    Workbook(String),

    /// ZIP container or drawing XML failure
    #[error("container error: {0}")]
    Container(String),

    /// Core sheet/annotation error
    #[error(transparent)]
    Core(#[from] TrackError),
}

/// Result type for workbook operations
pub type Result<T> = std::result::Result<T, XlsxError>;
