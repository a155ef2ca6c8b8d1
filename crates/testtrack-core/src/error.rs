//! Error types for sheet and annotation operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while resolving columns or applying annotations
#[derive(Debug, Error)]
pub enum TrackError {
    /// No header cell contains the required substring
    #[error("no column header contains {0:?}")]
    MissingColumn(String),

    /// Input file does not exist
    #[error("file not found: {0}")]
    MissingFile(PathBuf),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Annotation data file could not be parsed
    #[error("invalid annotation data: {0}")]
    Annotation(String),
}

/// Result type for core operations
pub type Result<T> = std::result::Result<T, TrackError>;
