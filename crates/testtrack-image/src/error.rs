//! Error types for screenshot analysis

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while analyzing screenshots or building reports
#[derive(Debug, Error)]
pub enum ImageError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Image directory does not exist
    #[error("image directory not found: {0}")]
    MissingDir(PathBuf),

    /// Report or image file does not exist
    #[error("file not found: {0}")]
    MissingFile(PathBuf),

    /// Report serialization or deserialization failure
    #[error("report error: {0}")]
    Report(String),
}

impl From<serde_json::Error> for ImageError {
    fn from(e: serde_json::Error) -> Self {
        Self::Report(e.to_string())
    }
}

/// Result type for screenshot analysis
pub type Result<T> = std::result::Result<T, ImageError>;
