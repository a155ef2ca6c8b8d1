//! Screenshot metadata and OCR analysis
//!
//! Each image yields one [`ImageAnalysis`] record. Analysis never fails a
//! batch: an undecodable image produces a record with its `error` field set,
//! and a missing OCR engine degrades every record to metadata-only.

use std::path::{Path, PathBuf};
use std::process::Command;

use image::GenericImageView;
use serde::{Deserialize, Serialize};

use crate::error::{ImageError, Result};
use crate::name::ImageName;

/// Extensions treated as screenshots when scanning a directory
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp"];

/// Handle to the system `tesseract` binary.
///
/// OCR is an optional capability: the engine is probed once and carried as an
/// explicit value, so callers can see whether text fields in the resulting
/// records are meaningful or simply absent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OcrEngine {
    available: bool,
}

impl OcrEngine {
    /// Probe the PATH for a working `tesseract` binary
    #[must_use]
    pub fn detect() -> Self {
        let available = Command::new("tesseract")
            .arg("--version")
            .output()
            .map(|out| out.status.success())
            .unwrap_or(false);
        if !available {
            log::warn!("tesseract not found in PATH, text extraction disabled");
        }
        Self { available }
    }

    /// An engine that never runs OCR, regardless of what is installed
    #[must_use]
    pub fn disabled() -> Self {
        Self { available: false }
    }

    /// True if text extraction will actually run
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.available
    }

    /// Run OCR on one image, returning the recognized text.
    ///
    /// Returns `None` when the engine is unavailable or the binary fails on
    /// this particular image; failures are logged, never propagated.
    #[must_use]
    pub fn recognize(&self, path: &Path) -> Option<String> {
        if !self.available {
            return None;
        }
        let output = Command::new("tesseract")
            .arg(path)
            .arg("stdout")
            .output()
            .ok()?;
        if !output.status.success() {
            log::warn!(
                "tesseract failed on {}: {}",
                path.display(),
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return None;
        }
        Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Everything we know about one screenshot
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageAnalysis {
    /// File name, e.g. `Registration.Login_image_3.png`
    pub filename: String,
    /// Full path of the analyzed file
    pub path: PathBuf,
    /// Worksheet name parsed from the filename, or `Unknown`
    pub sheet: String,
    /// Sequence number parsed from the filename, or 0
    pub image_number: usize,
    /// Pixel width, 0 when the image could not be decoded
    pub width: u32,
    /// Pixel height, 0 when the image could not be decoded
    pub height: u32,
    /// File size in bytes
    pub size_bytes: u64,
    /// File size in KB, rounded to two decimals
    pub size_kb: f64,
    /// Image format, e.g. `PNG`
    pub format: String,
    /// Color mode, e.g. `RGBA8`
    pub mode: String,
    /// Recognized text, empty when OCR is off or found nothing
    pub text: String,
    /// Non-blank recognized lines, trimmed
    pub text_lines: Vec<String>,
    /// True when OCR found at least one non-blank line
    pub has_text: bool,
    /// Decode failure message; metadata fields are zeroed when set
    pub error: Option<String>,
}

impl ImageAnalysis {
    /// Pixel dimensions as `WxH`
    #[must_use]
    pub fn dimensions(&self) -> String {
        format!("{}x{}", self.width, self.height)
    }

    /// First 200 characters of the recognized text
    #[must_use]
    pub fn text_preview(&self) -> String {
        self.text.chars().take(200).collect()
    }
}

fn round_kb(bytes: u64) -> f64 {
    #[allow(clippy::cast_precision_loss)] // screenshot sizes, well within f64 range
    let kb = bytes as f64 / 1024.0;
    (kb * 100.0).round() / 100.0
}

/// Analyze one screenshot: filename correlation, metadata, optional OCR.
///
/// Never returns an error for the image content itself; a file that cannot
/// be decoded yields a record with the `error` field set and zeroed
/// dimensions. Only a missing file is reported as an error.
///
/// # Errors
///
/// Returns [`ImageError::MissingFile`] when `path` does not exist.
pub fn analyze_image(path: &Path, ocr: OcrEngine) -> Result<ImageAnalysis> {
    if !path.exists() {
        return Err(ImageError::MissingFile(path.to_path_buf()));
    }
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let name = ImageName::parse(&filename);
    let size_bytes = std::fs::metadata(path)?.len();

    let mut analysis = ImageAnalysis {
        filename,
        path: path.to_path_buf(),
        sheet: name.category,
        image_number: name.sequence,
        width: 0,
        height: 0,
        size_bytes,
        size_kb: round_kb(size_bytes),
        format: String::new(),
        mode: String::new(),
        text: String::new(),
        text_lines: Vec::new(),
        has_text: false,
        error: None,
    };

    match image::open(path) {
        Ok(img) => {
            let (width, height) = img.dimensions();
            analysis.width = width;
            analysis.height = height;
            analysis.format = image::ImageFormat::from_path(path)
                .map(|f| format!("{f:?}").to_uppercase())
                .unwrap_or_default();
            analysis.mode = format!("{:?}", img.color());
        }
        Err(e) => {
            log::warn!("failed to decode {}: {e}", path.display());
            analysis.error = Some(e.to_string());
            return Ok(analysis);
        }
    }

    if let Some(text) = ocr.recognize(path) {
        analysis.text_lines = text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(String::from)
            .collect();
        analysis.has_text = !analysis.text_lines.is_empty();
        analysis.text = text;
    }

    Ok(analysis)
}

/// Analyze every screenshot in a directory, sorted by filename.
///
/// # Errors
///
/// Returns [`ImageError::MissingDir`] when the directory does not exist;
/// individual images never fail the batch.
pub fn analyze_directory(dir: &Path, ocr: OcrEngine) -> Result<Vec<ImageAnalysis>> {
    if !dir.is_dir() {
        return Err(ImageError::MissingDir(dir.to_path_buf()));
    }

    let mut paths: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(std::result::Result::ok)
        .map(|entry| entry.path())
        .filter(|path| is_image_file(path))
        .collect();
    paths.sort();

    log::info!("analyzing {} images in {}", paths.len(), dir.display());
    paths.iter().map(|path| analyze_image(path, ocr)).collect()
}

fn is_image_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&ext.as_str())
        })
}
