//! Batch analysis reports
//!
//! A batch of [`ImageAnalysis`] records is grouped by sheet into an
//! [`AnalysisReport`], serialized as JSON for machine consumers and rendered
//! as Markdown for humans. The fix checklist is a second Markdown view over
//! the same report, meant to be worked through item by item.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::Path;

use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::analyze::ImageAnalysis;
use crate::error::{ImageError, Result};

/// Per-sheet cap on entries in the detailed Markdown listing
const DETAIL_LIMIT: usize = 20;

/// One image entry of the JSON report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageEntry {
    /// File name, e.g. `Registration.Login_image_3.png`
    pub filename: String,
    /// Sequence number parsed from the filename
    pub image_number: usize,
    /// Pixel dimensions as `WxH`
    pub dimensions: String,
    /// File size in KB, two decimals
    pub size_kb: f64,
    /// True when OCR found text
    pub has_text: bool,
    /// Recognized text, absent when OCR was off or found nothing
    pub text: Option<String>,
    /// Non-blank recognized lines
    pub text_lines: Vec<String>,
    /// Path of the analyzed file
    pub path: String,
    /// Decode failure message; dimensions are zeroed when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ImageEntry {
    fn from_analysis(analysis: &ImageAnalysis) -> Self {
        Self {
            filename: analysis.filename.clone(),
            image_number: analysis.image_number,
            dimensions: analysis.dimensions(),
            size_kb: analysis.size_kb,
            has_text: analysis.has_text,
            text: (!analysis.text.is_empty()).then(|| analysis.text.clone()),
            text_lines: analysis.text_lines.clone(),
            path: analysis.path.display().to_string(),
            error: analysis.error.clone(),
        }
    }
}

/// All images of one sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SheetImages {
    /// Number of images on this sheet
    pub count: usize,
    /// Entries sorted by ascending image number
    pub images: Vec<ImageEntry>,
}

/// Roll-up counters of a batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportSummary {
    /// Total images analyzed
    pub total_images: usize,
    /// Sheet names present in the batch
    pub sheets: Vec<String>,
    /// Images per sheet
    pub sheet_counts: BTreeMap<String, usize>,
}

/// The full batch analysis report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// When the batch ran, RFC 3339 local time
    pub generated_at: String,
    /// Roll-up counters
    pub summary: ReportSummary,
    /// Per-sheet image entries, sheets in lexicographic order
    pub by_sheet: BTreeMap<String, SheetImages>,
}

impl AnalysisReport {
    /// Group a batch of analyses into a report.
    ///
    /// Sheets are keyed by the category parsed from each filename; entries
    /// within a sheet are sorted by ascending image number.
    #[must_use]
    pub fn build(analyses: &[ImageAnalysis]) -> Self {
        let mut by_sheet: BTreeMap<String, SheetImages> = BTreeMap::new();
        for analysis in analyses {
            by_sheet
                .entry(analysis.sheet.clone())
                .or_insert_with(|| SheetImages {
                    count: 0,
                    images: Vec::new(),
                })
                .images
                .push(ImageEntry::from_analysis(analysis));
        }
        for sheet in by_sheet.values_mut() {
            sheet.images.sort_by_key(|entry| entry.image_number);
            sheet.count = sheet.images.len();
        }

        let sheet_counts: BTreeMap<String, usize> = by_sheet
            .iter()
            .map(|(name, sheet)| (name.clone(), sheet.count))
            .collect();

        Self {
            generated_at: Local::now().to_rfc3339(),
            summary: ReportSummary {
                total_images: analyses.len(),
                sheets: by_sheet.keys().cloned().collect(),
                sheet_counts,
            },
            by_sheet,
        }
    }

    /// Write the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns IO and serialization errors.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path.as_ref(), json)?;
        log::info!("report saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Load a previously saved JSON report.
    ///
    /// # Errors
    ///
    /// Returns [`ImageError::MissingFile`] for an absent report and
    /// [`ImageError::Report`] for malformed JSON.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ImageError::MissingFile(path.to_path_buf()));
        }
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Render the human-readable summary as Markdown
    #[must_use]
    pub fn to_markdown(&self) -> String {
        let mut md = String::from("# Image Analysis Summary\n");
        let _ = writeln!(md, "Generated: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));
        let _ = writeln!(md, "**Total Images:** {}", self.summary.total_images);
        let _ = writeln!(md, "**Sheets Found:** {}\n", self.summary.sheets.len());

        md.push_str("## Sheets Overview\n\n");
        for (sheet_name, sheet) in &self.by_sheet {
            let total_kb: f64 = sheet.images.iter().map(|img| img.size_kb).sum();
            let with_text = sheet.images.iter().filter(|img| img.has_text).count();
            let _ = writeln!(md, "### {sheet_name}");
            let _ = writeln!(md, "- **Images:** {}", sheet.count);
            let _ = writeln!(md, "- **With Text (OCR):** {with_text}");
            let _ = writeln!(md, "- **Total Size:** {:.2} MB\n", total_kb / 1024.0);
        }

        md.push_str("## Detailed Image List\n\n");
        for (sheet_name, sheet) in &self.by_sheet {
            let _ = writeln!(md, "### {sheet_name} ({} images)\n", sheet.count);
            for img in sheet.images.iter().take(DETAIL_LIMIT) {
                let _ = writeln!(md, "#### {}", img.filename);
                let _ = writeln!(md, "- Dimensions: {}", img.dimensions);
                let _ = writeln!(md, "- Size: {} KB", img.size_kb);
                if img.has_text {
                    if let Some(text) = &img.text {
                        let preview: String = text.chars().take(100).collect();
                        let _ = writeln!(md, "- Text Preview: {preview}...");
                    }
                }
                md.push('\n');
            }
            if sheet.count > DETAIL_LIMIT {
                let _ = writeln!(md, "*... and {} more images*\n", sheet.count - DETAIL_LIMIT);
            }
        }
        md
    }

    /// Render the fix checklist as Markdown, one checkbox per image
    #[must_use]
    pub fn to_checklist(&self) -> String {
        let mut md = String::from("# Fix Checklist - Job Finder Test Cases\n");
        let _ = writeln!(md, "Generated: {}\n", Local::now().format("%Y-%m-%d %H:%M:%S"));
        md.push_str("## How to Use\n");
        md.push_str("- [ ] Mark items as complete when fixed\n");
        md.push_str("- Review the matching screenshot for each item\n");
        md.push_str("- Focus on one sheet at a time\n\n---\n\n");

        for (sheet_name, sheet) in &self.by_sheet {
            let _ = writeln!(md, "## {sheet_name} ({} items)\n", sheet.count);
            for img in &sheet.images {
                let _ = writeln!(
                    md,
                    "- [ ] **{}** ({}) - *Image #{}*",
                    img.filename, img.dimensions, img.image_number
                );
            }
            md.push_str("\n---\n\n");
        }
        md
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn analysis(filename: &str, sheet: &str, number: usize, text: &str) -> ImageAnalysis {
        ImageAnalysis {
            filename: filename.to_string(),
            path: PathBuf::from("shots").join(filename),
            sheet: sheet.to_string(),
            image_number: number,
            width: 800,
            height: 600,
            size_bytes: 2048,
            size_kb: 2.0,
            format: "PNG".to_string(),
            mode: "Rgba8".to_string(),
            text: text.to_string(),
            text_lines: text
                .lines()
                .filter(|l| !l.trim().is_empty())
                .map(String::from)
                .collect(),
            has_text: !text.is_empty(),
            error: None,
        }
    }

    fn sample_batch() -> Vec<ImageAnalysis> {
        vec![
            analysis("Search_image_3.png", "Search", 3, ""),
            analysis("Search_image_1.png", "Search", 1, "No results found"),
            analysis("Search_image_2.png", "Search", 2, ""),
            analysis("Profile_image_1.png", "Profile", 1, ""),
        ]
    }

    #[test]
    fn test_build_groups_and_sorts() {
        let report = AnalysisReport::build(&sample_batch());
        assert_eq!(report.summary.total_images, 4);
        assert_eq!(report.summary.sheets, vec!["Profile", "Search"]);
        assert_eq!(report.summary.sheet_counts["Search"], 3);

        let search = &report.by_sheet["Search"];
        assert_eq!(search.count, 3);
        let numbers: Vec<usize> = search.images.iter().map(|i| i.image_number).collect();
        assert_eq!(numbers, vec![1, 2, 3]);
    }

    #[test]
    fn test_decode_error_is_carried_into_report() {
        let mut broken = analysis("Broken_image_1.png", "Broken", 1, "");
        broken.error = Some("decode failed".to_string());
        broken.width = 0;
        broken.height = 0;

        let report = AnalysisReport::build(&[broken]);
        let entry = &report.by_sheet["Broken"].images[0];
        assert_eq!(entry.error.as_deref(), Some("decode failed"));

        // The diagnostic survives into the persisted JSON
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("decode failed"));
    }

    #[test]
    fn test_entry_error_is_absent_for_healthy_images() {
        let report = AnalysisReport::build(&sample_batch());
        let json = serde_json::to_string(&report).unwrap();
        assert!(!json.contains("\"error\""));
    }

    #[test]
    fn test_entry_text_is_absent_without_ocr() {
        let report = AnalysisReport::build(&sample_batch());
        let profile = &report.by_sheet["Profile"].images[0];
        assert_eq!(profile.text, None);
        assert!(!profile.has_text);

        let search = &report.by_sheet["Search"].images[0];
        assert_eq!(search.text.as_deref(), Some("No results found"));
        assert!(search.has_text);
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");

        let report = AnalysisReport::build(&sample_batch());
        report.save(&path).unwrap();
        let loaded = AnalysisReport::load(&path).unwrap();
        assert_eq!(loaded, report);
    }

    #[test]
    fn test_load_missing_report() {
        let err = AnalysisReport::load("no/such/report.json").unwrap_err();
        assert!(matches!(err, ImageError::MissingFile(_)));
    }

    #[test]
    fn test_markdown_summary_sections() {
        let md = AnalysisReport::build(&sample_batch()).to_markdown();
        assert!(md.starts_with("# Image Analysis Summary"));
        assert!(md.contains("**Total Images:** 4"));
        assert!(md.contains("### Search"));
        assert!(md.contains("- **With Text (OCR):** 1"));
        assert!(md.contains("- Text Preview: No results found..."));
    }

    #[test]
    fn test_checklist_one_checkbox_per_image() {
        let md = AnalysisReport::build(&sample_batch()).to_checklist();
        assert_eq!(md.matches("- [ ] **").count(), 4);
        assert!(md.contains("## Search (3 items)"));
        assert!(md.contains("- [ ] **Search_image_1.png** (800x600) - *Image #1*"));
    }
}
