//! Embedded screenshot extraction
//!
//! XLSX stores worksheet images inside the ZIP container:
//! - `xl/drawings/drawingN.xml`: picture definitions with relationship IDs
//! - `xl/drawings/_rels/drawingN.xml.rels`: maps relationship IDs to media paths
//! - `xl/media/`: the image bytes
//!
//! Extracted files are named `{SheetName}_image_{N}.{ext}` so the image
//! filename correlator can map them back to their sheet. The extension is
//! sniffed from magic bytes, defaulting to `png`.

use std::collections::HashMap;
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use quick_xml::events::Event;
use quick_xml::Reader as XmlReader;
use serde::Serialize;
use zip::ZipArchive;

use crate::error::{Result, XlsxError};
use crate::read;

/// One image written to the output directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExtractedImage {
    /// `{SheetName}_image_{N}.{ext}`
    pub filename: String,
    /// Sheet the image was anchored on
    pub sheet: String,
    /// Image size in bytes
    pub bytes: usize,
    /// Full path of the written file
    pub path: PathBuf,
}

/// Extract every embedded image of a workbook into `out_dir`.
///
/// Images are numbered per sheet in drawing order, starting at 1. A sheet
/// without a drawing part simply contributes no images. Unresolvable
/// relationships and unreadable media entries are logged and skipped; they
/// never abort the batch.
///
/// # Errors
///
/// Returns [`XlsxError::MissingFile`] for an absent workbook,
/// [`XlsxError::Container`] when the file is not a readable ZIP archive, and
/// IO errors from creating or writing the output directory.
pub fn extract_images<P: AsRef<Path>>(workbook: P, out_dir: &Path) -> Result<Vec<ExtractedImage>> {
    let workbook = workbook.as_ref();
    let sheet_names = read::sheet_names(workbook)?;

    let file = File::open(workbook)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| XlsxError::Container(format!("failed to open workbook as ZIP: {e}")))?;

    fs::create_dir_all(out_dir)?;

    let mut extracted = Vec::new();
    for (sheet_idx, sheet) in sheet_names.iter().enumerate() {
        for (n, bytes) in sheet_images(&mut archive, sheet_idx).into_iter().enumerate() {
            let ext = sniff_extension(&bytes);
            let filename = format!("{sheet}_image_{}.{ext}", n + 1);
            let path = out_dir.join(&filename);
            fs::write(&path, &bytes)?;
            log::info!("extracted {filename} ({} bytes)", bytes.len());
            extracted.push(ExtractedImage {
                filename,
                sheet: sheet.clone(),
                bytes: bytes.len(),
                path,
            });
        }
    }
    Ok(extracted)
}

/// Count the embedded images per sheet without writing anything.
///
/// # Errors
///
/// Same failure modes as [`extract_images`], minus the output IO.
pub fn count_images<P: AsRef<Path>>(workbook: P) -> Result<Vec<(String, usize)>> {
    let workbook = workbook.as_ref();
    let sheet_names = read::sheet_names(workbook)?;

    let file = File::open(workbook)?;
    let mut archive = ZipArchive::new(file)
        .map_err(|e| XlsxError::Container(format!("failed to open workbook as ZIP: {e}")))?;

    Ok(sheet_names
        .into_iter()
        .enumerate()
        .map(|(idx, name)| {
            let count = drawing_parts(&mut archive, idx)
                .map_or(0, |(drawing, _)| parse_drawing_for_pictures(&drawing).len());
            (name, count)
        })
        .collect())
}

/// Collect the image bytes anchored on one sheet, in drawing order
fn sheet_images(archive: &mut ZipArchive<File>, sheet_idx: usize) -> Vec<Vec<u8>> {
    let Some((drawing_xml, rels_xml)) = drawing_parts(archive, sheet_idx) else {
        return Vec::new();
    };
    let rel_ids = parse_drawing_for_pictures(&drawing_xml);
    let relationships = parse_relationships(&rels_xml);

    let mut images = Vec::new();
    for rel_id in rel_ids {
        let Some(target) = relationships.get(&rel_id) else {
            log::warn!("drawing references unknown relationship {rel_id}");
            continue;
        };
        match read_zip_bytes(archive, &resolve_media_path(target)) {
            Ok(bytes) => images.push(bytes),
            Err(e) => log::warn!("failed to read media for {rel_id}: {e}"),
        }
    }
    images
}

/// Read the drawing XML and its relationships file for a sheet, if present.
///
/// Sheets map to drawings positionally (sheet 1 → drawing1.xml); a sheet
/// without images has no drawing part at all.
fn drawing_parts(archive: &mut ZipArchive<File>, sheet_idx: usize) -> Option<(String, String)> {
    let drawing_num = sheet_idx + 1;
    let drawing = read_zip_string(archive, &format!("xl/drawings/drawing{drawing_num}.xml")).ok()?;
    let rels = read_zip_string(
        archive,
        &format!("xl/drawings/_rels/drawing{drawing_num}.xml.rels"),
    )
    .ok()?;
    Some((drawing, rels))
}

/// Decode one named attribute of an element, if present
fn attribute<B>(
    e: &quick_xml::events::BytesStart<'_>,
    reader: &XmlReader<B>,
    key: &[u8],
) -> Option<String> {
    e.attributes()
        .filter_map(std::result::Result::ok)
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.decode_and_unescape_value(reader).ok())
        .map(|value| value.to_string())
}

/// Parse drawing XML for `<xdr:pic>` elements and return their `r:embed`
/// relationship IDs in document order
fn parse_drawing_for_pictures(xml: &str) -> Vec<String> {
    let mut rel_ids = Vec::new();
    let mut reader = XmlReader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    let mut in_pic = false;
    let mut current_rel_id: Option<String> = None;

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e) | Event::Empty(e)) => match e.name().as_ref() {
                b"xdr:pic" | b"pic" => in_pic = true,
                b"a:blip" | b"blip" if in_pic => {
                    if let Some(rel_id) = attribute(&e, &reader, b"r:embed")
                        .or_else(|| attribute(&e, &reader, b"embed"))
                    {
                        current_rel_id = Some(rel_id);
                    }
                }
                _ => {}
            },
            Ok(Event::End(e)) => {
                if matches!(e.name().as_ref(), b"xdr:pic" | b"pic") {
                    if let Some(rel_id) = current_rel_id.take() {
                        rel_ids.push(rel_id);
                    }
                    in_pic = false;
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    rel_ids
}

/// Parse a relationships file into an ID → target map.
///
/// Only `Id` and `Target` matter here; relationship types are ignored
/// because the drawing already tells us which IDs are pictures.
fn parse_relationships(xml: &str) -> HashMap<String, String> {
    let mut relationships = HashMap::new();
    let mut reader = XmlReader::from_str(xml);
    reader.trim_text(true);

    let mut buf = Vec::new();
    loop {
        match reader.read_event_into(&mut buf) {
            Ok(Event::Start(e) | Event::Empty(e)) if e.name().as_ref() == b"Relationship" => {
                let id = attribute(&e, &reader, b"Id");
                let target = attribute(&e, &reader, b"Target");
                if let (Some(id), Some(target)) = (id, target) {
                    relationships.insert(id, target);
                }
            }
            Ok(Event::Eof) | Err(_) => break,
            _ => {}
        }
        buf.clear();
    }

    relationships
}

/// Convert a drawing-relative media target like `../media/image1.png` to its
/// archive path `xl/media/image1.png`
fn resolve_media_path(target: &str) -> String {
    target.strip_prefix("../").map_or_else(
        || format!("xl/{target}"),
        |suffix| format!("xl/{suffix}"),
    )
}

/// Pick a file extension from image magic bytes, defaulting to `png`
fn sniff_extension(bytes: &[u8]) -> &'static str {
    if bytes.starts_with(b"\xff\xd8") {
        "jpg"
    } else if bytes.starts_with(b"GIF") {
        "gif"
    } else {
        // PNG header or unknown; the workbook embeds PNG screenshots
        "png"
    }
}

fn read_zip_string(archive: &mut ZipArchive<File>, path: &str) -> Result<String> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| XlsxError::Container(format!("{path} not found in archive: {e}")))?;
    let mut content = String::new();
    file.read_to_string(&mut content)?;
    Ok(content)
}

fn read_zip_bytes(archive: &mut ZipArchive<File>, path: &str) -> Result<Vec<u8>> {
    let mut file = archive
        .by_name(path)
        .map_err(|e| XlsxError::Container(format!("{path} not found in archive: {e}")))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}
