//! PPTX document store implementation.
//!
//! The whole archive is held in memory; text replacements rewrite the
//! affected slide part, and `save` writes a fresh archive.

use std::collections::BTreeMap;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

use dsd_core::{DocumentStore, Error, Result, ShapeRecord};
use quick_xml::events::Event;
use quick_xml::Reader;
use zip::write::FileOptions;
use zip::{ZipArchive, ZipWriter};

use crate::parser::{self, extract_shapes, extract_slide_number, slide_title, EMU_PER_INCH};

/// A loaded PPTX file.
pub struct PptxDocument {
    path: PathBuf,
    /// Every archive entry, keyed by entry name.
    entries: BTreeMap<String, Vec<u8>>,
    /// Slide part names in presentation order.
    slide_parts: Vec<String>,
}

impl PptxDocument {
    /// Open a .pptx file from disk.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        Self::from_bytes(bytes, path)
    }

    /// Load a .pptx from raw bytes, remembering `path` for save defaults.
    pub fn from_bytes(bytes: Vec<u8>, path: impl Into<PathBuf>) -> Result<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::ZipError(format!("Failed to open ZIP: {}", e)))?;

        let mut entries = BTreeMap::new();
        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::ZipError(format!("Failed to read archive entry: {}", e)))?;
            if file.is_dir() {
                continue;
            }
            let mut content = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut content)?;
            entries.insert(file.name().to_string(), content);
        }

        let slide_parts = slide_order(&entries)?;

        Ok(Self {
            path: path.into(),
            entries,
            slide_parts,
        })
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        self.slide_parts.len()
    }

    fn slide_xml(&self, slide_index: usize) -> Result<(&str, String)> {
        let part = self
            .slide_parts
            .get(slide_index)
            .ok_or_else(|| Error::DocumentError(format!("No slide {}", slide_index + 1)))?;
        let bytes = self
            .entries
            .get(part)
            .ok_or_else(|| Error::PptxParseError(format!("Missing slide part '{}'", part)))?;
        Ok((part.as_str(), String::from_utf8_lossy(bytes).to_string()))
    }
}

impl DocumentStore for PptxDocument {
    fn enumerate_placeholder_shapes(&mut self) -> Result<Vec<ShapeRecord>> {
        let mut records = Vec::new();

        for slide_index in 0..self.slide_parts.len() {
            let (_, xml) = self.slide_xml(slide_index)?;
            let shapes = extract_shapes(&xml)?;
            let title = slide_title(&shapes);

            for shape in shapes {
                if shape.text.trim().is_empty() {
                    continue;
                }
                records.push(ShapeRecord {
                    slide_index,
                    slide_title: title.clone(),
                    shape_name: shape.name,
                    text: shape.text,
                    left: shape.x / EMU_PER_INCH,
                    top: shape.y / EMU_PER_INCH,
                    width: shape.cx / EMU_PER_INCH,
                    height: shape.cy / EMU_PER_INCH,
                });
            }
        }

        Ok(records)
    }

    fn replace_shape_text(
        &mut self,
        slide_index: usize,
        shape_name: &str,
        new_text: &str,
    ) -> Result<bool> {
        if slide_index >= self.slide_parts.len() {
            return Ok(false);
        }

        let (part, xml) = self.slide_xml(slide_index)?;
        let part = part.to_string();
        let (rewritten, replaced) = parser::replace_shape_text(&xml, shape_name, new_text)?;

        if replaced {
            self.entries.insert(part, rewritten.into_bytes());
        }

        Ok(replaced)
    }

    fn save(&mut self, output_path: Option<&Path>) -> Result<String> {
        let output = match output_path {
            Some(p) => p.to_path_buf(),
            None => default_output_path(&self.path),
        };

        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        for (name, content) in &self.entries {
            writer
                .start_file(name.as_str(), options)
                .map_err(|e| Error::ZipError(format!("Failed to write '{}': {}", name, e)))?;
            writer.write_all(content)?;
        }

        let cursor = writer
            .finish()
            .map_err(|e| Error::ZipError(format!("Failed to finalize archive: {}", e)))?;

        std::fs::write(&output, cursor.into_inner())?;
        log::info!("saved populated document to {}", output.display());

        Ok(output.display().to_string())
    }
}

/// Default save target: `<stem>_populated.pptx` next to the input.
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    let ext = input.extension().and_then(|e| e.to_str()).unwrap_or("pptx");
    let filename = format!("{}_populated.{}", stem, ext);
    match input.parent() {
        Some(parent) => parent.join(filename),
        None => PathBuf::from(filename),
    }
}

/// Determine slide part names in presentation order from the
/// relationships part.
fn slide_order(entries: &BTreeMap<String, Vec<u8>>) -> Result<Vec<String>> {
    let rels = entries
        .get("ppt/_rels/presentation.xml.rels")
        .ok_or_else(|| {
            Error::PptxParseError("Missing ppt/_rels/presentation.xml.rels".to_string())
        })?;
    let rels_content = String::from_utf8_lossy(rels);

    let mut slides: Vec<(String, Option<usize>)> = Vec::new();
    let mut reader = Reader::from_str(&rels_content);
    reader.trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                if e.name().as_ref() == b"Relationship" =>
            {
                let mut rel_type = String::new();
                let mut target = String::new();
                let mut id = String::new();

                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"Type" => rel_type = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Target" => target = String::from_utf8_lossy(&attr.value).to_string(),
                        b"Id" => id = String::from_utf8_lossy(&attr.value).to_string(),
                        _ => {}
                    }
                }

                if rel_type.contains("/slide")
                    && !rel_type.contains("slideLayout")
                    && !rel_type.contains("slideMaster")
                {
                    let order = extract_slide_number(&target).or_else(|| extract_slide_number(&id));
                    let full_path = if let Some(stripped) = target.strip_prefix('/') {
                        stripped.to_string()
                    } else {
                        format!("ppt/{}", target)
                    };
                    slides.push((full_path, order));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!(
                    "Error parsing relationships: {}",
                    e
                )));
            }
            _ => {}
        }
    }

    slides.sort_by(|a, b| match (a.1, b.1) {
        (Some(na), Some(nb)) => na.cmp(&nb),
        (Some(_), None) => std::cmp::Ordering::Less,
        (None, Some(_)) => std::cmp::Ordering::Greater,
        (None, None) => a.0.cmp(&b.0),
    });

    Ok(slides.into_iter().map(|(path, _)| path).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RELS_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId3" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide2.xml"/>
  <Relationship Id="rId2" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slide" Target="slides/slide1.xml"/>
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/slideMaster" Target="slideMasters/slideMaster1.xml"/>
</Relationships>"#;

    fn slide_xml(title: &str, boxes: &[(&str, u64, u64)]) -> String {
        let mut body = format!(
            r#"<p:sp><p:nvSpPr><p:cNvPr id="1" name="Title 1"/><p:nvPr><p:ph type="title"/></p:nvPr></p:nvSpPr><p:spPr><a:xfrm><a:off x="0" y="0"/><a:ext cx="8229600" cy="914400"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>{}</a:t></a:r></a:p></p:txBody></p:sp>"#,
            title
        );
        for (name, x, y) in boxes {
            body.push_str(&format!(
                r#"<p:sp><p:nvSpPr><p:cNvPr id="2" name="{}"/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="914400" cy="457200"/></a:xfrm></p:spPr><p:txBody><a:p><a:r><a:t>Lorem ipsum</a:t></a:r></a:p></p:txBody></p:sp>"#,
                name, x, y
            ));
        }
        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
            body
        )
    }

    fn build_archive() -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();

        writer
            .start_file("ppt/_rels/presentation.xml.rels", options)
            .unwrap();
        writer.write_all(RELS_XML.as_bytes()).unwrap();

        writer.start_file("ppt/slides/slide1.xml", options).unwrap();
        writer
            .write_all(
                slide_xml(
                    "Current State",
                    &[("Box 1", 914400, 1828800), ("Box 2", 2743200, 1828800)],
                )
                .as_bytes(),
            )
            .unwrap();

        writer.start_file("ppt/slides/slide2.xml", options).unwrap();
        writer
            .write_all(slide_xml("Target State", &[("Box A", 914400, 914400)]).as_bytes())
            .unwrap();

        writer.finish().unwrap().into_inner()
    }

    #[test]
    fn test_slide_order_numeric() {
        let doc = PptxDocument::from_bytes(build_archive(), "deck.pptx").unwrap();
        assert_eq!(doc.slide_count(), 2);
        assert_eq!(doc.slide_parts[0], "ppt/slides/slide1.xml");
        assert_eq!(doc.slide_parts[1], "ppt/slides/slide2.xml");
    }

    #[test]
    fn test_enumerate_shapes() {
        let mut doc = PptxDocument::from_bytes(build_archive(), "deck.pptx").unwrap();
        let records = doc.enumerate_placeholder_shapes().unwrap();

        // Titles plus boxes on both slides.
        assert_eq!(records.len(), 5);

        let box1 = records.iter().find(|r| r.shape_name == "Box 1").unwrap();
        assert_eq!(box1.slide_index, 0);
        assert_eq!(box1.slide_title, "Current State");
        assert!((box1.left - 1.0).abs() < 1e-9);
        assert!((box1.top - 2.0).abs() < 1e-9);
        assert!(box1.is_placeholder());

        let title = records.iter().find(|r| r.shape_name == "Title 1").unwrap();
        assert!(!title.is_placeholder());

        let box_a = records.iter().find(|r| r.shape_name == "Box A").unwrap();
        assert_eq!(box_a.slide_index, 1);
        assert_eq!(box_a.slide_title, "Target State");
    }

    #[test]
    fn test_replace_and_reenumerate() {
        let mut doc = PptxDocument::from_bytes(build_archive(), "deck.pptx").unwrap();

        assert!(doc.replace_shape_text(0, "Box 1", "CRM").unwrap());
        assert!(!doc.replace_shape_text(0, "Ghost", "CRM").unwrap());
        assert!(!doc.replace_shape_text(9, "Box 1", "CRM").unwrap());

        let records = doc.enumerate_placeholder_shapes().unwrap();
        let box1 = records.iter().find(|r| r.shape_name == "Box 1").unwrap();
        assert_eq!(box1.text, "CRM");

        // Other shapes untouched.
        let box2 = records.iter().find(|r| r.shape_name == "Box 2").unwrap();
        assert_eq!(box2.text, "Lorem ipsum");
    }

    #[test]
    fn test_default_output_path() {
        assert_eq!(
            default_output_path(Path::new("/tmp/deck.pptx")),
            PathBuf::from("/tmp/deck_populated.pptx")
        );
        assert_eq!(
            default_output_path(Path::new("deck.pptx")),
            PathBuf::from("deck_populated.pptx")
        );
    }
}
