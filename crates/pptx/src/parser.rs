//! Slide XML parsing and rewriting.
//!
//! Reads shape names, geometry, and text from OOXML slide parts, and
//! rewrites a single shape's text in place while leaving the rest of the
//! markup untouched.

use dsd_core::{Error, Result};
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};

/// EMUs per inch in OOXML geometry.
pub const EMU_PER_INCH: f64 = 914_400.0;

/// One shape extracted from a slide part.
#[derive(Debug, Default, Clone)]
pub struct SlideShape {
    /// Shape name from `cNvPr`.
    pub name: String,
    /// Text content, paragraphs joined with newlines.
    pub text: String,
    /// Left edge in EMUs.
    pub x: f64,
    /// Top edge in EMUs.
    pub y: f64,
    /// Width in EMUs.
    pub cx: f64,
    /// Height in EMUs.
    pub cy: f64,
    /// Whether this is a title-typed placeholder.
    pub is_title: bool,
}

/// Extract every text-bearing shape from a slide part.
pub fn extract_shapes(xml_content: &str) -> Result<Vec<SlideShape>> {
    let mut shapes = Vec::new();
    let mut reader = Reader::from_str(xml_content);
    reader.trim_text(true);

    let mut current_shape: Option<SlideShape> = None;
    let mut in_text_body = false;
    let mut in_paragraph = false;
    let mut current_text = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) | Ok(Event::Empty(ref e)) => {
                let name = e.name();
                match local_name(name.as_ref()) {
                    b"sp" => {
                        current_shape = Some(SlideShape::default());
                    }
                    b"cNvPr" => {
                        if let Some(ref mut shape) = current_shape {
                            if shape.name.is_empty() {
                                for attr in e.attributes().flatten() {
                                    if attr.key.as_ref() == b"name" {
                                        shape.name =
                                            String::from_utf8_lossy(&attr.value).to_string();
                                    }
                                }
                            }
                        }
                    }
                    b"ph" => {
                        if let Some(ref mut shape) = current_shape {
                            for attr in e.attributes().flatten() {
                                if attr.key.as_ref() == b"type" {
                                    let ph_type = String::from_utf8_lossy(&attr.value);
                                    if ph_type == "title" || ph_type == "ctrTitle" {
                                        shape.is_title = true;
                                    }
                                }
                            }
                        }
                    }
                    b"off" => {
                        if let Some(ref mut shape) = current_shape {
                            for attr in e.attributes().flatten() {
                                let value = String::from_utf8_lossy(&attr.value);
                                match attr.key.as_ref() {
                                    b"x" => {
                                        if let Ok(x) = value.parse::<f64>() {
                                            shape.x = x;
                                        }
                                    }
                                    b"y" => {
                                        if let Ok(y) = value.parse::<f64>() {
                                            shape.y = y;
                                        }
                                    }
                                    _ => {}
                                }
                            }
                        }
                    }
                    b"ext" => {
                        if let Some(ref mut shape) = current_shape {
                            for attr in e.attributes().flatten() {
                                let value = String::from_utf8_lossy(&attr.value);
                                match attr.key.as_ref() {
                                    b"cx" => {
                                        if let Ok(cx) = value.parse::<f64>() {
                                            shape.cx = cx;
                                        }
                                    }
                                    b"cy" => {
                                        if let Ok(cy) = value.parse::<f64>() {
                                            shape.cy = cy;
                                        }
                                    }
                                    _ => {}
                                }
                            }
                        }
                    }
                    b"txBody" => {
                        in_text_body = true;
                    }
                    b"p" if in_text_body => {
                        in_paragraph = true;
                        if !current_text.is_empty() {
                            current_text.push('\n');
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(ref e)) => {
                if in_paragraph {
                    let text = e.unescape().unwrap_or_default();
                    current_text.push_str(&text);
                }
            }
            Ok(Event::End(ref e)) => match local_name(e.name().as_ref()) {
                b"sp" => {
                    if let Some(mut shape) = current_shape.take() {
                        shape.text = current_text.trim().to_string();
                        if !shape.text.is_empty() {
                            shapes.push(shape);
                        }
                    }
                    current_text.clear();
                    in_text_body = false;
                    in_paragraph = false;
                }
                b"txBody" => {
                    in_text_body = false;
                }
                b"p" => {
                    in_paragraph = false;
                }
                _ => {}
            },
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(Error::XmlError(format!("Error parsing slide: {}", e)));
            }
            _ => {}
        }
    }

    Ok(shapes)
}

/// Pick a slide title from its shapes: a title-typed placeholder first,
/// else the first reasonably short text, else "Untitled".
pub fn slide_title(shapes: &[SlideShape]) -> String {
    for shape in shapes {
        if shape.is_title && !shape.text.is_empty() {
            return shape.text.clone();
        }
    }
    for shape in shapes {
        if !shape.text.is_empty() && shape.text.len() < 80 {
            return shape.text.clone();
        }
    }
    "Untitled".to_string()
}

/// Rewrite one shape's text in a slide part.
///
/// The first text run of the matched shape receives the full new text and
/// every later run in that shape is emptied, so the replacement is
/// wholesale. Returns the rewritten XML and whether a run was written.
pub fn replace_shape_text(
    xml_content: &str,
    shape_name: &str,
    new_text: &str,
) -> Result<(String, bool)> {
    let mut reader = Reader::from_str(xml_content);
    let mut writer = Writer::new(Vec::new());

    let mut in_shape = false;
    let mut in_target = false;
    let mut in_text_run = false;
    let mut replaced = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                match local_name(e.name().as_ref()) {
                    b"sp" => {
                        in_shape = true;
                        in_target = false;
                    }
                    b"cNvPr" if in_shape && !in_target => {
                        for attr in e.attributes().flatten() {
                            if attr.key.as_ref() == b"name"
                                && String::from_utf8_lossy(&attr.value) == shape_name
                            {
                                in_target = true;
                            }
                        }
                    }
                    b"t" if in_target => {
                        in_text_run = true;
                    }
                    _ => {}
                }
                writer
                    .write_event(Event::Start(e))
                    .map_err(|e| Error::XmlError(e.to_string()))?;
            }
            Ok(Event::Empty(e)) => {
                if in_shape && !in_target && local_name(e.name().as_ref()) == b"cNvPr" {
                    for attr in e.attributes().flatten() {
                        if attr.key.as_ref() == b"name"
                            && String::from_utf8_lossy(&attr.value) == shape_name
                        {
                            in_target = true;
                        }
                    }
                }
                writer
                    .write_event(Event::Empty(e))
                    .map_err(|e| Error::XmlError(e.to_string()))?;
            }
            Ok(Event::Text(e)) => {
                if in_text_run {
                    // First run gets the full text; later runs are emptied.
                    if !replaced {
                        writer
                            .write_event(Event::Text(BytesText::new(new_text)))
                            .map_err(|e| Error::XmlError(e.to_string()))?;
                        replaced = true;
                    }
                } else {
                    writer
                        .write_event(Event::Text(e))
                        .map_err(|e| Error::XmlError(e.to_string()))?;
                }
            }
            Ok(Event::End(e)) => {
                match local_name(e.name().as_ref()) {
                    b"sp" => {
                        in_shape = false;
                        in_target = false;
                    }
                    b"t" => {
                        in_text_run = false;
                    }
                    _ => {}
                }
                writer
                    .write_event(Event::End(e))
                    .map_err(|e| Error::XmlError(e.to_string()))?;
            }
            Ok(Event::Eof) => break,
            Ok(event) => {
                writer
                    .write_event(event)
                    .map_err(|e| Error::XmlError(e.to_string()))?;
            }
            Err(e) => {
                return Err(Error::XmlError(format!("Error rewriting slide: {}", e)));
            }
        }
    }

    let bytes = writer.into_inner();
    let xml = String::from_utf8(bytes)
        .map_err(|e| Error::XmlError(format!("Rewritten slide is not UTF-8: {}", e)))?;

    Ok((xml, replaced))
}

/// Extract the local name from a potentially namespaced XML element name.
pub(crate) fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Extract a trailing number from a string like "rId2" or "slide3.xml".
pub(crate) fn extract_slide_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".xml").trim_end_matches(".rels");

    let digits: String = s.chars().rev().take_while(|c| c.is_ascii_digit()).collect();
    if digits.is_empty() {
        return None;
    }
    let digits: String = digits.chars().rev().collect();
    digits.parse().ok()
}
