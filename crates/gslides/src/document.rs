//! Google Slides document store implementation.
//!
//! Talks to the Slides REST API with a caller-supplied OAuth bearer token.
//! Text replacements are sent as deleteText + insertText batchUpdate pairs
//! and apply immediately; `save` is a no-op that returns the presentation
//! URL.

use std::path::Path;

use dsd_core::{DocumentStore, Error, Result, ShapeRecord};
use serde_json::{json, Value};
use ureq::Agent;

const API_BASE: &str = "https://slides.googleapis.com/v1/presentations";

/// EMUs per inch.
const EMU_PER_INCH: f64 = 914_400.0;

/// Points per inch.
const PT_PER_INCH: f64 = 72.0;

/// A Google Slides presentation opened for population.
pub struct GoogleSlidesDocument {
    agent: Agent,
    token: String,
    presentation_id: String,
    presentation: Value,
}

impl GoogleSlidesDocument {
    /// Fetch a presentation by id using the given OAuth bearer token.
    pub fn connect(presentation_id: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let presentation_id = presentation_id.into();
        let token = token.into();

        let agent: Agent = Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .into();

        let url = format!("{}/{}", API_BASE, presentation_id);
        let mut response = agent
            .get(&url)
            .header("Authorization", &format!("Bearer {}", token))
            .call()
            .map_err(|e| Error::HttpError(e.to_string()))?;

        let status = response.status();
        let presentation: Value = response
            .body_mut()
            .read_json()
            .map_err(|e| Error::HttpError(e.to_string()))?;

        if !status.is_success() {
            return Err(Error::SlidesApiError(format!(
                "failed to load presentation {}: HTTP {}",
                presentation_id, status
            )));
        }

        Ok(Self {
            agent,
            token,
            presentation_id,
            presentation,
        })
    }

    /// URL of the presentation in the Slides editor.
    pub fn url(&self) -> String {
        format!(
            "https://docs.google.com/presentation/d/{}/edit",
            self.presentation_id
        )
    }

    /// Number of slides.
    pub fn slide_count(&self) -> usize {
        slides_of(&self.presentation).len()
    }

    fn object_id_on_slide(&self, slide_index: usize, shape_name: &str) -> Option<String> {
        let slide = slides_of(&self.presentation).get(slide_index)?;
        for element in page_elements(slide) {
            if element.get("shape").is_some()
                && element.get("objectId").and_then(Value::as_str) == Some(shape_name)
            {
                return Some(shape_name.to_string());
            }
        }
        None
    }
}

impl DocumentStore for GoogleSlidesDocument {
    fn enumerate_placeholder_shapes(&mut self) -> Result<Vec<ShapeRecord>> {
        let mut records = Vec::new();

        for (slide_index, slide) in slides_of(&self.presentation).iter().enumerate() {
            let title = slide_title(slide);

            for element in page_elements(slide) {
                if element.get("shape").is_none() {
                    continue;
                }
                let text = element_text(element);
                if text.trim().is_empty() {
                    continue;
                }
                let Some(object_id) = element.get("objectId").and_then(Value::as_str) else {
                    continue;
                };

                let (left, top, width, height) = element_geometry(element);
                records.push(ShapeRecord {
                    slide_index,
                    slide_title: title.clone(),
                    shape_name: object_id.to_string(),
                    text: text.trim().to_string(),
                    left,
                    top,
                    width,
                    height,
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
        let Some(object_id) = self.object_id_on_slide(slide_index, shape_name) else {
            return Ok(false);
        };

        let body = json!({ "requests": build_replace_requests(&object_id, new_text) });
        let url = format!("{}/{}:batchUpdate", API_BASE, self.presentation_id);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &format!("Bearer {}", self.token))
            .send_json(&body)
            .map_err(|e| Error::HttpError(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SlidesApiError(format!(
                "batchUpdate for '{}' failed: HTTP {}",
                object_id, status
            )));
        }

        Ok(true)
    }

    fn save(&mut self, _output_path: Option<&Path>) -> Result<String> {
        // Updates were applied by batchUpdate already.
        Ok(self.url())
    }
}

/// Build the request pair that resets a shape's text wholesale.
///
/// Deleting the full range first makes repeated application idempotent.
pub fn build_replace_requests(object_id: &str, new_text: &str) -> Value {
    json!([
        {
            "deleteText": {
                "objectId": object_id,
                "textRange": { "type": "ALL" }
            }
        },
        {
            "insertText": {
                "objectId": object_id,
                "insertionIndex": 0,
                "text": new_text
            }
        }
    ])
}

fn slides_of(presentation: &Value) -> &[Value] {
    presentation
        .get("slides")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

fn page_elements(slide: &Value) -> &[Value] {
    slide
        .get("pageElements")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Concatenate a shape element's text runs.
pub fn element_text(element: &Value) -> String {
    let mut text = String::new();
    if let Some(runs) = element
        .pointer("/shape/text/textElements")
        .and_then(Value::as_array)
    {
        for run in runs {
            if let Some(content) = run.pointer("/textRun/content").and_then(Value::as_str) {
                text.push_str(content);
            }
        }
    }
    text
}

/// Position and size in inches from a page element's transform and size.
pub fn element_geometry(element: &Value) -> (f64, f64, f64, f64) {
    let unit = element
        .pointer("/transform/unit")
        .and_then(Value::as_str)
        .unwrap_or("EMU");

    let left = to_inches(
        element
            .pointer("/transform/translateX")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        unit,
    );
    let top = to_inches(
        element
            .pointer("/transform/translateY")
            .and_then(Value::as_f64)
            .unwrap_or(0.0),
        unit,
    );
    let width = dimension_to_inches(element.pointer("/size/width"));
    let height = dimension_to_inches(element.pointer("/size/height"));

    (left, top, width, height)
}

fn dimension_to_inches(dimension: Option<&Value>) -> f64 {
    let Some(dimension) = dimension else {
        return 0.0;
    };
    let magnitude = dimension
        .get("magnitude")
        .and_then(Value::as_f64)
        .unwrap_or(0.0);
    let unit = dimension.get("unit").and_then(Value::as_str).unwrap_or("EMU");
    to_inches(magnitude, unit)
}

fn to_inches(magnitude: f64, unit: &str) -> f64 {
    match unit {
        "EMU" => magnitude / EMU_PER_INCH,
        "PT" => magnitude / PT_PER_INCH,
        _ => magnitude,
    }
}

/// Slide title: the TITLE-typed placeholder first, else the first short
/// text, else "Untitled".
pub fn slide_title(slide: &Value) -> String {
    for element in page_elements(slide) {
        if element.pointer("/shape/placeholder/type").and_then(Value::as_str) == Some("TITLE") {
            let text = element_text(element).trim().to_string();
            if !text.is_empty() {
                return text;
            }
        }
    }

    for element in page_elements(slide) {
        if element.get("shape").is_some() {
            let text = element_text(element).trim().to_string();
            if !text.is_empty() && text.len() < 80 {
                return text;
            }
        }
    }

    "Untitled".to_string()
}
