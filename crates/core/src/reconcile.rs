//! Reconciliation of raw model mapping output against known placeholders
//! and components.
//!
//! The mapping suggestion comes from an external model and is treated as
//! untrusted input: unknown placeholder identifiers are dropped, unknown
//! component names are synthesized on the fly, and only a response that
//! cannot be parsed at all is fatal.

use std::collections::HashSet;
use std::sync::LazyLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::{Error, Result};
use crate::types::{ArchitectureSlide, ComponentCatalog, MappingResult, SystemComponent};

/// Regex to pull a JSON object out of surrounding prose when the fence
/// heuristics fail.
static JSON_OBJECT_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[\s\S]*\}").unwrap());

/// One candidate pair from the raw mapping response.
#[derive(Debug, Clone, Deserialize)]
pub struct RawMappingEntry {
    /// Placeholder identifier the model claims to have matched.
    pub shape_name: String,

    /// Component display name to write into the placeholder.
    pub component_name: String,

    /// Model-reported confidence ("high"/"medium"/"low"), if any.
    #[serde(default)]
    pub confidence: Option<String>,

    /// Free-text rationale for the pair, if any.
    #[serde(default)]
    pub reasoning: Option<String>,
}

/// Envelope shape of the mapping response.
#[derive(Debug, Deserialize)]
struct RawMappingResponse {
    #[serde(default)]
    mappings: Vec<RawMappingEntry>,
}

/// Strip markdown code fences from model output, returning the inner text.
///
/// Looks for a ```json fence first, then a plain fence; otherwise returns
/// the trimmed input.
pub fn extract_json_block(text: &str) -> &str {
    let text = text.trim();

    if let Some(start) = text.find("```json") {
        let start = start + 7;
        if let Some(end) = text[start..].find("```") {
            return text[start..start + end].trim();
        }
    }

    if let Some(start) = text.find("```") {
        let start = start + 3;
        let start = text[start..]
            .find('\n')
            .map(|i| start + i + 1)
            .unwrap_or(start);
        if let Some(end) = text[start..].find("```") {
            return text[start..start + end].trim();
        }
    }

    text
}

/// Parse raw mapping-response text into candidate entries.
///
/// Accepts the model's JSON envelope (`{"mappings": [...]}`), with or
/// without markdown fences; as a last resort, extracts the first JSON
/// object embedded in prose. A response that cannot be interpreted as a
/// list of pair-like records fails with [`Error::MalformedResponse`]
/// carrying the original text.
pub fn parse_mapping_entries(raw: &str) -> Result<Vec<RawMappingEntry>> {
    let json_text = extract_json_block(raw);

    if let Ok(response) = serde_json::from_str::<RawMappingResponse>(json_text) {
        return Ok(response.mappings);
    }

    if let Some(m) = JSON_OBJECT_REGEX.find(json_text) {
        if let Ok(response) = serde_json::from_str::<RawMappingResponse>(m.as_str()) {
            return Ok(response.mappings);
        }
    }

    Err(Error::MalformedResponse {
        reason: "expected a JSON object with a \"mappings\" list".to_string(),
        raw: raw.to_string(),
    })
}

/// Reconcile candidate pairs against a slide's placeholders and the
/// component catalog.
///
/// Entries naming an unknown placeholder identifier are dropped silently.
/// Entries naming a component absent from the catalog synthesize one with
/// category `"unknown"`, taking the entry's rationale as its description.
/// Duplicate identifiers resolve first-occurrence-wins: once a placeholder
/// is consumed, later entries for it are no-ops.
///
/// Every known placeholder ends up in exactly one of the mapping list or
/// `unmapped_placeholders`; every catalog component in exactly one of the
/// mapping list or `unmapped_components`. Synthesized components never
/// appear in `unmapped_components` (they were never known).
pub fn reconcile(
    slide: &ArchitectureSlide,
    catalog: &ComponentCatalog,
    entries: &[RawMappingEntry],
) -> MappingResult {
    let mut mappings = Vec::new();
    let mut consumed_shapes: HashSet<&str> = HashSet::new();
    let mut consumed_components: HashSet<&str> = HashSet::new();

    for entry in entries {
        let Some(ph) = slide
            .placeholders
            .iter()
            .find(|p| p.shape_name == entry.shape_name)
        else {
            log::debug!(
                "dropping mapping entry for unknown shape '{}'",
                entry.shape_name
            );
            continue;
        };

        if !consumed_shapes.insert(ph.shape_name.as_str()) {
            log::debug!(
                "ignoring duplicate mapping entry for shape '{}'",
                entry.shape_name
            );
            continue;
        }

        let component = match catalog.get_by_name(&entry.component_name) {
            Some(known) => {
                consumed_components.insert(known.name.as_str());
                known.clone()
            }
            None => SystemComponent::new(entry.component_name.clone(), "unknown")
                .with_description(entry.reasoning.clone().unwrap_or_default()),
        };

        mappings.push((ph.clone(), component));
    }

    let unmapped_placeholders = slide
        .placeholders
        .iter()
        .filter(|p| !consumed_shapes.contains(p.shape_name.as_str()))
        .cloned()
        .collect();

    let unmapped_components = catalog
        .components()
        .iter()
        .filter(|c| !consumed_components.contains(c.name.as_str()))
        .cloned()
        .collect();

    MappingResult {
        slide_index: slide.index,
        slide_title: slide.title.clone(),
        mappings,
        unmapped_placeholders,
        unmapped_components,
    }
}
