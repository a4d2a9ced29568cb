//! Mapping suggestion: placeholder-to-component matching via the model.
//!
//! Formats the slide's placeholders (grouped by row) and the component
//! catalog into a prompt, and hands the raw response to the core parser.
//! The reconciliation of the result against known entities stays in
//! `dsd-core` and never touches the network.

use dsd_core::{classify, ArchitectureSlide, ComponentCatalog, Placeholder, RawMappingEntry, Result, SystemComponent};

use crate::client::ClaudeClient;

const MAPPING_PROMPT: &str = r#"You are an expert at mapping architecture components to PowerPoint placeholders.

Given a list of system components extracted from an architecture source and a list of placeholders in a PowerPoint slide, create the best mapping between them.

SLIDE INFO:
Title: {slide_title}
Slide Type: {slide_type}

PLACEHOLDERS (in visual order, organized by rows):
{placeholders_info}

EXTRACTED COMPONENTS:
{components_info}

MAPPING RULES:
1. Match components to placeholders based on:
   - Position (top rows = presentation/channel layer, middle = application/integration, bottom = data/infrastructure)
   - Category alignment (channels at top, integrations in middle, databases at bottom)
   - Number of placeholders in each row should roughly match number of components in that layer

2. If there are more placeholders than components, leave extras as "TBD" or suggest appropriate generic names
3. If there are more components than placeholders, prioritize the most important/core systems
4. For legend boxes (usually on the right side, small), use category names like "Channel", "Integration", "Core System", "Data"

Return your mapping as JSON:
{
    "mappings": [
        {
            "shape_name": "exact shape name from placeholders",
            "component_name": "name to display",
            "confidence": "high|medium|low",
            "reasoning": "brief explanation"
        }
    ],
    "notes": "any important observations"
}

Return ONLY the JSON, no other text."#;

/// Format placeholders for the prompt, grouped by row.
pub fn format_placeholders(placeholders: &[Placeholder]) -> String {
    let mut lines = Vec::new();
    let mut current_row = None;

    for ph in placeholders {
        if current_row != Some(ph.row_group) {
            current_row = Some(ph.row_group);
            lines.push(format!("\n  Row {}:", ph.row_group + 1));
        }
        lines.push(format!(
            "    - {}: position ({:.1}, {:.1}), size {:.1}x{:.1}",
            ph.shape_name, ph.left, ph.top, ph.width, ph.height
        ));
    }

    lines.join("\n")
}

/// Format the component catalog for the prompt, numbered.
pub fn format_components(components: &[SystemComponent]) -> String {
    components
        .iter()
        .enumerate()
        .map(|(i, comp)| {
            let layer = if comp.layer.is_empty() {
                "unspecified"
            } else {
                &comp.layer
            };
            format!(
                "  {}. {}\n     Category: {}\n     Layer: {}\n     Description: {}",
                i + 1,
                comp.name,
                comp.category,
                layer,
                comp.description
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Build the full mapping prompt for one slide.
pub fn build_mapping_prompt(
    slide: &ArchitectureSlide,
    catalog: &ComponentCatalog,
    pattern_context: Option<&str>,
) -> String {
    let mut components_info = format_components(catalog.components());
    if let Some(context) = pattern_context {
        components_info.push_str(context);
    }

    MAPPING_PROMPT
        .replace("{slide_title}", &slide.title)
        .replace("{slide_type}", classify(&slide.title).label())
        .replace("{placeholders_info}", &format_placeholders(&slide.placeholders))
        .replace("{components_info}", &components_info)
}

/// Ask the model for a placeholder-to-component mapping.
///
/// Returns the parsed candidate entries plus the raw response text; the
/// caller reconciles them with [`dsd_core::reconcile`].
pub fn suggest_mapping(
    client: &ClaudeClient,
    slide: &ArchitectureSlide,
    catalog: &ComponentCatalog,
    pattern_context: Option<&str>,
) -> Result<(Vec<RawMappingEntry>, String)> {
    let prompt = build_mapping_prompt(slide, catalog, pattern_context);
    let raw = client.complete_text(&prompt)?;
    let entries = dsd_core::parse_mapping_entries(&raw)?;
    Ok((entries, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ph(name: &str, row: usize, left: f64) -> Placeholder {
        Placeholder {
            slide_index: 0,
            slide_title: "Current State".to_string(),
            shape_name: name.to_string(),
            text: "Lorem ipsum".to_string(),
            left,
            top: row as f64 * 2.0,
            width: 1.5,
            height: 0.6,
            row_group: row,
        }
    }

    #[test]
    fn test_format_placeholders_by_row() {
        let placeholders = vec![ph("a", 0, 0.5), ph("b", 0, 2.5), ph("c", 1, 0.5)];
        let formatted = format_placeholders(&placeholders);

        assert!(formatted.contains("Row 1:"));
        assert!(formatted.contains("Row 2:"));
        assert!(formatted.contains("- a: position (0.5, 0.0), size 1.5x0.6"));
        // Row 1 appears before its members, Row 2 after them.
        let row2 = formatted.find("Row 2:").unwrap();
        let b = formatted.find("- b:").unwrap();
        assert!(b < row2);
    }

    #[test]
    fn test_format_components_numbered() {
        let components = vec![
            SystemComponent::new("API Gateway", "integration").with_layer("integration"),
            SystemComponent::new("Core Banking", "core_banking"),
        ];
        let formatted = format_components(&components);

        assert!(formatted.contains("1. API Gateway"));
        assert!(formatted.contains("2. Core Banking"));
        assert!(formatted.contains("Layer: unspecified"));
    }

    #[test]
    fn test_build_mapping_prompt_substitutions() {
        let slide = ArchitectureSlide {
            index: 0,
            title: "Target State".to_string(),
            placeholders: vec![ph("box", 0, 0.5)],
        };
        let catalog =
            ComponentCatalog::from_components(vec![SystemComponent::new("CRM", "core")]);

        let prompt = build_mapping_prompt(&slide, &catalog, Some("\n\nPATTERNS: esb"));

        assert!(prompt.contains("Title: Target State"));
        assert!(prompt.contains("Slide Type: Target State Architecture"));
        assert!(prompt.contains("- box:"));
        assert!(prompt.contains("1. CRM"));
        assert!(prompt.contains("PATTERNS: esb"));
        // The JSON example braces survive substitution.
        assert!(prompt.contains("\"mappings\""));
    }
}
