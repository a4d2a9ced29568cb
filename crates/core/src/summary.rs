//! Human-readable summaries of slides and mapping outcomes.

use std::fmt::Write as _;

use crate::types::{ArchitectureSlide, MappingResult};

/// Summarize the architecture slides found in a document: one line per
/// slide with its placeholder count and row breakdown.
pub fn slide_summary(slides: &[ArchitectureSlide]) -> String {
    let mut out = format!(
        "Found {} slides with placeholder boxes:\n",
        slides.len()
    );

    for slide in slides {
        let _ = writeln!(out, "  Slide {}: {}", slide.index + 1, slide.title);
        let _ = writeln!(out, "    - {} placeholders", slide.placeholders.len());

        let mut row = None;
        let mut count = 0;
        for ph in &slide.placeholders {
            match row {
                Some(r) if r == ph.row_group => count += 1,
                Some(r) => {
                    let _ = writeln!(out, "    - Row {}: {} boxes", r + 1, count);
                    row = Some(ph.row_group);
                    count = 1;
                }
                None => {
                    row = Some(ph.row_group);
                    count = 1;
                }
            }
        }
        if let Some(r) = row {
            let _ = writeln!(out, "    - Row {}: {} boxes", r + 1, count);
        }
    }

    out.trim_end().to_string()
}

/// Summarize one mapping attempt: accepted pairs plus both residual
/// counts, so partial success is always visible.
pub fn mapping_summary(result: &MappingResult) -> String {
    let mut out = format!(
        "\nSlide {}: {}\n  Mapped {} placeholders:\n",
        result.slide_index + 1,
        result.slide_title,
        result.mappings.len()
    );

    for (ph, comp) in &result.mappings {
        let _ = writeln!(out, "    - '{}' -> {}", comp.name, ph.shape_name);
    }

    if !result.unmapped_placeholders.is_empty() {
        let _ = writeln!(
            out,
            "\n  {} unmapped placeholders",
            result.unmapped_placeholders.len()
        );
    }

    if !result.unmapped_components.is_empty() {
        let _ = writeln!(
            out,
            "  {} unused components:",
            result.unmapped_components.len()
        );
        for comp in result.unmapped_components.iter().take(5) {
            let _ = writeln!(out, "    - {}", comp.name);
        }
        if result.unmapped_components.len() > 5 {
            let _ = writeln!(
                out,
                "    ... and {} more",
                result.unmapped_components.len() - 5
            );
        }
    }

    out.trim_end().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Placeholder, SystemComponent};

    fn ph(name: &str, row: usize) -> Placeholder {
        Placeholder {
            slide_index: 1,
            slide_title: "Current State".to_string(),
            shape_name: name.to_string(),
            text: "Lorem ipsum".to_string(),
            left: 0.0,
            top: row as f64,
            width: 1.0,
            height: 0.5,
            row_group: row,
        }
    }

    #[test]
    fn test_slide_summary_groups_rows() {
        let slides = vec![ArchitectureSlide {
            index: 1,
            title: "Current State".to_string(),
            placeholders: vec![ph("a", 0), ph("b", 0), ph("c", 1)],
        }];

        let summary = slide_summary(&slides);
        assert!(summary.contains("Slide 2: Current State"));
        assert!(summary.contains("3 placeholders"));
        assert!(summary.contains("Row 1: 2 boxes"));
        assert!(summary.contains("Row 2: 1 boxes"));
    }

    #[test]
    fn test_mapping_summary_reports_residuals() {
        let result = MappingResult {
            slide_index: 1,
            slide_title: "Current State".to_string(),
            mappings: vec![(ph("a", 0), SystemComponent::new("CRM", "core"))],
            unmapped_placeholders: vec![ph("b", 0)],
            unmapped_components: vec![SystemComponent::new("ESB", "integration")],
        };

        let summary = mapping_summary(&result);
        assert!(summary.contains("Mapped 1 placeholders"));
        assert!(summary.contains("'CRM' -> a"));
        assert!(summary.contains("1 unmapped placeholders"));
        assert!(summary.contains("1 unused components"));
        assert!(summary.contains("- ESB"));
    }
}
