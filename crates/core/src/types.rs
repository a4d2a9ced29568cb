//! Domain types for architecture slides, placeholders, and mapping results.

use serde::{Deserialize, Serialize};

/// Substring that marks a shape as a fill-in placeholder.
///
/// Matched case-insensitively against the shape's current text.
pub const PLACEHOLDER_MARKER: &str = "lorem";

/// A raw shape record produced by a document store.
///
/// This is the untyped snapshot of one text-bearing shape; placeholder
/// detection and row grouping happen later in [`crate::layout`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShapeRecord {
    /// 0-based slide index.
    pub slide_index: usize,

    /// Title of the owning slide (denormalized for display).
    pub slide_title: String,

    /// Shape name or object id, unique within the slide.
    pub shape_name: String,

    /// Current text content of the shape.
    pub text: String,

    /// Left edge in inches.
    pub left: f64,

    /// Top edge in inches.
    pub top: f64,

    /// Width in inches.
    pub width: f64,

    /// Height in inches.
    pub height: f64,
}

impl ShapeRecord {
    /// Whether this shape's text marks it as a fill-in placeholder.
    pub fn is_placeholder(&self) -> bool {
        self.text.to_lowercase().contains(PLACEHOLDER_MARKER)
    }
}

/// A placeholder rectangle on a slide, awaiting a component name.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Placeholder {
    /// 0-based slide index.
    pub slide_index: usize,

    /// Title of the owning slide.
    pub slide_title: String,

    /// Shape name or object id, unique within the slide.
    pub shape_name: String,

    /// Current text content.
    pub text: String,

    /// Left edge in inches.
    pub left: f64,

    /// Top edge in inches.
    pub top: f64,

    /// Width in inches.
    pub width: f64,

    /// Height in inches.
    pub height: f64,

    /// Logical row assigned from vertical position. Written exactly once
    /// during layout normalization; always non-negative.
    pub row_group: usize,
}

impl Placeholder {
    /// Build a placeholder from a raw shape record. `row_group` starts at 0
    /// and is assigned for real during layout normalization.
    pub fn from_record(record: ShapeRecord) -> Self {
        Self {
            slide_index: record.slide_index,
            slide_title: record.slide_title,
            shape_name: record.shape_name,
            text: record.text,
            left: record.left,
            top: record.top,
            width: record.width,
            height: record.height,
            row_group: 0,
        }
    }
}

/// A named system extracted from an architecture description.
///
/// The name is the only identity key; it is not guaranteed unique.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SystemComponent {
    /// Display name, as extracted.
    pub name: String,

    /// Free-text category tag (e.g. "channel", "integration", "data").
    pub category: String,

    /// Optional architectural tier (e.g. "presentation", "data").
    #[serde(default)]
    pub layer: String,

    /// Optional free-text description.
    #[serde(default)]
    pub description: String,
}

impl SystemComponent {
    /// Create a component with the given name and category.
    pub fn new(name: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            category: category.into(),
            layer: String::new(),
            description: String::new(),
        }
    }

    /// Set the architectural layer.
    pub fn with_layer(mut self, layer: impl Into<String>) -> Self {
        self.layer = layer.into();
        self
    }

    /// Set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }
}

/// The session's ordered collection of known architecture components.
///
/// Passed by reference into reconciliation; the orchestration layer may
/// append or remove entries between extraction and mapping.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ComponentCatalog {
    components: Vec<SystemComponent>,
}

impl ComponentCatalog {
    /// Create an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from extracted components, preserving order.
    pub fn from_components(components: Vec<SystemComponent>) -> Self {
        Self { components }
    }

    /// Append a component.
    pub fn push(&mut self, component: SystemComponent) {
        self.components.push(component);
    }

    /// Remove the first component with the given name. Returns whether one
    /// was removed.
    pub fn remove_by_name(&mut self, name: &str) -> bool {
        if let Some(pos) = self.components.iter().position(|c| c.name == name) {
            self.components.remove(pos);
            true
        } else {
            false
        }
    }

    /// Look up a component by exact display name (first match).
    pub fn get_by_name(&self, name: &str) -> Option<&SystemComponent> {
        self.components.iter().find(|c| c.name == name)
    }

    /// Components in insertion order.
    pub fn components(&self) -> &[SystemComponent] {
        &self.components
    }

    /// Number of components.
    pub fn len(&self) -> usize {
        self.components.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }
}

/// A slide plus its ordered placeholders.
///
/// Placeholders are always sorted by `(row_group, left)` so humans and the
/// extractor see a stable reading order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchitectureSlide {
    /// 0-based slide index.
    pub index: usize,

    /// Slide title.
    pub title: String,

    /// Placeholders in reading order.
    pub placeholders: Vec<Placeholder>,
}

/// The reconciled outcome of one mapping attempt for one slide.
///
/// Created fresh per attempt and never mutated after construction. Each
/// placeholder appears in exactly one of `mappings` / `unmapped_placeholders`,
/// and each catalog component in exactly one of `mappings` /
/// `unmapped_components`.
#[derive(Debug, Clone)]
pub struct MappingResult {
    /// 0-based slide index.
    pub slide_index: usize,

    /// Slide title.
    pub slide_title: String,

    /// Accepted (placeholder, component) pairs, at most one per placeholder.
    pub mappings: Vec<(Placeholder, SystemComponent)>,

    /// Known placeholders that no accepted pair covered.
    pub unmapped_placeholders: Vec<Placeholder>,

    /// Catalog components that no accepted pair used.
    pub unmapped_components: Vec<SystemComponent>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(text: &str) -> ShapeRecord {
        ShapeRecord {
            slide_index: 0,
            slide_title: "Title".to_string(),
            shape_name: "Shape 1".to_string(),
            text: text.to_string(),
            left: 1.0,
            top: 2.0,
            width: 3.0,
            height: 0.5,
        }
    }

    #[test]
    fn test_placeholder_marker_case_insensitive() {
        assert!(record("Lorem ipsum dolor").is_placeholder());
        assert!(record("LOREM IPSUM").is_placeholder());
        assert!(!record("API Gateway").is_placeholder());
        assert!(!record("").is_placeholder());
    }

    #[test]
    fn test_catalog_lookup_first_match() {
        let mut catalog = ComponentCatalog::new();
        catalog.push(SystemComponent::new("CRM", "core").with_layer("application"));
        catalog.push(SystemComponent::new("CRM", "external"));

        let found = catalog.get_by_name("CRM").unwrap();
        assert_eq!(found.category, "core");
        assert!(catalog.get_by_name("ERP").is_none());
    }

    #[test]
    fn test_catalog_remove_by_name() {
        let mut catalog = ComponentCatalog::from_components(vec![
            SystemComponent::new("A", "channel"),
            SystemComponent::new("B", "data"),
        ]);

        assert!(catalog.remove_by_name("A"));
        assert!(!catalog.remove_by_name("A"));
        assert_eq!(catalog.len(), 1);
        assert_eq!(catalog.components()[0].name, "B");
    }

    #[test]
    fn test_placeholder_from_record_starts_in_row_zero() {
        let ph = Placeholder::from_record(record("lorem"));
        assert_eq!(ph.row_group, 0);
        assert_eq!(ph.shape_name, "Shape 1");
    }
}
