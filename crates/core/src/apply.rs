//! Applying a reconciled mapping to a document store.

use crate::store::DocumentStore;
use crate::types::MappingResult;

/// Write each mapped component name into its placeholder.
///
/// Best-effort: a failed write is logged and counted out, never aborting
/// the rest of the batch. Returns the number of placeholders the store
/// reported as successfully written. Because the store replaces shape text
/// wholesale, applying the same result twice yields the same final text.
pub fn apply_mapping<S: DocumentStore + ?Sized>(store: &mut S, result: &MappingResult) -> usize {
    let mut written = 0;

    for (ph, comp) in &result.mappings {
        match store.replace_shape_text(result.slide_index, &ph.shape_name, &comp.name) {
            Ok(true) => written += 1,
            Ok(false) => {
                log::warn!(
                    "shape '{}' on slide {} was not written",
                    ph.shape_name,
                    result.slide_index + 1
                );
            }
            Err(e) => {
                log::warn!(
                    "failed to write shape '{}' on slide {}: {}",
                    ph.shape_name,
                    result.slide_index + 1,
                    e
                );
            }
        }
    }

    written
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, Result};
    use crate::types::{Placeholder, ShapeRecord, SystemComponent};
    use std::collections::BTreeMap;
    use std::path::Path;

    /// In-memory store: shape text keyed by (slide_index, shape_name).
    struct FakeStore {
        texts: BTreeMap<(usize, String), String>,
        failing_shapes: Vec<String>,
    }

    impl FakeStore {
        fn with_shapes(names: &[&str]) -> Self {
            let texts = names
                .iter()
                .map(|n| ((0, n.to_string()), "Lorem ipsum".to_string()))
                .collect();
            Self {
                texts,
                failing_shapes: Vec::new(),
            }
        }
    }

    impl DocumentStore for FakeStore {
        fn enumerate_placeholder_shapes(&mut self) -> Result<Vec<ShapeRecord>> {
            Ok(Vec::new())
        }

        fn replace_shape_text(
            &mut self,
            slide_index: usize,
            shape_name: &str,
            new_text: &str,
        ) -> Result<bool> {
            if self.failing_shapes.iter().any(|s| s == shape_name) {
                return Err(Error::DocumentError("write failed".to_string()));
            }
            match self.texts.get_mut(&(slide_index, shape_name.to_string())) {
                Some(text) => {
                    *text = new_text.to_string();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        fn save(&mut self, _output_path: Option<&Path>) -> Result<String> {
            Ok("fake".to_string())
        }
    }

    fn ph(name: &str) -> Placeholder {
        Placeholder {
            slide_index: 0,
            slide_title: "Current State".to_string(),
            shape_name: name.to_string(),
            text: "Lorem ipsum".to_string(),
            left: 0.0,
            top: 0.0,
            width: 1.0,
            height: 0.5,
            row_group: 0,
        }
    }

    fn result_with(pairs: &[(&str, &str)]) -> MappingResult {
        MappingResult {
            slide_index: 0,
            slide_title: "Current State".to_string(),
            mappings: pairs
                .iter()
                .map(|(shape, comp)| (ph(shape), SystemComponent::new(*comp, "core")))
                .collect(),
            unmapped_placeholders: Vec::new(),
            unmapped_components: Vec::new(),
        }
    }

    #[test]
    fn test_apply_writes_component_names() {
        let mut store = FakeStore::with_shapes(&["ph1", "ph2"]);
        let result = result_with(&[("ph1", "CRM"), ("ph2", "API Gateway")]);

        assert_eq!(apply_mapping(&mut store, &result), 2);
        assert_eq!(store.texts[&(0, "ph1".to_string())], "CRM");
        assert_eq!(store.texts[&(0, "ph2".to_string())], "API Gateway");
    }

    #[test]
    fn test_apply_is_idempotent() {
        let mut store = FakeStore::with_shapes(&["ph1", "ph2"]);
        let result = result_with(&[("ph1", "CRM"), ("ph2", "API Gateway")]);

        apply_mapping(&mut store, &result);
        let first = store.texts.clone();
        apply_mapping(&mut store, &result);

        assert_eq!(store.texts, first);
    }

    #[test]
    fn test_write_failure_does_not_abort_batch() {
        let mut store = FakeStore::with_shapes(&["ph1", "ph2", "ph3"]);
        store.failing_shapes.push("ph2".to_string());
        let result = result_with(&[("ph1", "CRM"), ("ph2", "ESB"), ("ph3", "Data Lake")]);

        assert_eq!(apply_mapping(&mut store, &result), 2);
        assert_eq!(store.texts[&(0, "ph1".to_string())], "CRM");
        assert_eq!(store.texts[&(0, "ph3".to_string())], "Data Lake");
    }

    #[test]
    fn test_missing_shape_counts_as_unwritten() {
        let mut store = FakeStore::with_shapes(&["ph1"]);
        let result = result_with(&[("ph1", "CRM"), ("ghost", "ESB")]);

        assert_eq!(apply_mapping(&mut store, &result), 1);
    }
}
