//! Document store abstraction.
//!
//! The two slide-deck back ends (PPTX files and Google Slides) share this
//! one contract; the mapping logic never touches a container format
//! directly.

use std::path::Path;

use crate::error::Result;
use crate::types::ShapeRecord;

/// A loaded slide deck that placeholders can be read from and written to.
pub trait DocumentStore {
    /// Snapshot every text-bearing shape with its geometry.
    ///
    /// Returns raw records; placeholder detection and row grouping are the
    /// caller's job (see [`crate::layout`]).
    fn enumerate_placeholder_shapes(&mut self) -> Result<Vec<ShapeRecord>>;

    /// Replace the full text of one shape, identified by slide index and
    /// shape name.
    ///
    /// Replacement is wholesale: the shape's previous text is discarded, so
    /// repeating the same call is a no-op. Returns `Ok(false)` when the
    /// shape cannot be found or holds no rewritable text.
    fn replace_shape_text(
        &mut self,
        slide_index: usize,
        shape_name: &str,
        new_text: &str,
    ) -> Result<bool>;

    /// Persist the document, returning a human-readable location: a file
    /// path for file-backed stores, a presentation URL for remote ones
    /// (which may apply writes immediately and treat this as a no-op).
    fn save(&mut self, output_path: Option<&Path>) -> Result<String>;
}
