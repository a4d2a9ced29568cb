//! Core domain types, placeholder layout normalization, and mapping
//! reconciliation for populating Digital Solutioning Documents.

pub mod apply;
pub mod classify;
pub mod error;
pub mod layout;
pub mod reconcile;
pub mod store;
pub mod summary;
pub mod types;

pub use apply::apply_mapping;
pub use classify::{classify, SlideType};
pub use error::{Error, Result};
pub use layout::{assign_row_groups, find_architecture_slides, ROW_THRESHOLD};
pub use reconcile::{extract_json_block, parse_mapping_entries, reconcile, RawMappingEntry};
pub use store::DocumentStore;
pub use summary::{mapping_summary, slide_summary};
pub use types::{
    ArchitectureSlide, ComponentCatalog, MappingResult, Placeholder, ShapeRecord,
    SystemComponent, PLACEHOLDER_MARKER,
};
