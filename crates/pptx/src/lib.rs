//! PPTX (Office Open XML) document store backend.

pub mod document;
pub mod parser;

pub use document::PptxDocument;
