//! Google Slides document store backend.

pub mod document;

pub use document::GoogleSlidesDocument;
