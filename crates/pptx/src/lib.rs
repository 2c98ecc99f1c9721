//! PPTX (Office Open XML) backend for template expansion.
//!
//! Parses .pptx files, which are ZIP archives containing XML documents.
//! Every shape text body on every slide becomes its own container.

pub mod parser;
pub mod store;

pub use parser::{PptxParser, DRAWINGML};
pub use store::PptxStore;
