//! DOCX (WordprocessingML) backend for template expansion.
//!
//! Loads the body, headers and footers of a .docx package into the core
//! document model and writes them back, leaving every other entry alone.

pub mod parser;
pub mod store;

pub use parser::{DocxParser, WORDPROCESSING};
pub use store::DocxStore;
