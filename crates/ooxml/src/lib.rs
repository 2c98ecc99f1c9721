//! Office Open XML plumbing shared by the DOCX and PPTX backends.
//!
//! Both formats are ZIP packages whose text lives in paragraph/run XML;
//! this crate unpacks and repacks the package and converts text bodies to
//! and from the core document model.

pub mod package;
pub mod text_body;
pub mod xml;

pub use package::{save_document, trailing_number, write_document, Package};
pub use text_body::{parse_container, parse_part, render_part, Dialect};
pub use xml::{attribute, local_name};
