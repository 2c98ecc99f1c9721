//! Template expansion for formatted documents: run normalization,
//! `{{placeholder}}` substitution and marker-delimited block duplication.

pub mod config;
pub mod duplicate;
pub mod engine;
pub mod error;
pub mod markers;
pub mod normalize;
pub mod path;
pub mod placeholders;
pub mod record;
pub mod store;
pub mod style;
pub mod substitute;
pub mod types;

pub use config::{Blocks, Job};
pub use duplicate::{duplicate_block, Expansion};
pub use engine::{generate, BlockExpansion, Report, TemplateEngine};
pub use error::{Error, Result};
pub use markers::{locate_markers, marker_text};
pub use normalize::RunNormalizer;
pub use path::build_output_path;
pub use placeholders::{extract_placeholders, outline, Outline};
pub use record::Record;
pub use store::DocumentStore;
pub use style::{CoarseStyle, Style, StyleComparator};
pub use substitute::substitute_block;
pub use types::{
    Block, Cell, Container, Document, DocumentFormat, Element, Group, Inline, Markup, Part,
    PartKind, Resource, Row, RowChild, Run, Segment, Table, TableChild,
};
