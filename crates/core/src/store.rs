//! The seam between the engine and package I/O.

use crate::error::Result;
use crate::types::{Document, DocumentFormat};
use std::path::Path;

/// Loads templates into the model and writes them back out.
///
/// Implementations fail with [`crate::Error::Read`] on a missing or corrupt
/// package and [`crate::Error::Write`] on an unwritable destination.
pub trait DocumentStore {
    /// The package format this store handles.
    fn format(&self) -> DocumentFormat;

    fn load(&self, path: &Path) -> Result<Document>;

    fn save(&self, document: &Document, path: &Path) -> Result<()>;
}
