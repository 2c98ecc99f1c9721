//! Error types for template expansion.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias using our Error type.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading, expanding or saving a template.
#[derive(Error, Debug)]
pub enum Error {
    /// Generic I/O failure outside the document store (job files, directories).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The template package could not be read or is corrupted.
    #[error("Failed to read {}: {reason}", path.display())]
    Read { path: PathBuf, reason: String },

    /// The output package could not be written.
    #[error("Failed to write {}: {reason}", path.display())]
    Write { path: PathBuf, reason: String },

    /// The file format is not supported or could not be detected.
    #[error("Unsupported or unrecognized file format: {0}")]
    UnsupportedFormat(String),

    /// A part the model needs is missing from the package.
    #[error("Missing package part: {0}")]
    MissingPart(String),

    /// ZIP archive error.
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML parsing error.
    #[error("XML parsing error: {0}")]
    Xml(String),

    /// Invalid job configuration.
    #[error("Invalid job configuration: {0}")]
    Config(String),

    /// Job file is not valid JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Fewer than two markers were found for a block identifier.
    ///
    /// Not fatal: the container is left untouched and the pipeline goes on.
    #[error("Block '{id}' needs two markers, found {found}")]
    MissingMarkerPair { id: String, found: usize },
}

impl Error {
    /// Wrap any failure while loading `path` as a read error.
    pub fn read(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Read {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Wrap any failure while saving to `path` as a write error.
    pub fn write(path: impl Into<PathBuf>, reason: impl std::fmt::Display) -> Self {
        Self::Write {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}
