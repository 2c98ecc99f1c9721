//! [`DocumentStore`] for .docx packages.

use crate::parser::{DocxParser, WORDPROCESSING};
use docfill_core::{Document, DocumentFormat, DocumentStore, Error, Result};
use docfill_ooxml::{save_document, write_document};
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

#[derive(Default)]
pub struct DocxStore {
    parser: DocxParser,
}

impl DocxStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a document from any reader that implements Read + Seek.
    pub fn read_from<R: Read + Seek>(&self, reader: R) -> Result<Document> {
        self.parser.parse(reader)
    }

    /// Write a document to any writer that implements Write + Seek.
    pub fn write_to<W: Write + Seek>(&self, document: &Document, writer: W) -> Result<W> {
        write_document(document, &WORDPROCESSING, writer)
    }
}

impl DocumentStore for DocxStore {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Docx
    }

    fn load(&self, path: &Path) -> Result<Document> {
        let file = File::open(path).map_err(|e| Error::read(path, e))?;
        let document = self
            .read_from(BufReader::new(file))
            .map_err(|e| Error::read(path, e))?;
        log::debug!("Loaded template {}", path.display());
        Ok(document)
    }

    fn save(&self, document: &Document, path: &Path) -> Result<()> {
        save_document(document, &WORDPROCESSING, path)?;
        log::debug!("Saved document {}", path.display());
        Ok(())
    }
}
