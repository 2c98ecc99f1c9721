//! [`DocumentStore`] for .pptx packages.

use crate::parser::{PptxParser, DRAWINGML};
use docfill_core::{Document, DocumentFormat, DocumentStore, Error, Result};
use docfill_ooxml::{save_document, write_document};
use std::fs::File;
use std::io::{BufReader, Read, Seek, Write};
use std::path::Path;

#[derive(Default)]
pub struct PptxStore {
    parser: PptxParser,
}

impl PptxStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn read_from<R: Read + Seek>(&self, reader: R) -> Result<Document> {
        self.parser.parse(reader)
    }

    pub fn write_to<W: Write + Seek>(&self, document: &Document, writer: W) -> Result<W> {
        write_document(document, &DRAWINGML, writer)
    }
}

impl DocumentStore for PptxStore {
    fn format(&self) -> DocumentFormat {
        DocumentFormat::Pptx
    }

    fn load(&self, path: &Path) -> Result<Document> {
        let file = File::open(path).map_err(|e| Error::read(path, e))?;
        self.read_from(BufReader::new(file))
            .map_err(|e| Error::read(path, e))
    }

    fn save(&self, document: &Document, path: &Path) -> Result<()> {
        save_document(document, &DRAWINGML, path)
    }
}
