//! ZIP package handling shared by the DOCX and PPTX stores.

use crate::text_body::{render_part, Dialect};
use docfill_core::{Document, DocumentFormat, Error, Resource, Result};
use std::io::{BufWriter, Read, Seek, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

/// Every file entry of an OOXML package, in archive order.
#[derive(Debug, Default)]
pub struct Package {
    entries: Vec<(String, Vec<u8>)>,
}

impl Package {
    /// Unpack a package from any reader that implements Read + Seek.
    pub fn from_reader<R: Read + Seek>(reader: R) -> Result<Self> {
        let mut archive = ZipArchive::new(reader)
            .map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;
        let mut entries = Vec::with_capacity(archive.len());

        for i in 0..archive.len() {
            let mut file = archive
                .by_index(i)
                .map_err(|e| Error::Zip(format!("Failed to read entry {}: {}", i, e)))?;
            if file.is_dir() {
                continue;
            }
            let name = file.name().to_string();
            let mut contents = Vec::with_capacity(file.size() as usize);
            file.read_to_end(&mut contents)
                .map_err(|e| Error::Zip(format!("Failed to read '{}': {}", name, e)))?;
            entries.push((name, contents));
        }

        log::debug!("Unpacked {} package entries", entries.len());
        Ok(Self { entries })
    }

    /// Package format from the archive's entry names alone; no entry is
    /// decompressed. `None` when the archive has no known main part.
    pub fn sniff_format<R: Read + Seek>(reader: R) -> Result<Option<DocumentFormat>> {
        let archive = ZipArchive::new(reader)
            .map_err(|e| Error::Zip(format!("Failed to open ZIP: {}", e)))?;
        Ok(DocumentFormat::from_entries(archive.file_names()))
    }

    /// Package format, judged by its main part.
    pub fn format(&self) -> Option<DocumentFormat> {
        DocumentFormat::from_entries(self.names())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    pub fn contains(&self, path: &str) -> bool {
        self.entries.iter().any(|(name, _)| name == path)
    }

    pub fn get(&self, path: &str) -> Option<&[u8]> {
        self.entries
            .iter()
            .find(|(name, _)| name == path)
            .map(|(_, data)| data.as_slice())
    }

    /// An entry as UTF-8 text.
    pub fn read_string(&self, path: &str) -> Result<String> {
        let data = self
            .get(path)
            .ok_or_else(|| Error::MissingPart(path.to_string()))?;
        String::from_utf8(data.to_vec())
            .map_err(|e| Error::Xml(format!("'{}' is not UTF-8: {}", path, e)))
    }

    /// Remove an entry and return it as text. The entry becomes owned by the
    /// caller, which is expected to write it back.
    pub fn take_string(&mut self, path: &str) -> Result<String> {
        let index = self
            .entries
            .iter()
            .position(|(name, _)| name == path)
            .ok_or_else(|| Error::MissingPart(path.to_string()))?;
        let (_, data) = self.entries.remove(index);
        String::from_utf8(data).map_err(|e| Error::Xml(format!("'{}' is not UTF-8: {}", path, e)))
    }

    /// Add or replace an entry.
    pub fn insert(&mut self, path: impl Into<String>, data: Vec<u8>) {
        let path = path.into();
        match self.entries.iter_mut().find(|(name, _)| *name == path) {
            Some(entry) => entry.1 = data,
            None => self.entries.push((path, data)),
        }
    }

    /// Remaining entries as untouched resources.
    pub fn into_resources(self) -> Vec<Resource> {
        self.entries
            .into_iter()
            .map(|(path, data)| Resource { path, data })
            .collect()
    }
}

/// Write a document as a package: untouched resources first, then every
/// parsed part rendered back to XML.
pub fn write_document<W: Write + Seek>(
    document: &Document,
    dialect: &Dialect,
    writer: W,
) -> Result<W> {
    let mut zip = ZipWriter::new(writer);
    let options = FileOptions::default().compression_method(CompressionMethod::Deflated);

    for resource in &document.resources {
        zip.start_file(resource.path.as_str(), options)
            .map_err(|e| Error::Zip(format!("Failed to add '{}': {}", resource.path, e)))?;
        zip.write_all(&resource.data)?;
    }

    for part in &document.parts {
        zip.start_file(part.path.as_str(), options)
            .map_err(|e| Error::Zip(format!("Failed to add '{}': {}", part.path, e)))?;
        zip.write_all(render_part(part, dialect).as_bytes())?;
    }

    let writer = zip
        .finish()
        .map_err(|e| Error::Zip(format!("Failed to finish ZIP: {}", e)))?;
    log::debug!(
        "Wrote {} resource(s) and {} part(s)",
        document.resources.len(),
        document.parts.len()
    );
    Ok(writer)
}

/// Write a document package to `path` through a temporary file in the same
/// directory. The target is only replaced once the whole package is written.
pub fn save_document(document: &Document, dialect: &Dialect, path: &Path) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let temp = NamedTempFile::new_in(dir).map_err(|e| Error::write(path, e))?;
    let writer = write_document(document, dialect, BufWriter::new(temp))
        .map_err(|e| Error::write(path, e))?;
    let temp = writer
        .into_inner()
        .map_err(|e| Error::write(path, e.error()))?;
    temp.persist(path).map_err(|e| Error::write(path, e))?;
    Ok(())
}

/// Number at the end of a part name or relationship id ("rId2", "header3.xml").
pub fn trailing_number(s: &str) -> Option<usize> {
    let s = s.trim_end_matches(".rels").trim_end_matches(".xml");
    let digits = s.len() - s.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    s[s.len() - digits..].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use docfill_core::{Part, PartKind, Segment};
    use std::io::Cursor;

    fn build_zip(entries: &[(&str, &str)]) -> Vec<u8> {
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        let options = FileOptions::default();
        for (name, body) in entries {
            zip.start_file(*name, options).unwrap();
            zip.write_all(body.as_bytes()).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    fn plain_style(_: &str) -> docfill_core::Style {
        docfill_core::Style::default()
    }

    const DIALECT: Dialect = Dialect {
        prefix: "w",
        text_open: "<w:t>",
        text_close: "</w:t>",
        dropped_inline: &[],
        dropped_in_run: &[],
        groups: &[],
        parse_style: plain_style,
    };

    #[test]
    fn test_trailing_number() {
        assert_eq!(trailing_number("rId1"), Some(1));
        assert_eq!(trailing_number("rId12"), Some(12));
        assert_eq!(trailing_number("slide123.xml"), Some(123));
        assert_eq!(trailing_number("word/header2.xml"), Some(2));
        assert_eq!(trailing_number("nodigits"), None);
    }

    #[test]
    fn test_read_and_take_entries() {
        let bytes = build_zip(&[("a.xml", "<a/>"), ("word/document.xml", "<doc/>")]);
        let mut package = Package::from_reader(Cursor::new(bytes)).unwrap();

        assert_eq!(package.format(), Some(DocumentFormat::Docx));
        assert!(package.contains("a.xml"));
        assert_eq!(package.read_string("a.xml").unwrap(), "<a/>");
        assert_eq!(package.take_string("word/document.xml").unwrap(), "<doc/>");
        assert!(!package.contains("word/document.xml"));
        assert!(matches!(
            package.take_string("word/document.xml"),
            Err(Error::MissingPart(_))
        ));

        package.insert("a.xml", b"<b/>".to_vec());
        let resources = package.into_resources();
        assert_eq!(resources.len(), 1);
        assert_eq!(resources[0].data, b"<b/>");
    }

    #[test]
    fn test_not_a_zip() {
        let result = Package::from_reader(Cursor::new(b"not a zip".to_vec()));
        assert!(matches!(result, Err(Error::Zip(_))));
    }

    #[test]
    fn test_sniff_format_reads_names_only() {
        let bytes = build_zip(&[("[Content_Types].xml", "<Types/>"), ("ppt/presentation.xml", "<p/>")]);
        assert_eq!(
            Package::sniff_format(Cursor::new(bytes)).unwrap(),
            Some(DocumentFormat::Pptx)
        );

        let bytes = build_zip(&[("content.xml", "<office/>")]);
        assert_eq!(Package::sniff_format(Cursor::new(bytes)).unwrap(), None);
        assert!(Package::sniff_format(Cursor::new(b"PK\x03\x04junk".to_vec())).is_err());
    }

    fn sample_document() -> Document {
        let mut document = Document::new(DocumentFormat::Docx);
        let mut part = Part::new("word/document.xml", PartKind::Body);
        part.segments.push(Segment::Markup("<w:document/>".into()));
        document.add_part(part);
        document
    }

    fn dir_entries(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[test]
    fn test_save_document_replaces_target() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.docx");
        std::fs::write(&path, b"old").unwrap();

        save_document(&sample_document(), &DIALECT, &path).unwrap();

        let package = Package::from_reader(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(package.read_string("word/document.xml").unwrap(), "<w:document/>");
        assert_eq!(dir_entries(dir.path()), vec!["out.docx"]);
    }

    #[test]
    fn test_failed_save_leaves_no_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        // A directory in the way makes the final rename fail.
        let path = dir.path().join("out.docx");
        std::fs::create_dir(&path).unwrap();

        let result = save_document(&sample_document(), &DIALECT, &path);
        assert!(matches!(result, Err(Error::Write { .. })));
        assert_eq!(dir_entries(dir.path()), vec!["out.docx"]);
        assert!(path.is_dir());
    }

    #[test]
    fn test_save_to_missing_directory_is_write_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = save_document(&sample_document(), &DIALECT, &dir.path().join("no/out.docx"));
        assert!(matches!(result, Err(Error::Write { .. })));
    }

    #[test]
    fn test_write_document_keeps_resources() {
        let mut document = Document::new(DocumentFormat::Docx);
        document.resources.push(Resource {
            path: "word/media/image1.png".into(),
            data: vec![0, 159, 146, 150],
        });
        let mut part = Part::new("word/document.xml", PartKind::Body);
        part.segments.push(Segment::Markup("<w:document/>".into()));
        document.add_part(part);

        let out = write_document(&document, &DIALECT, Cursor::new(Vec::new())).unwrap();
        let package = Package::from_reader(Cursor::new(out.into_inner())).unwrap();

        let names: Vec<_> = package.names().collect();
        assert_eq!(names, vec!["word/media/image1.png", "word/document.xml"]);
        assert_eq!(package.get("word/media/image1.png"), Some(&[0u8, 159, 146, 150][..]));
        assert_eq!(package.read_string("word/document.xml").unwrap(), "<w:document/>");
    }
}
