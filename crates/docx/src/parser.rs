//! DOCX package parser.

use docfill_core::{Document, DocumentFormat, Error, PartKind, Result, Style};
use docfill_ooxml::{attribute, local_name, parse_part, trailing_number, Dialect, Package};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Read, Seek};

const DOCUMENT_PART: &str = "word/document.xml";

/// WordprocessingML text conventions.
pub const WORDPROCESSING: Dialect = Dialect {
    prefix: "w",
    text_open: r#"<w:t xml:space="preserve">"#,
    text_close: "</w:t>",
    dropped_inline: &["proofErr"],
    dropped_in_run: &["lastRenderedPageBreak"],
    groups: &[
        "hyperlink",
        "smartTag",
        "customXml",
        "ins",
        "moveTo",
        "fldSimple",
        "sdt",
        "sdtContent",
    ],
    parse_style: parse_run_style,
};

/// Parser for DOCX (Office Open XML) files.
pub struct DocxParser;

impl DocxParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse a DOCX package from a reader.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Document> {
        let mut package = Package::from_reader(reader)?;
        if let Some(DocumentFormat::Pptx) = package.format() {
            return Err(Error::UnsupportedFormat(
                "expected a word processing document, found a presentation".to_string(),
            ));
        }

        let mut document = Document::new(DocumentFormat::Docx);
        let body = package.take_string(DOCUMENT_PART)?;
        document.add_part(parse_part(&body, DOCUMENT_PART, PartKind::Body, "body", &WORDPROCESSING)?);

        for (path, kind, root) in header_footer_parts(&package) {
            let xml = package.take_string(&path)?;
            document.add_part(parse_part(&xml, &path, kind, root, &WORDPROCESSING)?);
        }

        log::debug!("Parsed DOCX with {} part(s)", document.parts.len());
        document.resources = package.into_resources();
        Ok(document)
    }
}

impl Default for DocxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Header parts then footer parts, each sorted by their number.
fn header_footer_parts(package: &Package) -> Vec<(String, PartKind, &'static str)> {
    let mut parts: Vec<(String, PartKind, &'static str)> = package
        .names()
        .filter_map(|name| {
            let file = name.strip_prefix("word/")?;
            if file.contains('/') || !file.ends_with(".xml") {
                return None;
            }
            if file.starts_with("header") {
                Some((name.to_string(), PartKind::Header, "hdr"))
            } else if file.starts_with("footer") {
                Some((name.to_string(), PartKind::Footer, "ftr"))
            } else {
                None
            }
        })
        .collect();

    parts.sort_by(|a, b| {
        let kind_order = |kind: PartKind| if kind == PartKind::Header { 0 } else { 1 };
        kind_order(a.1)
            .cmp(&kind_order(b.1))
            .then_with(|| trailing_number(&a.0).cmp(&trailing_number(&b.0)))
            .then_with(|| a.0.cmp(&b.0))
    });
    parts
}

/// On/off properties (`w:b`, `w:i`) are on unless `w:val` turns them off.
fn is_on(e: &BytesStart) -> bool {
    match attribute(e, b"val") {
        Some(val) => !matches!(val.as_str(), "0" | "false" | "off" | "none"),
        None => true,
    }
}

/// Read the style descriptor out of a `w:rPr` element.
pub fn parse_run_style(rpr: &str) -> Style {
    let mut style = Style::default();
    let mut reader = Reader::from_str(rpr);
    reader.trim_text(true);

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Malformed run properties (continuing): {}", e);
                break;
            }
        };
        match event {
            Event::Start(ref e) if local_name(e.name().as_ref()) == b"rPrChange" => {
                // Tracked-change history describes the old formatting.
                if let Err(err) = reader.read_to_end(e.name()) {
                    log::warn!("Malformed tracked change (continuing): {}", err);
                    break;
                }
            }
            Event::Start(ref e) | Event::Empty(ref e) => match local_name(e.name().as_ref()) {
                b"b" => style.bold = is_on(e),
                b"i" => style.italic = is_on(e),
                b"color" => style.color = attribute(e, b"val"),
                b"sz" => {
                    style.font_size = attribute(e, b"val")
                        .and_then(|v| v.parse::<f64>().ok())
                        .map(|half_points| half_points / 2.0);
                }
                b"rFonts" => {
                    style.font_family =
                        attribute(e, b"ascii").or_else(|| attribute(e, b"hAnsi"));
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    style
}
