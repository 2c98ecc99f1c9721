//! PPTX file parser implementation.

use docfill_core::{Document, DocumentFormat, Error, PartKind, Result, Style};
use docfill_ooxml::{attribute, local_name, parse_part, trailing_number, Dialect, Package};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use std::io::{Read, Seek};

const PRESENTATION_PART: &str = "ppt/presentation.xml";
const PRESENTATION_RELS: &str = "ppt/_rels/presentation.xml.rels";

/// DrawingML text conventions.
pub const DRAWINGML: Dialect = Dialect {
    prefix: "a",
    text_open: "<a:t>",
    text_close: "</a:t>",
    dropped_inline: &[],
    dropped_in_run: &[],
    groups: &[],
    parse_style: parse_run_style,
};

/// Parser for PPTX (Office Open XML) files.
pub struct PptxParser;

impl PptxParser {
    /// Create a new PPTX parser.
    pub fn new() -> Self {
        Self
    }

    /// Parse a PPTX file from a reader. Each shape's text body becomes one
    /// container of its slide part.
    pub fn parse<R: Read + Seek>(&self, reader: R) -> Result<Document> {
        let mut package = Package::from_reader(reader)?;
        if let Some(DocumentFormat::Docx) = package.format() {
            return Err(Error::UnsupportedFormat(
                "expected a presentation, found a word processing document".to_string(),
            ));
        }
        if !package.contains(PRESENTATION_PART) {
            return Err(Error::MissingPart(PRESENTATION_PART.to_string()));
        }

        let mut document = Document::new(DocumentFormat::Pptx);

        // Get the slide order from presentation.xml and its relationships
        let slide_order = self.get_slide_order(&package)?;

        for slide_path in &slide_order {
            let xml = package.take_string(slide_path)?;
            document.add_part(parse_part(&xml, slide_path, PartKind::Slide, "txBody", &DRAWINGML)?);
        }

        log::debug!("Parsed PPTX with {} slide(s)", slide_order.len());
        document.resources = package.into_resources();
        Ok(document)
    }

    /// Get the ordered list of slide paths.
    ///
    /// `p:sldIdLst` in presentation.xml gives the display order by
    /// relationship id; slides it does not mention follow, sorted by number.
    fn get_slide_order(&self, package: &Package) -> Result<Vec<String>> {
        let rels_content = package.read_string(PRESENTATION_RELS)?;
        let mut slides: Vec<(String, String, Option<usize>)> = Vec::new();

        let mut reader = Reader::from_str(&rels_content);
        reader.trim_text(true);

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"Relationship" =>
                {
                    let rel_type = attribute(e, b"Type").unwrap_or_default();
                    let target = attribute(e, b"Target").unwrap_or_default();
                    let id = attribute(e, b"Id").unwrap_or_default();

                    // Check if this is a slide relationship
                    if rel_type.ends_with("/slide") {
                        let order_num = trailing_number(&target).or_else(|| trailing_number(&id));
                        let full_path = match target.strip_prefix('/') {
                            Some(absolute) => absolute.to_string(),
                            None => format!("ppt/{}", target),
                        };
                        slides.push((id, full_path, order_num));
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!("Error parsing relationships: {}", e)));
                }
                _ => {}
            }
        }

        // Sort slides by their number
        slides.sort_by(|a, b| match (a.2, b.2) {
            (Some(na), Some(nb)) => na.cmp(&nb),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => a.1.cmp(&b.1),
        });

        let listed = self.get_slide_ids(package)?;
        let mut ordered = Vec::with_capacity(slides.len());
        for rel_id in &listed {
            if let Some(index) = slides.iter().position(|(id, _, _)| id == rel_id) {
                ordered.push(slides.remove(index).1);
            } else {
                log::warn!("Slide list references unknown relationship {}", rel_id);
            }
        }
        ordered.extend(slides.into_iter().map(|(_, path, _)| path));

        ordered.retain(|path| {
            let present = package.contains(path);
            if !present {
                log::warn!("Slide {} is missing from the package", path);
            }
            present
        });
        Ok(ordered)
    }

    /// Relationship ids of `p:sldId` entries, in presentation order.
    fn get_slide_ids(&self, package: &Package) -> Result<Vec<String>> {
        let content = package.read_string(PRESENTATION_PART)?;
        let mut reader = Reader::from_str(&content);
        reader.trim_text(true);
        let mut ids = Vec::new();

        loop {
            match reader.read_event() {
                Ok(Event::Empty(ref e)) | Ok(Event::Start(ref e))
                    if local_name(e.name().as_ref()) == b"sldId" =>
                {
                    if let Some(rel_id) = rel_id(e) {
                        ids.push(rel_id);
                    }
                }
                Ok(Event::Eof) => break,
                Err(e) => {
                    return Err(Error::Xml(format!("Error parsing presentation: {}", e)));
                }
                _ => {}
            }
        }

        Ok(ids)
    }
}

impl Default for PptxParser {
    fn default() -> Self {
        Self::new()
    }
}

/// The `r:id` attribute. Matched by qualified name since `sldId` also has a
/// plain `id`.
fn rel_id(e: &BytesStart) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| {
            let key = attr.key.as_ref();
            key != b"id" && local_name(key) == b"id"
        })
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

/// Read the style descriptor out of an `a:rPr` (or `a:endParaRPr`) element.
///
/// Bold, italic and size are attributes; the color is the first solid fill
/// outside the text outline, and the font family is the Latin typeface.
pub fn parse_run_style(rpr: &str) -> Style {
    let mut style = Style::default();
    let mut reader = Reader::from_str(rpr);
    reader.trim_text(true);
    let mut in_solid_fill = false;
    let mut outline_depth = 0usize;

    loop {
        let event = match reader.read_event() {
            Ok(event) => event,
            Err(e) => {
                log::warn!("Malformed run properties (continuing): {}", e);
                break;
            }
        };
        match event {
            Event::Start(ref e) | Event::Empty(ref e) => {
                let is_start = matches!(event, Event::Start(_));
                match local_name(e.name().as_ref()) {
                    b"rPr" | b"endParaRPr" | b"defRPr" => {
                        style.bold = is_true(attribute(e, b"b"));
                        style.italic = is_true(attribute(e, b"i"));
                        style.font_size = attribute(e, b"sz")
                            .and_then(|v| v.parse::<f64>().ok())
                            .map(|hundredths| hundredths / 100.0);
                    }
                    b"ln" if is_start => outline_depth += 1,
                    b"solidFill" if is_start && outline_depth == 0 => in_solid_fill = true,
                    b"srgbClr" | b"schemeClr" | b"prstClr" | b"sysClr"
                        if in_solid_fill && style.color.is_none() =>
                    {
                        style.color = attribute(e, b"val");
                    }
                    b"latin" => style.font_family = attribute(e, b"typeface"),
                    _ => {}
                }
            }
            Event::End(ref e) => match local_name(e.name().as_ref()) {
                b"ln" => outline_depth = outline_depth.saturating_sub(1),
                b"solidFill" => in_solid_fill = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
    }

    style
}

fn is_true(value: Option<String>) -> bool {
    matches!(value.as_deref(), Some("1") | Some("true"))
}
