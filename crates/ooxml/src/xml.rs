//! Span-level XML scanning.
//!
//! Parsing works on raw slices of the part text instead of rebuilding
//! elements from events, so anything the model does not own is written
//! back exactly as it was read.

use docfill_core::{Error, Markup, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

/// What kind of node a top-level slice is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Element,
    Text,
    /// Comments, processing instructions, declarations, CDATA.
    Other,
}

/// A top-level node of an XML fragment, as a raw slice.
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    pub kind: NodeKind,
    /// Local element name (`p` for `w:p`); empty for non-elements.
    pub name: &'a str,
    pub raw: &'a str,
}

impl Node<'_> {
    pub fn is(&self, local: &str) -> bool {
        self.kind == NodeKind::Element && self.name == local
    }

    pub fn is_whitespace(&self) -> bool {
        self.kind == NodeKind::Text && self.raw.trim().is_empty()
    }
}

/// An element split into its tags and inner content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Split<'a> {
    pub open: &'a str,
    pub inner: &'a str,
    /// Empty for a self-closing element.
    pub close: &'a str,
}

impl Split<'_> {
    /// Wrapper tags as markup; self-closing elements get an explicit end tag
    /// so content can be added.
    pub fn markup(&self) -> Markup {
        if !self.close.is_empty() {
            return Markup::new(self.open, self.close);
        }
        let open = self.open.trim_end_matches("/>").trim_end();
        Markup::new(format!("{}>", open), format!("</{}>", qualified_name(self.open)))
    }
}

/// Piece of a part split around container elements.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Piece<'a> {
    Markup(&'a str),
    Inner(&'a str),
}

/// Extract the local name from a potentially namespaced XML element name.
pub fn local_name(name: &[u8]) -> &[u8] {
    if let Some(pos) = name.iter().position(|&b| b == b':') {
        &name[pos + 1..]
    } else {
        name
    }
}

/// Qualified name of the element a raw tag opens (`w:p` for `<w:p w:rsidR="1">`).
pub fn qualified_name(tag: &str) -> &str {
    let rest = tag.trim_start().trim_start_matches('<');
    let end = rest
        .find(|c: char| c.is_whitespace() || c == '/' || c == '>')
        .unwrap_or(rest.len());
    &rest[..end]
}

/// Value of the first attribute with the given local name.
pub fn attribute(e: &BytesStart, local: &[u8]) -> Option<String> {
    e.attributes()
        .flatten()
        .find(|attr| local_name(attr.key.as_ref()) == local)
        .map(|attr| String::from_utf8_lossy(&attr.value).to_string())
}

fn xml_error(context: &str, e: impl std::fmt::Display) -> Error {
    Error::Xml(format!("{}: {}", context, e))
}

/// The reader may already have consumed the `<` of the next tag while
/// reading the text before it; step back onto it.
fn tag_start(xml: &str, pos: usize) -> usize {
    let bytes = xml.as_bytes();
    if bytes.get(pos) == Some(&b'<') || pos == 0 {
        pos
    } else {
        xml[..pos].rfind('<').unwrap_or(pos)
    }
}

/// Text ends right before the `<` that terminated it.
fn text_end(xml: &str, start: usize, end: usize) -> usize {
    if end > start && xml.as_bytes()[end - 1] == b'<' {
        end - 1
    } else {
        end
    }
}

/// Top-level nodes of an XML fragment, in order.
pub fn children(xml: &str) -> Result<Vec<Node<'_>>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut nodes = Vec::new();

    loop {
        let before = reader.buffer_position();
        let event = reader
            .read_event()
            .map_err(|e| xml_error("Error reading element", e))?;

        let (kind, start, end) = match event {
            Event::Start(ref e) => {
                reader
                    .read_to_end(e.name())
                    .map_err(|err| xml_error("Unclosed element", err))?;
                (NodeKind::Element, tag_start(xml, before), reader.buffer_position())
            }
            Event::Empty(_) => (NodeKind::Element, tag_start(xml, before), reader.buffer_position()),
            Event::Text(_) => {
                let end = reader.buffer_position();
                (NodeKind::Text, before, text_end(xml, before, end))
            }
            Event::Eof => break,
            Event::End(_) => {
                return Err(Error::Xml("Unexpected closing tag in fragment".to_string()));
            }
            _ => (NodeKind::Other, tag_start(xml, before), reader.buffer_position()),
        };

        let raw = &xml[start..end];
        let name = match kind {
            NodeKind::Element => {
                let qname = qualified_name(raw);
                qname.rsplit(':').next().unwrap_or(qname)
            }
            _ => "",
        };
        nodes.push(Node { kind, name, raw });
    }

    Ok(nodes)
}

/// Split one raw element into open tag, inner content and close tag.
pub fn split_element(raw: &str) -> Result<Split<'_>> {
    let mut reader = Reader::from_str(raw);
    reader.trim_text(false);

    loop {
        match reader
            .read_event()
            .map_err(|e| xml_error("Error reading element", e))?
        {
            Event::Start(_) => {
                let open_end = reader.buffer_position();
                let close_start = raw
                    .rfind("</")
                    .filter(|&pos| pos >= open_end)
                    .ok_or_else(|| Error::Xml(format!("Missing end tag for {}", qualified_name(raw))))?;
                return Ok(Split {
                    open: &raw[..open_end],
                    inner: &raw[open_end..close_start],
                    close: &raw[close_start..],
                });
            }
            Event::Empty(_) => {
                return Ok(Split {
                    open: raw,
                    inner: "",
                    close: "",
                })
            }
            Event::Eof => return Err(Error::Xml("Expected an element".to_string())),
            _ => {}
        }
    }
}

/// Split a whole part around every element named `local`: markup up to and
/// including each open tag, the element's inner content, and so on.
pub fn split_around<'a>(xml: &'a str, local: &[u8]) -> Result<Vec<Piece<'a>>> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(false);
    let mut pieces = Vec::new();
    let mut cursor = 0;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if local_name(e.name().as_ref()) == local => {
                let open_end = reader.buffer_position();
                reader
                    .read_to_end(e.name())
                    .map_err(|err| xml_error("Unclosed container", err))?;
                let end = reader.buffer_position();
                let close_start = xml[..end]
                    .rfind("</")
                    .filter(|&pos| pos >= open_end)
                    .ok_or_else(|| Error::Xml("Missing container end tag".to_string()))?;

                pieces.push(Piece::Markup(&xml[cursor..open_end]));
                pieces.push(Piece::Inner(&xml[open_end..close_start]));
                cursor = close_start;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(xml_error("Error scanning part", e)),
            _ => {}
        }
    }

    if cursor < xml.len() {
        pieces.push(Piece::Markup(&xml[cursor..]));
    }
    Ok(pieces)
}
