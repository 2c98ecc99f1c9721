//! Domain types for representing a template document in memory.
//!
//! The model only owns the text-bearing parts of a package. Everything the
//! engine never looks at (properties, drawings, section settings, other
//! package entries) is carried as verbatim markup or bytes so the document
//! store can write it back untouched.

use crate::style::Style;
use serde::{Deserialize, Serialize};

/// The format of the source package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentFormat {
    /// Word processing document (WordprocessingML).
    Docx,
    /// Presentation (PresentationML).
    Pptx,
}

impl DocumentFormat {
    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "docx" | "docm" | "dotx" => Some(Self::Docx),
            "pptx" | "pptm" | "potx" => Some(Self::Pptx),
            _ => None,
        }
    }

    /// Detect format from the entry names of an OOXML package.
    pub fn from_entries<'a>(mut names: impl Iterator<Item = &'a str>) -> Option<Self> {
        names.find_map(|name| match name {
            "word/document.xml" => Some(Self::Docx),
            "ppt/presentation.xml" => Some(Self::Pptx),
            _ => None,
        })
    }

    /// Whether a text body must keep at least one paragraph. DrawingML text
    /// bodies are invalid without one.
    pub fn keeps_paragraph(&self) -> bool {
        matches!(self, Self::Pptx)
    }

    /// Check for the ZIP signature every OOXML package starts with.
    pub fn is_package(bytes: &[u8]) -> bool {
        bytes.starts_with(&[0x50, 0x4B, 0x03, 0x04])
    }
}

/// Wrapper tags of an element, kept verbatim (attributes included).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Markup {
    pub open: String,
    pub close: String,
}

impl Markup {
    pub fn new(open: impl Into<String>, close: impl Into<String>) -> Self {
        Self {
            open: open.into(),
            close: close.into(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.open.is_empty() && self.close.is_empty()
    }
}

/// A styled span of text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Run {
    pub text: String,
    pub style: Style,
    pub markup: Markup,
    /// Verbatim run property markup, written back as-is.
    pub properties: Option<String>,
}

impl Run {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn styled(text: impl Into<String>, style: Style) -> Self {
        Self {
            text: text.into(),
            style,
            ..Self::default()
        }
    }
}

/// One item inside a block.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Run(Run),
    /// A wrapper around inline content (hyperlink, smart tag, tracked
    /// insertion, simple field, content control). Its runs count as block
    /// text, but runs never merge across its boundary.
    Group(Group),
    /// Inline content that is not plain text (bookmarks, breaks, drawings).
    /// Never merged, never substituted.
    Opaque(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Group {
    pub markup: Markup,
    pub content: Vec<Inline>,
}

impl Group {
    pub fn new(markup: Markup, content: Vec<Inline>) -> Self {
        Self { markup, content }
    }
}

fn inline_runs<'a>(content: &'a [Inline]) -> Box<dyn Iterator<Item = &'a Run> + 'a> {
    Box::new(
        content
            .iter()
            .flat_map(|item| -> Box<dyn Iterator<Item = &'a Run> + 'a> {
                match item {
                    Inline::Run(run) => Box::new(std::iter::once(run)),
                    Inline::Group(group) => inline_runs(&group.content),
                    Inline::Opaque(_) => Box::new(std::iter::empty()),
                }
            }),
    )
}

fn inline_runs_mut<'a>(content: &'a mut [Inline]) -> Box<dyn Iterator<Item = &'a mut Run> + 'a> {
    Box::new(
        content
            .iter_mut()
            .flat_map(|item| -> Box<dyn Iterator<Item = &'a mut Run> + 'a> {
                match item {
                    Inline::Run(run) => Box::new(std::iter::once(run)),
                    Inline::Group(group) => inline_runs_mut(&mut group.content),
                    Inline::Opaque(_) => Box::new(std::iter::empty()),
                }
            }),
    )
}

/// Paragraph-equivalent unit: the unit of marker matching and duplication.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Block {
    pub markup: Markup,
    /// Verbatim paragraph property markup.
    pub properties: Option<String>,
    pub content: Vec<Inline>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_runs(runs: impl IntoIterator<Item = Run>) -> Self {
        Self {
            content: runs.into_iter().map(Inline::Run).collect(),
            ..Self::default()
        }
    }

    /// Convenience for a single unstyled run.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self::from_runs([Run::new(text)])
    }

    pub fn push_run(&mut self, run: Run) {
        self.content.push(Inline::Run(run));
    }

    /// Every run in document order, including runs inside groups.
    pub fn runs(&self) -> impl Iterator<Item = &Run> {
        inline_runs(&self.content)
    }

    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        inline_runs_mut(&mut self.content)
    }

    /// Rendered text: every run's text, in order.
    pub fn text(&self) -> String {
        self.runs().map(|r| r.text.as_str()).collect()
    }

    /// A copy with the same markup and properties but no runs or groups.
    /// Opaque items such as end-of-paragraph properties are kept.
    pub fn emptied(&self) -> Block {
        Block {
            markup: self.markup.clone(),
            properties: self.properties.clone(),
            content: self
                .content
                .iter()
                .filter(|item| matches!(item, Inline::Opaque(_)))
                .cloned()
                .collect(),
        }
    }
}

/// A grid of cells, each owning its own container.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    pub markup: Markup,
    pub children: Vec<TableChild>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableChild {
    Row(Row),
    /// Table properties, grid definitions and similar.
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub markup: Markup,
    pub children: Vec<RowChild>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RowChild {
    Cell(Cell),
    Other(String),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cell {
    pub markup: Markup,
    pub content: Container,
}

impl Table {
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.children.iter().filter_map(|child| match child {
            TableChild::Row(row) => Some(row),
            TableChild::Other(_) => None,
        })
    }

    pub fn rows_mut(&mut self) -> impl Iterator<Item = &mut Row> {
        self.children.iter_mut().filter_map(|child| match child {
            TableChild::Row(row) => Some(row),
            TableChild::Other(_) => None,
        })
    }
}

impl Row {
    pub fn from_cells(cells: impl IntoIterator<Item = Cell>) -> Self {
        Self {
            markup: Markup::default(),
            children: cells.into_iter().map(RowChild::Cell).collect(),
        }
    }

    pub fn cells(&self) -> impl Iterator<Item = &Cell> {
        self.children.iter().filter_map(|child| match child {
            RowChild::Cell(cell) => Some(cell),
            RowChild::Other(_) => None,
        })
    }

    pub fn cells_mut(&mut self) -> impl Iterator<Item = &mut Cell> {
        self.children.iter_mut().filter_map(|child| match child {
            RowChild::Cell(cell) => Some(cell),
            RowChild::Other(_) => None,
        })
    }
}

/// A block-level element of a container.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    Block(Block),
    Table(Table),
    /// Anything else at block level, kept verbatim.
    Other(String),
}

impl Element {
    pub fn as_block(&self) -> Option<&Block> {
        match self {
            Element::Block(block) => Some(block),
            _ => None,
        }
    }

    /// Visit every block in this element, descending into table cells.
    pub fn for_each_block(&self, f: &mut dyn FnMut(&Block)) {
        match self {
            Element::Block(block) => f(block),
            Element::Table(table) => {
                for row in table.rows() {
                    for cell in row.cells() {
                        cell.content.for_each_block(f);
                    }
                }
            }
            Element::Other(_) => {}
        }
    }

    /// Mutable counterpart of [`Element::for_each_block`].
    pub fn for_each_block_mut(&mut self, f: &mut dyn FnMut(&mut Block)) {
        match self {
            Element::Block(block) => f(block),
            Element::Table(table) => {
                for row in table.rows_mut() {
                    for cell in row.cells_mut() {
                        cell.content.for_each_block_mut(f);
                    }
                }
            }
            Element::Other(_) => {}
        }
    }
}

/// An ordered sequence of block-level elements (body, cell, shape text, header...).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Container {
    pub elements: Vec<Element>,
}

impl Container {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_elements(elements: impl IntoIterator<Item = Element>) -> Self {
        Self {
            elements: elements.into_iter().collect(),
        }
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Top-level blocks only.
    pub fn blocks(&self) -> impl Iterator<Item = &Block> {
        self.elements.iter().filter_map(Element::as_block)
    }

    pub fn for_each_block(&self, f: &mut dyn FnMut(&Block)) {
        for element in &self.elements {
            element.for_each_block(f);
        }
    }

    pub fn for_each_block_mut(&mut self, f: &mut dyn FnMut(&mut Block)) {
        for element in &mut self.elements {
            element.for_each_block_mut(f);
        }
    }
}

/// What role an XML part plays in the document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PartKind {
    Body,
    Header,
    Footer,
    Slide,
}

/// A piece of a part: verbatim markup or a parsed container.
#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Markup(String),
    Container(Container),
}

/// One XML part of the package owned by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct Part {
    /// Path inside the package, e.g. `word/document.xml`.
    pub path: String,
    pub kind: PartKind,
    pub segments: Vec<Segment>,
}

impl Part {
    pub fn new(path: impl Into<String>, kind: PartKind) -> Self {
        Self {
            path: path.into(),
            kind,
            segments: Vec::new(),
        }
    }

    pub fn containers(&self) -> impl Iterator<Item = &Container> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Container(container) => Some(container),
            Segment::Markup(_) => None,
        })
    }

    pub fn containers_mut(&mut self) -> impl Iterator<Item = &mut Container> {
        self.segments.iter_mut().filter_map(|segment| match segment {
            Segment::Container(container) => Some(container),
            Segment::Markup(_) => None,
        })
    }
}

/// A package entry the engine never inspects.
#[derive(Debug, Clone, PartialEq)]
pub struct Resource {
    pub path: String,
    pub data: Vec<u8>,
}

/// Represents an entire template with its parsed text parts.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub format: DocumentFormat,

    /// Parsed parts: body first, then headers/footers (DOCX) or slides in
    /// presentation order (PPTX).
    pub parts: Vec<Part>,

    /// Remaining package entries, in their original order.
    pub resources: Vec<Resource>,
}

impl Document {
    pub fn new(format: DocumentFormat) -> Self {
        Self {
            format,
            parts: Vec::new(),
            resources: Vec::new(),
        }
    }

    /// Convenience constructor: a document whose body is `container`.
    pub fn with_body(format: DocumentFormat, container: Container) -> Self {
        let mut part = Part::new("body", PartKind::Body);
        part.segments.push(Segment::Container(container));
        let mut document = Self::new(format);
        document.add_part(part);
        document
    }

    pub fn add_part(&mut self, part: Part) {
        self.parts.push(part);
    }

    /// The main body container, if the document has one.
    pub fn body(&self) -> Option<&Container> {
        self.parts
            .iter()
            .filter(|p| p.kind == PartKind::Body)
            .flat_map(|p| p.containers())
            .next()
    }

    pub fn body_mut(&mut self) -> Option<&mut Container> {
        self.parts
            .iter_mut()
            .filter(|p| p.kind == PartKind::Body)
            .flat_map(|p| p.containers_mut())
            .next()
    }

    /// Slides in presentation order.
    pub fn slides(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter().filter(|p| p.kind == PartKind::Slide)
    }

    /// Every container of every part.
    pub fn containers_mut(&mut self) -> impl Iterator<Item = &mut Container> {
        self.parts.iter_mut().flat_map(|p| p.containers_mut())
    }

    /// The containers block duplication searches.
    ///
    /// Word processing documents only expand regions in the body's top-level
    /// elements. Presentations expand each shape's text independently, so one
    /// identifier can expand once per shape.
    pub fn duplication_scopes_mut(&mut self) -> Vec<&mut Container> {
        match self.format {
            DocumentFormat::Docx => self.body_mut().into_iter().collect(),
            DocumentFormat::Pptx => self
                .parts
                .iter_mut()
                .filter(|p| p.kind == PartKind::Slide)
                .flat_map(|p| p.containers_mut())
                .collect(),
        }
    }

    /// Visit every block reachable in the document.
    pub fn for_each_block(&self, f: &mut dyn FnMut(&Block)) {
        for part in &self.parts {
            for container in part.containers() {
                container.for_each_block(f);
            }
        }
    }
}
