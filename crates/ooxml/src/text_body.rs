//! Paragraph/run/table parsing and writing shared by WordprocessingML and
//! DrawingML text bodies.
//!
//! Both vocabularies use the same local names (`p`, `pPr`, `r`, `rPr`, `t`,
//! `tbl`, `tr`, `tc`); a [`Dialect`] supplies the differences.

use crate::xml::{children, split_around, split_element, Node, Piece};
use docfill_core::{
    Block, Cell, Container, Element, Error, Group, Inline, Markup, Part, PartKind, Result,
    Row, RowChild, Run, Segment, Style, Table, TableChild,
};
use quick_xml::escape::{partial_escape, unescape};

/// Per-vocabulary details of reading and writing text.
#[derive(Debug, Clone, Copy)]
pub struct Dialect {
    /// Namespace prefix used for elements the writer creates.
    pub prefix: &'static str,
    /// Open tag written before run text.
    pub text_open: &'static str,
    pub text_close: &'static str,
    /// Paragraph children dropped on load (spell-check and grammar marks).
    pub dropped_inline: &'static [&'static str],
    /// Run children dropped on load (render hints).
    pub dropped_in_run: &'static [&'static str],
    /// Paragraph children that wrap runs (hyperlinks, smart tags, content
    /// controls). Their runs are read as part of the paragraph text.
    pub groups: &'static [&'static str],
    /// Reads a run property element into a style descriptor.
    pub parse_style: fn(&str) -> Style,
}

impl Dialect {
    fn default_tags(&self, local: &str) -> (String, String) {
        (
            format!("<{}:{}>", self.prefix, local),
            format!("</{}:{}>", self.prefix, local),
        )
    }
}

fn is_any(node: &Node, names: &[&str]) -> bool {
    names.iter().any(|name| node.is(name))
}

/// Parse the inner content of a container element (body, cell, text body).
pub fn parse_container(xml: &str, dialect: &Dialect) -> Result<Container> {
    let mut container = Container::new();
    for node in children(xml)? {
        let element = if node.is("p") {
            Element::Block(parse_block(node.raw, dialect)?)
        } else if node.is("tbl") {
            Element::Table(parse_table(node.raw, dialect)?)
        } else {
            Element::Other(node.raw.to_string())
        };
        container.push(element);
    }
    Ok(container)
}

/// Parse one raw paragraph element.
pub fn parse_block(raw: &str, dialect: &Dialect) -> Result<Block> {
    let split = split_element(raw)?;
    let mut block = Block {
        markup: split.markup(),
        ..Block::default()
    };

    let mut inline = Vec::new();
    for node in children(split.inner)? {
        if node.is("pPr") {
            block.properties = Some(node.raw.to_string());
        } else {
            inline.push(node);
        }
    }
    block.content = parse_inlines(&inline, dialect)?;
    Ok(block)
}

fn parse_inlines(nodes: &[Node], dialect: &Dialect) -> Result<Vec<Inline>> {
    let mut content = Vec::new();
    for node in nodes {
        if node.is_whitespace() || is_any(node, dialect.dropped_inline) {
            continue;
        }
        if node.is("r") {
            content.push(parse_run(node.raw, dialect)?);
        } else if is_any(node, dialect.groups) {
            content.push(parse_group(node.raw, dialect)?);
        } else {
            content.push(Inline::Opaque(node.raw.to_string()));
        }
    }
    Ok(content)
}

/// Parse a run wrapper. Its non-run children (content control properties,
/// bookmarks) stay opaque inside the group.
fn parse_group(raw: &str, dialect: &Dialect) -> Result<Inline> {
    let split = split_element(raw)?;
    let nodes = children(split.inner)?;
    Ok(Inline::Group(Group::new(
        split.markup(),
        parse_inlines(&nodes, dialect)?,
    )))
}

/// Parse one raw run. Runs holding anything but properties and text
/// (tabs, breaks, drawings, field codes) stay opaque.
pub fn parse_run(raw: &str, dialect: &Dialect) -> Result<Inline> {
    let split = split_element(raw)?;
    let mut run = Run {
        markup: split.markup(),
        ..Run::default()
    };

    for node in children(split.inner)? {
        if node.is_whitespace() || is_any(&node, dialect.dropped_in_run) {
            continue;
        }
        if node.is("rPr") {
            run.style = (dialect.parse_style)(node.raw);
            run.properties = Some(node.raw.to_string());
        } else if node.is("t") {
            let text = split_element(node.raw)?.inner;
            let text = unescape(text).map_err(|e| Error::Xml(format!("Bad text escape: {}", e)))?;
            run.text.push_str(&text);
        } else {
            return Ok(Inline::Opaque(raw.to_string()));
        }
    }
    Ok(Inline::Run(run))
}

fn parse_table(raw: &str, dialect: &Dialect) -> Result<Table> {
    let split = split_element(raw)?;
    let mut table = Table {
        markup: split.markup(),
        children: Vec::new(),
    };
    for node in children(split.inner)? {
        table.children.push(if node.is("tr") {
            TableChild::Row(parse_row(node.raw, dialect)?)
        } else {
            TableChild::Other(node.raw.to_string())
        });
    }
    Ok(table)
}

fn parse_row(raw: &str, dialect: &Dialect) -> Result<Row> {
    let split = split_element(raw)?;
    let mut row = Row {
        markup: split.markup(),
        children: Vec::new(),
    };
    for node in children(split.inner)? {
        row.children.push(if node.is("tc") {
            let cell = split_element(node.raw)?;
            RowChild::Cell(Cell {
                markup: cell.markup(),
                content: parse_container(cell.inner, dialect)?,
            })
        } else {
            RowChild::Other(node.raw.to_string())
        });
    }
    Ok(row)
}

/// Parse a whole part, turning every `container_local` element into a container.
pub fn parse_part(
    xml: &str,
    path: &str,
    kind: PartKind,
    container_local: &str,
    dialect: &Dialect,
) -> Result<Part> {
    let mut part = Part::new(path, kind);
    for piece in split_around(xml, container_local.as_bytes())? {
        part.segments.push(match piece {
            Piece::Markup(markup) => Segment::Markup(markup.to_string()),
            Piece::Inner(inner) => Segment::Container(parse_container(inner, dialect)?),
        });
    }
    log::debug!(
        "Parsed {}: {} container(s)",
        path,
        part.containers().count()
    );
    Ok(part)
}

/// Serialize a part back to XML text.
pub fn render_part(part: &Part, dialect: &Dialect) -> String {
    let mut out = String::new();
    for segment in &part.segments {
        match segment {
            Segment::Markup(markup) => out.push_str(markup),
            Segment::Container(container) => write_container(container, dialect, &mut out),
        }
    }
    out
}

pub fn write_container(container: &Container, dialect: &Dialect, out: &mut String) {
    for element in &container.elements {
        match element {
            Element::Block(block) => write_block(block, dialect, out),
            Element::Table(table) => write_table(table, dialect, out),
            Element::Other(raw) => out.push_str(raw),
        }
    }
}

fn open_close(markup: &Markup, dialect: &Dialect, local: &str) -> (String, String) {
    if markup.is_empty() {
        dialect.default_tags(local)
    } else {
        (markup.open.clone(), markup.close.clone())
    }
}

pub fn write_block(block: &Block, dialect: &Dialect, out: &mut String) {
    let (open, close) = open_close(&block.markup, dialect, "p");
    out.push_str(&open);
    if let Some(properties) = &block.properties {
        out.push_str(properties);
    }
    write_inlines(&block.content, dialect, out);
    out.push_str(&close);
}

fn write_inlines(content: &[Inline], dialect: &Dialect, out: &mut String) {
    for item in content {
        match item {
            Inline::Run(run) => write_run(run, dialect, out),
            Inline::Group(group) => {
                out.push_str(&group.markup.open);
                write_inlines(&group.content, dialect, out);
                out.push_str(&group.markup.close);
            }
            Inline::Opaque(raw) => out.push_str(raw),
        }
    }
}

fn write_run(run: &Run, dialect: &Dialect, out: &mut String) {
    let (open, close) = open_close(&run.markup, dialect, "r");
    out.push_str(&open);
    if let Some(properties) = &run.properties {
        out.push_str(properties);
    }
    if !run.text.is_empty() {
        out.push_str(dialect.text_open);
        out.push_str(&partial_escape(run.text.as_str()));
        out.push_str(dialect.text_close);
    }
    out.push_str(&close);
}

fn write_table(table: &Table, dialect: &Dialect, out: &mut String) {
    let (open, close) = open_close(&table.markup, dialect, "tbl");
    out.push_str(&open);
    for child in &table.children {
        match child {
            TableChild::Row(row) => {
                let (open, close) = open_close(&row.markup, dialect, "tr");
                out.push_str(&open);
                for child in &row.children {
                    match child {
                        RowChild::Cell(cell) => {
                            let (open, close) = open_close(&cell.markup, dialect, "tc");
                            out.push_str(&open);
                            write_container(&cell.content, dialect, out);
                            out.push_str(&close);
                        }
                        RowChild::Other(raw) => out.push_str(raw),
                    }
                }
                out.push_str(&close);
            }
            TableChild::Other(raw) => out.push_str(raw),
        }
    }
    out.push_str(&close);
}
