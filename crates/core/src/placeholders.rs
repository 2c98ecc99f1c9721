//! Placeholder discovery, for inspecting what a template expects.

use crate::markers::marker_id;
use crate::types::{Document, DocumentFormat, PartKind};
use regex::Regex;
use serde::Serialize;
use std::sync::LazyLock;

/// Regex matching one `{{...}}` token, shortest match.
static PLACEHOLDER_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\{(.*?)\}\}").unwrap());

/// Every `{{...}}` token in `text`, delimiters included, in order of appearance.
pub fn extract_placeholders(text: &str) -> Vec<String> {
    PLACEHOLDER_REGEX
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// Summary of a template: where its placeholders and markers are.
#[derive(Debug, Clone, Serialize)]
pub struct Outline {
    pub format: DocumentFormat,
    pub parts: Vec<PartOutline>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PartOutline {
    pub path: String,
    pub kind: PartKind,
    /// Identifiers of marker blocks, in order; `""` for bare `---`.
    pub markers: Vec<String>,
    /// Blocks that contain at least one placeholder.
    pub blocks: Vec<BlockOutline>,
}

#[derive(Debug, Clone, Serialize)]
pub struct BlockOutline {
    pub text: String,
    pub placeholders: Vec<String>,
}

impl Outline {
    /// Distinct placeholders across the document, first appearance first.
    pub fn placeholders(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for block in self.parts.iter().flat_map(|p| &p.blocks) {
            for token in &block.placeholders {
                if !seen.contains(&token.as_str()) {
                    seen.push(token);
                }
            }
        }
        seen
    }
}

/// Outline a document. Run it after normalization for accurate results.
pub fn outline(document: &Document) -> Outline {
    let parts = document
        .parts
        .iter()
        .map(|part| {
            let mut markers = Vec::new();
            let mut blocks = Vec::new();
            for container in part.containers() {
                container.for_each_block(&mut |block| {
                    if let Some(id) = marker_id(block) {
                        markers.push(id);
                        return;
                    }
                    let text = block.text();
                    let placeholders = extract_placeholders(&text);
                    if !placeholders.is_empty() {
                        blocks.push(BlockOutline { text, placeholders });
                    }
                });
            }
            PartOutline {
                path: part.path.clone(),
                kind: part.kind,
                markers,
                blocks,
            }
        })
        .collect();

    Outline {
        format: document.format,
        parts,
    }
}
