//! Block markers: paragraphs whose whole text is `---` or `---<id>---`.

use crate::types::{Block, Container, Element};

/// Delimiter surrounding a block identifier in a marker paragraph.
pub const MARKER_DELIMITER: &str = "---";

/// Marker text for a block identifier; `---` when the identifier is empty.
pub fn marker_text(id: &str) -> String {
    if id.is_empty() {
        MARKER_DELIMITER.to_string()
    } else {
        format!("{MARKER_DELIMITER}{id}{MARKER_DELIMITER}")
    }
}

/// Whether the block's trimmed text is exactly `marker`.
pub fn is_marker(block: &Block, marker: &str) -> bool {
    block.text().trim() == marker
}

/// Positions of every marker block for `id`, in container order.
///
/// Only top-level blocks count; tables and other elements are never markers.
pub fn locate_markers(container: &Container, id: &str) -> Vec<usize> {
    let marker = marker_text(id);
    container
        .elements
        .iter()
        .enumerate()
        .filter_map(|(i, element)| match element {
            Element::Block(block) if is_marker(block, &marker) => Some(i),
            _ => None,
        })
        .collect()
}

/// The identifier a marker block stands for, if the block is a marker at all.
///
/// `---` yields `Some("")`, `---name---` yields `Some("name")`.
pub fn marker_id(block: &Block) -> Option<String> {
    let text = block.text();
    let text = text.trim();
    if text == MARKER_DELIMITER {
        return Some(String::new());
    }
    text.strip_prefix(MARKER_DELIMITER)
        .and_then(|rest| rest.strip_suffix(MARKER_DELIMITER))
        .filter(|id| !id.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Run;

    fn container(texts: &[&str]) -> Container {
        Container::from_elements(
            texts
                .iter()
                .map(|t| Element::Block(Block::from_text(*t))),
        )
    }

    #[test]
    fn test_marker_text() {
        assert_eq!(marker_text(""), "---");
        assert_eq!(marker_text("incidencia"), "---incidencia---");
    }

    #[test]
    fn test_locate_unqualified() {
        let c = container(&["intro", "---", "{{ID}}", "  ---  ", "---x---"]);
        assert_eq!(locate_markers(&c, ""), vec![1, 3]);
        assert_eq!(locate_markers(&c, "x"), vec![4]);
    }

    #[test]
    fn test_locate_reports_every_marker() {
        let c = container(&["---a---", "x", "---a---", "y", "---a---"]);
        assert_eq!(locate_markers(&c, "a"), vec![0, 2, 4]);
    }

    #[test]
    fn test_marker_split_across_runs_matches() {
        let block = Block::from_runs([Run::new("--"), Run::new("-peticion-"), Run::new("--")]);
        assert!(is_marker(&block, "---peticion---"));
    }

    #[test]
    fn test_other_elements_are_not_markers() {
        let c = Container::from_elements([
            Element::Other("---".to_string()),
            Element::Block(Block::from_text("---")),
        ]);
        assert_eq!(locate_markers(&c, ""), vec![1]);
    }

    #[test]
    fn test_marker_id() {
        assert_eq!(marker_id(&Block::from_text(" --- ")), Some(String::new()));
        assert_eq!(marker_id(&Block::from_text("---inc---")), Some("inc".to_string()));
        assert_eq!(marker_id(&Block::from_text("------")), None);
        assert_eq!(marker_id(&Block::from_text("--- text")), None);
    }
}
