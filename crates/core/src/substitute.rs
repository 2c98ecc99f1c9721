//! Placeholder substitution inside runs.

use crate::record::Record;
use crate::types::{Block, Element};

/// Replace record tokens in every run of `block`, leaving style untouched.
///
/// Matching is literal and per run: a placeholder split across runs is not
/// found, so normalize the block first. Returns the number of runs changed.
pub fn substitute_block(block: &mut Block, record: &Record) -> usize {
    let mut changed = 0;
    for run in block.runs_mut() {
        if run.text.is_empty() {
            continue;
        }
        let replaced = record.apply(&run.text);
        if replaced != run.text {
            run.text = replaced;
            changed += 1;
        }
    }
    changed
}

/// Substitute every block of an element, table cells included.
pub fn substitute_element(element: &mut Element, record: &Record) -> usize {
    let mut changed = 0;
    element.for_each_block_mut(&mut |block| changed += substitute_block(block, record));
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::RunNormalizer;
    use crate::style::Style;
    use crate::types::{Cell, Container, Markup, Row, Run, Table, TableChild};

    #[test]
    fn test_replaces_tokens_and_keeps_style() {
        let mut block = Block::from_runs([
            Run::styled("{{Title}}: ", Style::bold()),
            Run::new("{{Status}} / {{Status}}"),
        ]);
        let record = Record::new()
            .with("{{Title}}", "I241119_0041")
            .with("{{Status}}", "Completado");

        assert_eq!(substitute_block(&mut block, &record), 2);
        assert_eq!(block.text(), "I241119_0041: Completado / Completado");
        assert!(block.runs().next().unwrap().style.bold);
    }

    #[test]
    fn test_unmatched_tokens_pass_through() {
        let mut block = Block::from_text("{{Unknown}} stays");
        let record = Record::new().with("{{Known}}", "x");

        assert_eq!(substitute_block(&mut block, &record), 0);
        assert_eq!(block.text(), "{{Unknown}} stays");
    }

    #[test]
    fn test_case_sensitive() {
        let mut block = Block::from_text("{{client}}");
        substitute_block(&mut block, &Record::new().with("{{Client}}", "Acme"));
        assert_eq!(block.text(), "{{client}}");
    }

    #[test]
    fn test_split_placeholder_needs_normalization() {
        let record = Record::new().with("{{X}}", "Z");
        let split = Block::from_runs([Run::new("A{{X"), Run::new("}}B")]);

        let mut raw = split.clone();
        substitute_block(&mut raw, &record);
        assert_eq!(raw.text(), "A{{X}}B");

        let mut normalized = split;
        RunNormalizer::new().normalize_block(&mut normalized);
        substitute_block(&mut normalized, &record);
        assert_eq!(normalized.text(), "AZB");
    }

    #[test]
    fn test_empty_runs_are_skipped() {
        let mut block = Block::from_runs([Run::new(""), Run::new("{{a}}")]);
        let changed = substitute_block(&mut block, &Record::new().with("{{a}}", "b"));
        assert_eq!(changed, 1);
        assert_eq!(block.text(), "b");
    }

    #[test]
    fn test_substitute_element_reaches_cells() {
        let cell = Cell {
            markup: Markup::default(),
            content: Container::from_elements([Element::Block(Block::from_text("{{ID}}"))]),
        };
        let mut element = Element::Table(Table {
            markup: Markup::default(),
            children: vec![TableChild::Row(Row::from_cells([cell]))],
        });

        assert_eq!(substitute_element(&mut element, &Record::new().with("{{ID}}", "7")), 1);
        let mut texts = Vec::new();
        element.for_each_block(&mut |b| texts.push(b.text()));
        assert_eq!(texts, vec!["7"]);
    }
}
