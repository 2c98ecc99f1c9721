//! Run normalization.
//!
//! Document editors often split what looks like one span into several runs
//! with identical formatting (spell-check marks, revision ids, autocorrect).
//! A placeholder straddling such a split is invisible to literal matching,
//! so adjacent runs with equivalent style are merged before substitution.

use crate::style::{CoarseStyle, StyleComparator};
use crate::types::{Block, Inline};

/// Merges adjacent runs whose styles the comparator deems equivalent.
#[derive(Debug, Clone, Default)]
pub struct RunNormalizer<C = CoarseStyle> {
    comparator: C,
}

impl RunNormalizer {
    /// Create a normalizer with the default coarse comparison.
    pub fn new() -> Self {
        Self::default()
    }
}

impl<C: StyleComparator> RunNormalizer<C> {
    /// Create a normalizer with a custom comparison.
    pub fn with_comparator(comparator: C) -> Self {
        Self { comparator }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    /// Merge every maximal sequence of adjacent, style-equivalent runs.
    ///
    /// The merged run keeps the first run's style and properties. Opaque
    /// inline items and group boundaries break adjacency; runs inside a group
    /// only merge with each other. Returns the number of merges.
    pub fn normalize_block(&self, block: &mut Block) -> usize {
        self.normalize_inlines(&mut block.content)
    }

    fn normalize_inlines(&self, content: &mut Vec<Inline>) -> usize {
        let mut merged = 0;
        let mut out: Vec<Inline> = Vec::with_capacity(content.len());

        for mut item in std::mem::take(content) {
            match &mut item {
                Inline::Run(run) => {
                    if let Some(Inline::Run(prev)) = out.last_mut() {
                        if self.comparator.equivalent(&prev.style, &run.style) {
                            prev.text.push_str(&run.text);
                            merged += 1;
                            continue;
                        }
                    }
                }
                Inline::Group(group) => merged += self.normalize_inlines(&mut group.content),
                Inline::Opaque(_) => {}
            }
            out.push(item);
        }

        *content = out;
        merged
    }
}
