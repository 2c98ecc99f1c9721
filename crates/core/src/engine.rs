//! Document traversal and the end-to-end expansion pipeline.
//!
//! Global substitution is document-wide: body, table cells, headers,
//! footers and every slide shape. Duplication is scoped to the containers
//! [`Document::duplication_scopes_mut`] returns.

use crate::config::Job;
use crate::duplicate::{duplicate_block, Expansion};
use crate::error::{Error, Result};
use crate::markers::locate_markers;
use crate::normalize::RunNormalizer;
use crate::path::output_path;
use crate::record::Record;
use crate::store::DocumentStore;
use crate::style::{CoarseStyle, StyleComparator};
use crate::substitute::substitute_block;
use crate::types::{Block, Document, DocumentFormat, Element};
use serde::Serialize;
use std::path::PathBuf;

/// Outcome of duplicating one block identifier across its scopes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BlockExpansion {
    pub id: String,
    /// One entry per container the region was found in.
    pub expansions: Vec<Expansion>,
}

/// Summary of one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Report {
    /// Where the document was written.
    pub output: PathBuf,
    /// Runs merged by normalization.
    pub merged_runs: usize,
    /// Runs changed by global substitution.
    pub substituted_runs: usize,
    pub expanded: Vec<BlockExpansion>,
    /// Identifiers with no marker pair in any scope.
    pub skipped: Vec<String>,
}

impl Report {
    /// True when some requested block could not be duplicated.
    pub fn is_degraded(&self) -> bool {
        !self.skipped.is_empty()
    }
}

/// Applies normalization, substitution and duplication to a document.
#[derive(Debug, Clone, Default)]
pub struct TemplateEngine<C = CoarseStyle> {
    normalizer: RunNormalizer<C>,
}

impl TemplateEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Engine with the style comparison suited to `format`.
    pub fn for_format(format: DocumentFormat) -> Self {
        Self::with_comparator(CoarseStyle::for_format(format))
    }
}

impl<C: StyleComparator> TemplateEngine<C> {
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            normalizer: RunNormalizer::with_comparator(comparator),
        }
    }

    /// Merge equivalent runs in every block. Returns the number of merges.
    pub fn normalize_document(&self, document: &mut Document) -> usize {
        let mut merged = 0;
        for container in document.containers_mut() {
            container.for_each_block_mut(&mut |block| {
                merged += self.normalizer.normalize_block(block);
            });
        }
        merged
    }

    /// Normalize then substitute `record` in every block of the document.
    ///
    /// Returns `(merged runs, substituted runs)`.
    pub fn apply_globals(&self, document: &mut Document, record: &Record) -> (usize, usize) {
        let mut merged = 0;
        let mut substituted = 0;
        for container in document.containers_mut() {
            container.for_each_block_mut(&mut |block| {
                merged += self.normalizer.normalize_block(block);
                substituted += substitute_block(block, record);
            });
        }
        log::debug!(
            "Global pass: {} run(s) merged, {} run(s) substituted",
            merged,
            substituted
        );
        (merged, substituted)
    }

    /// Duplicate the `id` region in every duplication scope of the document.
    ///
    /// Fails with [`Error::MissingMarkerPair`] only when no scope had a pair;
    /// scopes without markers are otherwise expected (not every shape
    /// carries every block).
    pub fn expand_block(
        &self,
        document: &mut Document,
        id: &str,
        records: &[Record],
    ) -> Result<BlockExpansion> {
        let keep_paragraph = document.format.keeps_paragraph();
        let mut expansions = Vec::new();
        let mut most_found = 0;

        for container in document.duplication_scopes_mut() {
            let filler = locate_markers(container, id)
                .first()
                .and_then(|&index| container.elements[index].as_block())
                .map(Block::emptied);
            match duplicate_block(container, id, records) {
                Ok(expansion) => {
                    if let Some(filler) = filler.filter(|_| keep_paragraph) {
                        if container.blocks().next().is_none() {
                            log::debug!("Block '{}' emptied a text body; keeping one paragraph", id);
                            container.elements.insert(expansion.start, Element::Block(filler));
                        }
                    }
                    expansions.push(expansion);
                }
                Err(Error::MissingMarkerPair { found, .. }) => most_found = most_found.max(found),
                Err(e) => return Err(e),
            }
        }

        if expansions.is_empty() {
            return Err(Error::MissingMarkerPair {
                id: id.to_string(),
                found: most_found,
            });
        }
        Ok(BlockExpansion {
            id: id.to_string(),
            expansions,
        })
    }

    /// Run a job's substitutions and duplications on an already loaded document.
    ///
    /// Globals go first and reach region templates too, so every copy
    /// inherits them; each copy then gets its own record's tokens.
    /// Missing marker pairs are collected, not raised.
    pub fn fill(&self, document: &mut Document, job: &Job) -> Report {
        let (merged_runs, substituted_runs) = self.apply_globals(document, &job.globals);
        let mut report = Report {
            merged_runs,
            substituted_runs,
            ..Report::default()
        };

        for (id, records) in job.blocks.iter() {
            match self.expand_block(document, id, records) {
                Ok(expansion) => report.expanded.push(expansion),
                Err(e) => {
                    log::warn!("{}; block left as is", e);
                    report.skipped.push(id.to_string());
                }
            }
        }
        report
    }
}

/// Load, fill and save: the whole pipeline for one job.
///
/// I/O failures abort; missing marker pairs end up in [`Report::skipped`].
pub fn generate(store: &dyn DocumentStore, job: &Job) -> Result<Report> {
    log::info!("Loading template {}", job.template.display());
    let mut document = store.load(&job.template)?;
    if document.format != store.format() {
        return Err(Error::UnsupportedFormat(format!(
            "{} is {:?}, store expects {:?}",
            job.template.display(),
            document.format,
            store.format()
        )));
    }

    let engine = TemplateEngine::for_format(document.format);
    let mut report = engine.fill(&mut document, job);

    let output = output_path(&job.output, &job.globals);
    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|e| Error::write(parent, e))?;
    }
    store.save(&document, &output)?;
    log::info!("Document written to {}", output.display());

    report.output = output;
    Ok(report)
}
