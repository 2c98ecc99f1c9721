//! Job configuration: which template to fill, where to write it and with what data.
//!
//! A job is a JSON document:
//!
//! ```json
//! {
//!   "template": "Plantilla.docx",
//!   "output": "Informe {{Client}} {{month}}.docx",
//!   "globals": { "{{Client}}": "Acme", "{{month}}": "noviembre" },
//!   "blocks": { "incidencia": [ { "{{ID}}": "1" }, { "{{ID}}": "2" } ] }
//! }
//! ```
//!
//! Key order is kept for `globals`, every record and `blocks`.

use crate::error::{Error, Result};
use crate::record::{deserialize_ordered, Record};
use serde::de::Deserializer;
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Record lists keyed by block identifier, in job order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Blocks {
    entries: Vec<(String, Vec<Record>)>,
}

impl Blocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add (or replace) the records for one block identifier.
    pub fn insert(&mut self, id: impl Into<String>, records: Vec<Record>) {
        let id = id.into();
        match self.entries.iter_mut().find(|(existing, _)| *existing == id) {
            Some(entry) => entry.1 = records,
            None => self.entries.push((id, records)),
        }
    }

    pub fn with(mut self, id: impl Into<String>, records: Vec<Record>) -> Self {
        self.insert(id, records);
        self
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[Record])> {
        self.entries
            .iter()
            .map(|(id, records)| (id.as_str(), records.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<'de> Deserialize<'de> for Blocks {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let mut blocks = Blocks::new();
        for (id, records) in deserialize_ordered::<D, Vec<Record>>(deserializer)? {
            blocks.insert(id, records);
        }
        Ok(blocks)
    }
}

/// Everything one expansion run needs, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Job {
    /// Template package to read.
    pub template: PathBuf,

    /// Output path pattern; placeholders are filled from `globals`.
    pub output: String,

    /// Substituted everywhere in the document.
    #[serde(default)]
    pub globals: Record,

    /// Repeatable regions, keyed by block identifier (`""` for bare `---` markers).
    #[serde(default)]
    pub blocks: Blocks,
}

impl Job {
    pub fn new(template: impl Into<PathBuf>, output: impl Into<String>) -> Self {
        Self {
            template: template.into(),
            output: output.into(),
            globals: Record::new(),
            blocks: Blocks::new(),
        }
    }

    pub fn with_globals(mut self, globals: Record) -> Self {
        self.globals = globals;
        self
    }

    /// Add a repeatable region with its records.
    pub fn with_block(mut self, id: impl Into<String>, records: Vec<Record>) -> Self {
        self.blocks.insert(id, records);
        self
    }

    /// Parse a job from JSON text. Paths are taken as written.
    pub fn from_json(json: &str) -> Result<Self> {
        let job: Job = serde_json::from_str(json)?;
        job.validate()?;
        Ok(job)
    }

    /// Load a job file. Relative `template` and `output` paths resolve
    /// against the job file's directory.
    pub fn from_path(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read job file {}: {}", path.display(), e)))?;
        let job = Self::from_json(&json)?;
        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(job.resolve_against(base))
    }

    /// Make relative paths relative to `base`.
    pub fn resolve_against(mut self, base: &Path) -> Self {
        if self.template.is_relative() {
            self.template = base.join(&self.template);
        }
        if Path::new(&self.output).is_relative() {
            self.output = base.join(&self.output).to_string_lossy().into_owned();
        }
        self
    }

    fn validate(&self) -> Result<()> {
        if self.template.as_os_str().is_empty() {
            return Err(Error::Config("'template' must not be empty".to_string()));
        }
        if self.output.trim().is_empty() {
            return Err(Error::Config("'output' must not be empty".to_string()));
        }
        Ok(())
    }
}
