//! Run style descriptors and the equivalence used to decide run merging.

use crate::types::DocumentFormat;
use serde::Serialize;

/// The subset of run formatting that merge eligibility looks at.
///
/// Absent attributes stay `None`/`false`; they are never an error.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Style {
    pub bold: bool,
    pub italic: bool,
    /// Color value as written in the package (hex or scheme name).
    pub color: Option<String>,
    pub font_family: Option<String>,
    /// Font size in points.
    pub font_size: Option<f64>,
}

impl Style {
    pub fn bold() -> Self {
        Self {
            bold: true,
            ..Self::default()
        }
    }

    pub fn italic() -> Self {
        Self {
            italic: true,
            ..Self::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_font_family(mut self, family: impl Into<String>) -> Self {
        self.font_family = Some(family.into());
        self
    }

    pub fn with_font_size(mut self, size: f64) -> Self {
        self.font_size = Some(size);
        self
    }
}

/// Decides whether two adjacent runs may be merged into one.
///
/// Implemented for plain closures, so callers can tighten or loosen merging
/// without a new type.
pub trait StyleComparator {
    fn equivalent(&self, a: &Style, b: &Style) -> bool;
}

impl<F> StyleComparator for F
where
    F: Fn(&Style, &Style) -> bool,
{
    fn equivalent(&self, a: &Style, b: &Style) -> bool {
        self(a, b)
    }
}

/// Coarse "looks the same" comparison: bold, italic, color and size,
/// plus font family when enabled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoarseStyle {
    compare_font_family: bool,
}

impl CoarseStyle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set whether font family takes part in the comparison.
    pub fn with_font_family(mut self, compare: bool) -> Self {
        self.compare_font_family = compare;
        self
    }

    /// Presentations compare font family too; word processing documents don't.
    pub fn for_format(format: DocumentFormat) -> Self {
        Self::new().with_font_family(format == DocumentFormat::Pptx)
    }
}

impl StyleComparator for CoarseStyle {
    fn equivalent(&self, a: &Style, b: &Style) -> bool {
        a.bold == b.bold
            && a.italic == b.italic
            && a.color == b.color
            && a.font_size == b.font_size
            && (!self.compare_font_family || a.font_family == b.font_family)
    }
}
