//! Marker-delimited block duplication.
//!
//! A region is everything strictly between the first two markers for an
//! identifier. The markers and the region are removed and the region is
//! re-emitted once per record, each copy substituted with its own record.

use crate::error::{Error, Result};
use crate::markers::locate_markers;
use crate::record::Record;
use crate::substitute::substitute_element;
use crate::types::{Container, Element};
use serde::Serialize;

/// What one successful duplication did to a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Expansion {
    /// Position of the first marker, where the copies start.
    pub start: usize,
    /// Elements removed: both markers plus the region.
    pub removed: usize,
    /// Elements in the repeated region.
    pub fragment_len: usize,
    /// Number of copies emitted (the record count).
    pub copies: usize,
}

impl Expansion {
    /// Elements inserted in place of the markers.
    pub fn inserted(&self) -> usize {
        self.copies * self.fragment_len
    }
}

/// Expand the region delimited by `id` markers in `container`.
///
/// With fewer than two markers the container is left untouched and
/// [`Error::MissingMarkerPair`] is returned; callers treat it as a skip.
/// Markers past the second are left in place.
pub fn duplicate_block(container: &mut Container, id: &str, records: &[Record]) -> Result<Expansion> {
    let markers = locate_markers(container, id);
    if markers.len() < 2 {
        return Err(Error::MissingMarkerPair {
            id: id.to_string(),
            found: markers.len(),
        });
    }
    if markers.len() > 2 {
        log::debug!(
            "Block '{}': {} markers found, only the first pair is expanded",
            id,
            markers.len()
        );
    }

    let (start, end) = (markers[0], markers[1]);
    let fragment: Vec<Element> = container.elements[start + 1..end].to_vec();

    // Highest index first so earlier positions stay valid.
    for index in (start..=end).rev() {
        container.elements.remove(index);
    }

    let mut cursor = start;
    for record in records {
        for element in &fragment {
            container.elements.insert(cursor, element.clone());
            substitute_element(&mut container.elements[cursor], record);
            cursor += 1;
        }
    }

    let expansion = Expansion {
        start,
        removed: end - start + 1,
        fragment_len: fragment.len(),
        copies: records.len(),
    };
    log::debug!(
        "Block '{}': {} element(s) x {} record(s) at {}",
        id,
        expansion.fragment_len,
        expansion.copies,
        start
    );
    Ok(expansion)
}
