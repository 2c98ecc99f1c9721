//! Output path building.

use crate::record::Record;
use std::path::PathBuf;

/// Fill placeholders in an output path pattern. No filesystem access.
pub fn build_output_path(pattern: &str, record: &Record) -> String {
    record.apply(pattern)
}

/// [`build_output_path`] as a path.
pub fn output_path(pattern: &str, record: &Record) -> PathBuf {
    PathBuf::from(build_output_path(pattern, record))
}
