//! Subtitle localization containers
//!
//! Containers are only ever read and written through the external codec;
//! this module owns the bookkeeping around it.

mod merge;

use std::path::PathBuf;

use indexmap::IndexMap;

pub use merge::{LocresMerger, merge_rows, table_to_map};

/// Normalized subtitle key (audio basename) to display text, in table order
pub type SubtitleMap = IndexMap<String, String>;

/// What to do when an overlay key matches more than one addressable row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Update every matching row and report the key
    #[default]
    Warn,
    /// Fail the merge before anything is written
    Reject,
}

/// Counters from applying an overlay to a table
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeStats {
    /// Addressable rows whose text was replaced
    pub replaced: usize,
    /// Rows synthesized for keys the container did not have
    pub appended: usize,
    /// Addressable rows left as they were
    pub unchanged: usize,
    /// Rows outside the addressable subset
    pub passthrough: usize,
    /// Overlay keys that matched several rows
    pub ambiguous_keys: Vec<String>,
}

impl MergeStats {
    /// Whether the merge changed anything
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.replaced == 0 && self.appended == 0
    }
}

/// How the codec's import output reached the container
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportStatus {
    /// A `.new` container appeared and replaced the original
    Replaced,
    /// No `.new` container appeared; the codec is assumed to have written in place
    AssumedInPlace,
}

/// Outcome of [`LocresMerger::merge_and_import`]
#[derive(Debug, Clone)]
pub struct MergeReport {
    /// Absolute path of the container that was updated
    pub container: PathBuf,
    pub stats: MergeStats,
    pub import: ImportStatus,
}
