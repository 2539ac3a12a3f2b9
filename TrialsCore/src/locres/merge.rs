//! Localization merge engine
//!
//! Round-trips a `.locres` container through its row table:
//!
//! 1. export the container's full table
//! 2. index the addressable rows by normalized key
//! 3. replace the text of rows the overlay touches
//! 4. append rows for overlay keys the container does not have yet
//! 5. write the table and import it through the codec
//! 6. swap the codec's `.new` output over the original container
//! 7. delete the intermediate table
//!
//! Rows are never removed, so repeated merges only grow the table, and a
//! row appended by one merge is addressable (and therefore replaced, not
//! duplicated) by the next.

use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

use super::{DuplicatePolicy, ImportStatus, MergeReport, MergeStats, SubtitleMap};
use crate::error::{Error, Result};
use crate::formats::{KeyConvention, LocalizationTable, TableRow, read_table, write_table};
use crate::tools::{LocresCodec, PollSettings, wait_for_file};

/// Export, merge and import driver over a [`LocresCodec`]
#[derive(Debug, Clone)]
pub struct LocresMerger<C> {
    codec: C,
    convention: KeyConvention,
    poll: PollSettings,
    duplicates: DuplicatePolicy,
}

impl<C: LocresCodec> LocresMerger<C> {
    #[must_use]
    pub fn new(codec: C) -> Self {
        Self {
            codec,
            convention: KeyConvention::default(),
            poll: PollSettings::default(),
            duplicates: DuplicatePolicy::default(),
        }
    }

    #[must_use]
    pub fn with_convention(mut self, convention: KeyConvention) -> Self {
        self.convention = convention;
        self
    }

    #[must_use]
    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    #[must_use]
    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    #[must_use]
    pub fn codec(&self) -> &C {
        &self.codec
    }

    #[must_use]
    pub fn convention(&self) -> &KeyConvention {
        &self.convention
    }

    /// Export the full row table of `container`
    ///
    /// The table file the codec writes is always deleted afterwards.
    pub fn export_table(&self, container: &Path) -> Result<LocalizationTable> {
        let container = prepare_container(container)?;
        let table_path = self.codec.table_path(&container);
        let _cleanup = RemoveOnDrop(table_path.clone());

        if table_path.exists() {
            tracing::debug!(table = %table_path.display(), "Removing stale table before export");
            fs::remove_file(&table_path)?;
        }

        self.codec.export(&container)?;

        if !wait_for_file(&table_path, self.poll) {
            tracing::warn!(
                container = %container.display(),
                table = %table_path.display(),
                attempts = self.poll.attempts,
                "Codec exited but the exported table never appeared"
            );
            return Err(Error::OutputTimeout {
                path: table_path,
                attempts: self.poll.attempts,
            });
        }

        let table = read_table(&table_path)?;
        tracing::debug!(
            container = %container.display(),
            rows = table.len(),
            header = table.header.is_some(),
            "Exported localization table"
        );
        Ok(table)
    }

    /// Export `container` as a normalized key to text mapping
    ///
    /// An empty map means the container really has no rows; every failure
    /// is returned as an error instead.
    pub fn export(&self, container: &Path) -> Result<SubtitleMap> {
        let table = self.export_table(container)?;
        Ok(table_to_map(&table, &self.convention))
    }

    /// Merge `overlay` into `container` and import the result
    pub fn merge_and_import(&self, container: &Path, overlay: &SubtitleMap) -> Result<MergeReport> {
        let container = prepare_container(container)?;

        let mut table = self.export_table(&container)?;
        let stats = merge_rows(&mut table, overlay, &self.convention, self.duplicates)?;

        let table_path = self.codec.table_path(&container);
        let _cleanup = RemoveOnDrop(table_path.clone());
        write_table(&table_path, &table)?;

        let imported = self.codec.imported_path(&container);
        if imported.exists() {
            tracing::debug!(path = %imported.display(), "Removing stale imported container");
            fs::remove_file(&imported)?;
        }

        self.codec.import(&container, &table_path)?;

        let import = if wait_for_file(&imported, self.poll) {
            // rename replaces the destination on every supported platform
            fs::rename(&imported, &container)?;
            ImportStatus::Replaced
        } else {
            tracing::warn!(
                container = %container.display(),
                expected = %imported.display(),
                "No imported container appeared; assuming the codec updated it in place"
            );
            ImportStatus::AssumedInPlace
        };

        tracing::info!(
            container = %container.display(),
            replaced = stats.replaced,
            appended = stats.appended,
            ambiguous = stats.ambiguous_keys.len(),
            "Merged subtitle overlay"
        );

        Ok(MergeReport {
            container,
            stats,
            import,
        })
    }
}

/// Map every row with at least two columns to `normalized key -> second column`
///
/// When several rows normalize to the same key an addressable row beats a
/// pass-through row, and otherwise the first one is kept. This is the row
/// [`merge_rows`] edits for that key.
#[must_use]
pub fn table_to_map(table: &LocalizationTable, convention: &KeyConvention) -> SubtitleMap {
    let mut map = SubtitleMap::with_capacity(table.len());
    let mut from_addressable = HashSet::new();

    for row in &table.rows {
        let Some(text) = row.source() else {
            continue;
        };
        let key = convention.normalize(row.key());
        if key.is_empty() {
            continue;
        }
        let addressable = convention.is_addressable(row.key());
        if map.contains_key(key) && (!addressable || from_addressable.contains(key)) {
            tracing::warn!(key, raw = row.key(), "Duplicate normalized key; keeping the first row");
            continue;
        }
        if addressable {
            from_addressable.insert(key);
        }
        map.insert(key.to_string(), text.to_string());
    }

    map
}

/// Apply `overlay` to `table` in place (steps 2 to 4 of the merge)
///
/// * Addressable rows whose key is in the overlay become
///   `key, previous text, overlay text`; rows already showing the overlay
///   text are left alone.
/// * Overlay keys with no addressable row edit pass-through rows whose raw
///   key is exactly the overlay key, so every key [`table_to_map`] hands
///   out can be written back.
/// * Remaining overlay keys are appended as
///   `prefix + key, "", overlay text`, where the prefix is taken from the
///   first addressable row (or the convention's namespace).
/// * Everything else passes through unchanged.
///
/// # Errors
/// With [`DuplicatePolicy::Reject`], an overlay key matching several rows
/// fails with [`Error::AmbiguousKey`] before the table is modified.
pub fn merge_rows(
    table: &mut LocalizationTable,
    overlay: &SubtitleMap,
    convention: &KeyConvention,
    policy: DuplicatePolicy,
) -> Result<MergeStats> {
    let mut stats = MergeStats::default();

    // Overlay keys may arrive raw or normalized; the last spelling wins.
    let mut edits: indexmap::IndexMap<&str, &str> = indexmap::IndexMap::with_capacity(overlay.len());
    for (key, text) in overlay {
        edits.insert(convention.normalize(key), text.as_str());
    }

    let mut index: HashMap<String, Vec<usize>> = HashMap::new();
    let mut loose: HashMap<String, Vec<usize>> = HashMap::new();
    let mut sample_prefix: Option<String> = None;
    for (i, row) in table.rows.iter().enumerate() {
        if !convention.is_addressable(row.key()) {
            stats.passthrough += 1;
            if !row.key().is_empty() {
                loose.entry(row.key().to_string()).or_default().push(i);
            }
            continue;
        }
        let key = convention.normalize(row.key());
        if key.is_empty() {
            stats.passthrough += 1;
            continue;
        }
        if sample_prefix.is_none() {
            sample_prefix = Some(convention.prefix_of(row.key()).to_string());
        }
        index.entry(key.to_string()).or_default().push(i);
    }

    for key in edits.keys() {
        if index.contains_key(*key) {
            continue;
        }
        if let Some(rows) = loose.remove(*key) {
            tracing::debug!(key, "Overlay key matches a row outside the subtitle namespace");
            stats.passthrough -= rows.len();
            index.insert((*key).to_string(), rows);
        }
    }

    for (key, rows) in &index {
        if rows.len() > 1 && edits.contains_key(key.as_str()) {
            if policy == DuplicatePolicy::Reject {
                return Err(Error::AmbiguousKey {
                    key: key.clone(),
                    count: rows.len(),
                });
            }
            tracing::warn!(key = %key, rows = rows.len(), "Overlay key matches several rows; updating all of them");
            stats.ambiguous_keys.push(key.clone());
        }
    }
    stats.ambiguous_keys.sort();

    for rows in index.values() {
        for &i in rows {
            let row = &mut table.rows[i];
            let key = convention.normalize(row.key());
            match edits.get(key) {
                Some(&text) if row.effective_text() == Some(text) => stats.unchanged += 1,
                Some(&text) => {
                    let previous = row.source().unwrap_or_default().to_string();
                    let raw_key = row.key().to_string();
                    *row = TableRow::with_translation(raw_key, previous, text);
                    stats.replaced += 1;
                }
                None => stats.unchanged += 1,
            }
        }
    }

    let prefix = sample_prefix.unwrap_or_else(|| convention.namespace.clone());
    for (key, text) in &edits {
        if key.is_empty() || index.contains_key(*key) {
            continue;
        }
        tracing::debug!(key, prefix = %prefix, "Appending new subtitle row");
        table
            .rows
            .push(TableRow::with_translation(format!("{prefix}{key}"), "", *text));
        stats.appended += 1;
    }

    Ok(stats)
}

fn prepare_container(container: &Path) -> Result<PathBuf> {
    if !container.is_file() {
        return Err(Error::ContainerNotFound(container.to_path_buf()));
    }
    Ok(std::path::absolute(container)?)
}

/// Deletes the intermediate table however the operation ends
struct RemoveOnDrop(PathBuf);

impl Drop for RemoveOnDrop {
    fn drop(&mut self) {
        if self.0.exists() {
            if let Err(e) = fs::remove_file(&self.0) {
                tracing::warn!(path = %self.0.display(), error = %e, "Failed to remove intermediate table");
            }
        }
    }
}
