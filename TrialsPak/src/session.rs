//! Subtitle editing session
//!
//! A session exports a container once, tracks edits in memory and merges
//! only the modified entries back on save.

use std::fs;
use std::path::{Path, PathBuf};

use indexmap::IndexMap;
use trialscore::formats::{KeyConvention, LocalizationTable, TableRow, parse_table, write_table};
use trialscore::locres::{LocresMerger, MergeReport, SubtitleMap};
use trialscore::tools::LocresCodec;

use crate::error::{Error, Result};

/// One subtitle as seen by the editor
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    pub key: String,
    /// Text in the container when the session was loaded or last saved;
    /// `None` for keys the container does not have yet
    pub original: Option<String>,
    pub current: String,
}

impl SubtitleEntry {
    #[must_use]
    pub fn is_modified(&self) -> bool {
        self.original.as_deref() != Some(self.current.as_str())
    }
}

/// Editable view of one container's subtitles
#[derive(Debug, Clone)]
pub struct SubtitleSession {
    container: PathBuf,
    convention: KeyConvention,
    entries: IndexMap<String, SubtitleEntry>,
}

impl SubtitleSession {
    /// Export `container` and start a session over its subtitles
    pub fn load<C: LocresCodec>(merger: &LocresMerger<C>, container: &Path) -> Result<Self> {
        let exported = merger.export(container)?;
        let entries = exported
            .into_iter()
            .map(|(key, text)| {
                let entry = SubtitleEntry {
                    key: key.clone(),
                    original: Some(text.clone()),
                    current: text,
                };
                (key, entry)
            })
            .collect();

        Ok(Self {
            container: container.to_path_buf(),
            convention: merger.convention().clone(),
            entries,
        })
    }

    #[must_use]
    pub fn container(&self) -> &Path {
        &self.container
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Current text for `key`; raw container keys are accepted too
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entry(key).map(|e| e.current.as_str())
    }

    #[must_use]
    pub fn entry(&self, key: &str) -> Option<&SubtitleEntry> {
        self.entries.get(self.convention.normalize(key))
    }

    pub fn entries(&self) -> impl Iterator<Item = &SubtitleEntry> {
        self.entries.values()
    }

    /// Set the text for `key`, adding the key if the container lacks it
    pub fn set(&mut self, key: &str, text: impl Into<String>) {
        let key = self.convention.normalize(key);
        let text = text.into();
        match self.entries.get_mut(key) {
            Some(entry) => entry.current = text,
            None => {
                tracing::debug!(key, "Adding subtitle key not present in container");
                self.entries.insert(
                    key.to_string(),
                    SubtitleEntry {
                        key: key.to_string(),
                        original: None,
                        current: text,
                    },
                );
            }
        }
    }

    /// Set every key of `overlay`
    pub fn apply(&mut self, overlay: &SubtitleMap) {
        for (key, text) in overlay {
            self.set(key, text.clone());
        }
    }

    /// Undo edits to `key`; added keys are dropped
    pub fn revert(&mut self, key: &str) -> Result<()> {
        let key = self.convention.normalize(key);
        let entry = self
            .entries
            .get_mut(key)
            .ok_or_else(|| Error::UnknownKey(key.to_string()))?;
        if let Some(original) = entry.original.clone() {
            entry.current = original;
        } else {
            self.entries.shift_remove(key);
        }
        Ok(())
    }

    pub fn revert_all(&mut self) {
        self.entries.retain(|_, e| e.original.is_some());
        for entry in self.entries.values_mut() {
            if let Some(original) = &entry.original {
                entry.current.clone_from(original);
            }
        }
    }

    #[must_use]
    pub fn is_modified(&self, key: &str) -> bool {
        self.entry(key).is_some_and(SubtitleEntry::is_modified)
    }

    #[must_use]
    pub fn modified_keys(&self) -> Vec<&str> {
        self.entries
            .values()
            .filter(|e| e.is_modified())
            .map(|e| e.key.as_str())
            .collect()
    }

    /// Modified entries only, in session order
    #[must_use]
    pub fn overlay(&self) -> SubtitleMap {
        self.entries
            .values()
            .filter(|e| e.is_modified())
            .map(|e| (e.key.clone(), e.current.clone()))
            .collect()
    }

    /// Entries whose key or text contains `query`, case-insensitively
    pub fn search<'a>(&'a self, query: &str) -> impl Iterator<Item = &'a SubtitleEntry> + 'a {
        let query = query.to_lowercase();
        self.entries.values().filter(move |e| {
            e.key.to_lowercase().contains(&query) || e.current.to_lowercase().contains(&query)
        })
    }

    /// Merge the modified entries into the container
    ///
    /// On success the saved text becomes the new baseline; on failure the
    /// session is left as it was.
    pub fn save<C: LocresCodec>(&mut self, merger: &LocresMerger<C>) -> Result<MergeReport> {
        let overlay = self.overlay();
        let report = merger.merge_and_import(&self.container, &overlay)?;
        for entry in self.entries.values_mut() {
            entry.original = Some(entry.current.clone());
        }
        Ok(report)
    }
}

/// Read an overlay file
///
/// `.json` files hold an object of `key: text`; anything else is read as a
/// two-column row table.
pub fn load_overlay(path: &Path) -> Result<SubtitleMap> {
    let content = fs::read_to_string(path)?;
    let invalid = |message: String| Error::InvalidOverlay {
        path: path.to_path_buf(),
        message,
    };

    if is_json(path) {
        return serde_json::from_str(&content).map_err(|e| invalid(e.to_string()));
    }

    let table = parse_table(&content).map_err(|e| invalid(e.to_string()))?;
    let mut overlay = SubtitleMap::with_capacity(table.len());
    for row in &table.rows {
        let Some(text) = row.source() else {
            return Err(invalid(format!("row '{}' has no text column", row.key())));
        };
        overlay.insert(row.key().to_string(), text.to_string());
    }
    Ok(overlay)
}

/// Write an overlay file in the format its extension selects
pub fn save_overlay(path: &Path, overlay: &SubtitleMap) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    if is_json(path) {
        fs::write(path, serde_json::to_string_pretty(overlay)?)?;
        return Ok(());
    }

    let mut table = LocalizationTable::new();
    table.rows = overlay
        .iter()
        .map(|(key, text)| TableRow::new(key.clone(), text.clone()))
        .collect();
    write_table(path, &table)?;
    Ok(())
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn session() -> SubtitleSession {
        let entries = [("VO_A", "one"), ("VO_B", "two")]
            .into_iter()
            .map(|(k, v)| {
                (
                    k.to_string(),
                    SubtitleEntry {
                        key: k.to_string(),
                        original: Some(v.to_string()),
                        current: v.to_string(),
                    },
                )
            })
            .collect();
        SubtitleSession {
            container: PathBuf::from("Game.locres"),
            convention: KeyConvention::default(),
            entries,
        }
    }

    #[test]
    fn test_edit_tracking() {
        let mut s = session();
        assert!(s.modified_keys().is_empty());

        s.set("VO_B", "changed");
        s.set("VO_New", "added");
        s.set("Subtitles/VO_A", "one");
        assert_eq!(s.modified_keys(), vec!["VO_B", "VO_New"]);
        assert_eq!(s.get("/VO_B"), Some("changed"));
        assert_eq!(s.get("VO_B"), Some("changed"));
        assert!(!s.is_modified("VO_A"));

        let overlay = s.overlay();
        assert_eq!(overlay.len(), 2);
        assert_eq!(overlay.get("VO_New").map(String::as_str), Some("added"));
    }

    #[test]
    fn test_revert() {
        let mut s = session();
        s.set("VO_A", "x");
        s.set("VO_New", "y");

        s.revert("VO_New").unwrap();
        assert!(s.get("VO_New").is_none());
        s.revert("VO_A").unwrap();
        assert_eq!(s.get("VO_A"), Some("one"));
        assert!(matches!(s.revert("VO_Missing"), Err(Error::UnknownKey(_))));

        s.set("VO_B", "z");
        s.set("VO_Other", "w");
        s.revert_all();
        assert!(s.overlay().is_empty());
        assert_eq!(s.len(), 2);
    }

    #[test]
    fn test_search() {
        let s = session();
        let hits: Vec<_> = s.search("TWO").map(|e| e.key.as_str()).collect();
        assert_eq!(hits, vec!["VO_B"]);
    }

    #[test]
    fn test_overlay_files() {
        let dir = tempfile::tempdir().unwrap();
        let overlay: SubtitleMap = [("VO_A", "Say \"hi\", then go")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();

        let json = dir.path().join("lines.json");
        save_overlay(&json, &overlay).unwrap();
        assert_eq!(load_overlay(&json).unwrap(), overlay);

        let csv = dir.path().join("lines.csv");
        save_overlay(&csv, &overlay).unwrap();
        assert_eq!(load_overlay(&csv).unwrap(), overlay);
    }

    #[test]
    fn test_bad_overlay() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "[1, 2]").unwrap();
        assert!(matches!(load_overlay(&path), Err(Error::InvalidOverlay { .. })));

        let path = dir.path().join("bad.csv");
        fs::write(&path, "VO_A\n").unwrap();
        assert!(matches!(load_overlay(&path), Err(Error::InvalidOverlay { .. })));
    }
}
