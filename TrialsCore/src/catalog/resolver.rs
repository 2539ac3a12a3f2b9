//! Matching file names to catalog IDs
//!
//! Rules, in order:
//! 1. exact basename match
//! 2. basename with a trailing `_xxxxxxxx` hex token removed
//!    (`VO_Door_01_a1b2c3d4.wem` -> `VO_Door_01`)
//! 3. effects only: basename with its last `_` segment removed
//!
//! A miss is reported as [`Resolution::NoMatch`]; callers keep the original
//! file name, which means the file will not override anything in game.

use std::path::{Path, PathBuf};

use super::CatalogIndex;

/// Length of the hex disambiguation token appended by some exporters
const HEX_TOKEN_LEN: usize = 8;

/// Which fallback rule produced a match
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackRule {
    /// A trailing 8-character hex token was removed
    HexSuffix,
    /// The last underscore-delimited segment was removed
    TrimmedSegment,
}

impl FallbackRule {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::HexSuffix => "hex suffix",
            Self::TrimmedSegment => "trimmed segment",
        }
    }
}

/// Result of resolving one file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    Exact { id: String },
    Fallback {
        id: String,
        rule: FallbackRule,
        /// The catalog name that matched
        matched: String,
    },
    NoMatch,
}

impl Resolution {
    /// The resolved ID, if any
    #[must_use]
    pub fn id(&self) -> Option<&str> {
        match self {
            Self::Exact { id } | Self::Fallback { id, .. } => Some(id),
            Self::NoMatch => None,
        }
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        !matches!(self, Self::NoMatch)
    }
}

/// Resolve `filename` against `index`
#[must_use]
pub fn resolve(filename: &str, index: &CatalogIndex) -> Resolution {
    let basename = file_basename(filename);
    let tables = index.tables_for(basename);

    if let Some(id) = tables.iter().find_map(|t| t.get(basename)) {
        return Resolution::Exact { id: id.clone() };
    }

    if let Some(stripped) = strip_hex_suffix(basename) {
        if let Some(id) = tables.iter().find_map(|t| t.get(stripped)) {
            tracing::debug!(filename, matched = stripped, "Resolved by hex-suffix fallback");
            return Resolution::Fallback {
                id: id.clone(),
                rule: FallbackRule::HexSuffix,
                matched: stripped.to_string(),
            };
        }
    }

    if !index.is_dialogue(basename) {
        if let Some(trimmed) = strip_last_segment(basename) {
            if let Some(id) = index.effects.get(trimmed) {
                tracing::debug!(filename, matched = trimmed, "Resolved by trimmed-segment fallback");
                return Resolution::Fallback {
                    id: id.clone(),
                    rule: FallbackRule::TrimmedSegment,
                    matched: trimmed.to_string(),
                };
            }
        }
    }

    tracing::warn!(filename, "No catalog match; original name will be kept");
    Resolution::NoMatch
}

/// File name without directories (either separator) or extension
#[must_use]
pub fn file_basename(name: &str) -> &str {
    let file = name.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(name);
    match file.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => file,
    }
}

/// Remove a trailing `_` + 8 hex digits
#[must_use]
pub fn strip_hex_suffix(basename: &str) -> Option<&str> {
    let (head, tail) = basename.rsplit_once('_')?;
    let is_token = tail.len() == HEX_TOKEN_LEN && tail.bytes().all(|b| b.is_ascii_hexdigit());
    (is_token && !head.is_empty()).then_some(head)
}

/// Remove the last `_`-delimited segment
#[must_use]
pub fn strip_last_segment(basename: &str) -> Option<&str> {
    basename
        .rsplit_once('_')
        .map(|(head, _)| head)
        .filter(|head| !head.is_empty())
}

/// A path in `dir` named `stem.ext` that does not exist yet
///
/// Taken names get a numeric disambiguator: `12345.wem`, `12345_1.wem`,
/// `12345_2.wem`, ...
#[must_use]
pub fn unique_destination(dir: &Path, stem: &str, ext: &str) -> PathBuf {
    let name = |suffix: Option<usize>| {
        let stem = match suffix {
            Some(n) => format!("{stem}_{n}"),
            None => stem.to_string(),
        };
        if ext.is_empty() {
            stem
        } else {
            format!("{stem}.{ext}")
        }
    };

    let first = dir.join(name(None));
    if !first.exists() {
        return first;
    }
    let mut n = 1;
    loop {
        let candidate = dir.join(name(Some(n)));
        if !candidate.exists() {
            return candidate;
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AssetCatalogEntry;
    use crate::catalog::index::DEFAULT_DIALOGUE_PREFIX;

    fn index() -> CatalogIndex {
        let entries = vec![
            AssetCatalogEntry::new("12345", "VO_Door_01.wav"),
            AssetCatalogEntry::new("500", "Footstep_Concrete.wav"),
        ];
        CatalogIndex::build(&entries, &["English(US)"], DEFAULT_DIALOGUE_PREFIX)
    }

    #[test]
    fn test_exact_match() {
        assert_eq!(
            resolve("VO_Door_01.wav", &index()),
            Resolution::Exact { id: "12345".into() }
        );
    }

    #[test]
    fn test_hex_suffix_fallback() {
        let resolution = resolve("VO_Door_01_a1b2c3d4.wem", &index());
        assert_eq!(
            resolution,
            Resolution::Fallback {
                id: "12345".into(),
                rule: FallbackRule::HexSuffix,
                matched: "VO_Door_01".into(),
            }
        );
        assert_eq!(resolution.id(), Some("12345"));
    }

    #[test]
    fn test_trimmed_segment_is_effects_only() {
        assert_eq!(
            resolve("Footstep_Concrete_Var3.wem", &index()).id(),
            Some("500")
        );
        assert_eq!(resolve("VO_Door_01_extra.wem", &index()), Resolution::NoMatch);
    }

    #[test]
    fn test_miss() {
        let resolution = resolve("Completely_Unknown.wem", &index());
        assert_eq!(resolution, Resolution::NoMatch);
        assert!(resolution.id().is_none());
    }

    #[test]
    fn test_name_helpers() {
        assert_eq!(file_basename("C:\\audio\\VO_A.wem"), "VO_A");
        assert_eq!(file_basename("dir/VO_A"), "VO_A");
        assert_eq!(file_basename(".hidden"), ".hidden");
        assert_eq!(strip_hex_suffix("VO_A_DEADBEEF"), Some("VO_A"));
        assert_eq!(strip_hex_suffix("VO_A_deadbeefa"), None);
        assert_eq!(strip_hex_suffix("VO_A_zzzzzzzz"), None);
        assert_eq!(strip_hex_suffix("_deadbeef"), None);
        assert_eq!(strip_last_segment("Rain_Loop_02"), Some("Rain_Loop"));
        assert_eq!(strip_last_segment("Rain"), None);
    }

    #[test]
    fn test_unique_destination() {
        let dir = tempfile::tempdir().unwrap();
        let first = unique_destination(dir.path(), "12345", "wem");
        assert_eq!(first, dir.path().join("12345.wem"));
        std::fs::write(&first, "a").unwrap();

        let second = unique_destination(dir.path(), "12345", "wem");
        assert_eq!(second, dir.path().join("12345_1.wem"));
        std::fs::write(&second, "b").unwrap();

        assert_eq!(
            unique_destination(dir.path(), "12345", "wem"),
            dir.path().join("12345_2.wem")
        );
    }
}
