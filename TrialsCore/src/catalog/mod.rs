//! Audio asset catalog
//!
//! The game's build metadata lists every Wwise audio asset with its numeric
//! ID. Mods override an asset by shipping a file named after that ID, so
//! loosely named source files have to be matched back to the catalog.
//!
//! Two JSON shapes are accepted: a flat array of entries, or the Wwise
//! `SoundbanksInfo` layout with its two partitions:
//!
//! ```json
//! { "SoundBanksInfo": {
//!     "StreamedFiles": [ { "Id": "12345", "ShortName": "VO_Door_01.wav", "Language": "English(US)" } ],
//!     "MediaFilesNotInAnyBank": [ { "Id": "777", "ShortName": "Door_Open_01.wav", "Language": "SFX" } ]
//! } }
//! ```

mod index;
mod resolver;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Deserializer, Serialize};
use walkdir::WalkDir;

use crate::error::{Error, Result};

pub use index::{CatalogIndex, DEFAULT_DIALOGUE_PREFIX};
pub use resolver::{
    FallbackRule, Resolution, file_basename, resolve, strip_hex_suffix, strip_last_segment,
    unique_destination,
};

/// Language value the catalog uses for non-localized assets
pub const SFX_LANGUAGE: &str = "SFX";

/// Extensions treated as audio when scanning folders
pub const AUDIO_EXTENSIONS: &[&str] = &["wem", "wav", "ogg"];

/// The two partitions of the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum CatalogPartition {
    /// Streamed media referenced by soundbanks
    #[default]
    StreamedFiles,
    /// Loose media not packed into any bank
    MediaFilesNotInAnyBank,
}

/// One audio asset as cataloged by the build metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetCatalogEntry {
    /// Numeric ID in string form
    #[serde(rename = "Id", deserialize_with = "id_from_string_or_number")]
    pub id: String,
    /// Original file name, with extension
    #[serde(rename = "ShortName")]
    pub short_name: String,
    /// Language, absent for non-localized assets
    #[serde(rename = "Language", default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(rename = "Source", default)]
    pub source: CatalogPartition,
}

impl AssetCatalogEntry {
    #[must_use]
    pub fn new(id: impl Into<String>, short_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            short_name: short_name.into(),
            language: None,
            source: CatalogPartition::default(),
        }
    }

    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    #[must_use]
    pub fn with_source(mut self, source: CatalogPartition) -> Self {
        self.source = source;
        self
    }

    /// `ShortName` without directories or extension
    #[must_use]
    pub fn basename(&self) -> &str {
        file_basename(&self.short_name)
    }

    /// Language used for filtering; absent means [`SFX_LANGUAGE`]
    #[must_use]
    pub fn language_key(&self) -> &str {
        self.language.as_deref().unwrap_or(SFX_LANGUAGE)
    }

    #[must_use]
    pub fn is_localized(&self) -> bool {
        !self.language_key().eq_ignore_ascii_case(SFX_LANGUAGE)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdRepr {
    Text(String),
    Number(u64),
}

fn id_from_string_or_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Text(s) => s,
        IdRepr::Number(n) => n.to_string(),
    })
}

#[derive(Deserialize)]
struct SoundBanksInfo {
    #[serde(rename = "StreamedFiles", default)]
    streamed: Vec<AssetCatalogEntry>,
    #[serde(rename = "MediaFilesNotInAnyBank", default)]
    loose: Vec<AssetCatalogEntry>,
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CatalogDocument {
    Flat(Vec<AssetCatalogEntry>),
    Wwise {
        #[serde(rename = "SoundBanksInfo")]
        info: SoundBanksInfo,
    },
}

/// Parse catalog JSON
pub fn parse_catalog(json: &str) -> Result<Vec<AssetCatalogEntry>> {
    let document: CatalogDocument =
        serde_json::from_str(json).map_err(|e| Error::InvalidCatalog(e.to_string()))?;

    Ok(match document {
        CatalogDocument::Flat(entries) => entries,
        CatalogDocument::Wwise { info } => info
            .streamed
            .into_iter()
            .map(|e| e.with_source(CatalogPartition::StreamedFiles))
            .chain(
                info.loose
                    .into_iter()
                    .map(|e| e.with_source(CatalogPartition::MediaFilesNotInAnyBank)),
            )
            .collect(),
    })
}

/// Load the catalog from a metadata file
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<AssetCatalogEntry>> {
    let path = path.as_ref();
    let json = std::fs::read_to_string(path)?;
    let entries = parse_catalog(&json)?;
    tracing::info!(path = %path.display(), entries = entries.len(), "Loaded asset catalog");
    Ok(entries)
}

/// Find audio files under `dir`, sorted
pub fn find_audio_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).follow_links(true) {
        let entry = entry?;
        let is_audio = entry.file_type().is_file()
            && entry.path().extension().is_some_and(|ext| {
                let ext = ext.to_string_lossy().to_lowercase();
                AUDIO_EXTENSIONS.contains(&ext.as_str())
            });
        if is_audio {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flat_catalog() {
        let entries = parse_catalog(
            r#"[{"Id": "12345", "ShortName": "VO_Door_01.wav"},
                {"Id": 777, "ShortName": "SFX\\Door_Open_01.wav", "Language": "SFX",
                 "Source": "MediaFilesNotInAnyBank"}]"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].basename(), "VO_Door_01");
        assert!(!entries[0].is_localized());
        assert_eq!(entries[1].id, "777");
        assert_eq!(entries[1].basename(), "Door_Open_01");
        assert_eq!(entries[1].source, CatalogPartition::MediaFilesNotInAnyBank);
    }

    #[test]
    fn test_parse_wwise_catalog() {
        let entries = parse_catalog(
            r#"{"SoundBanksInfo": {
                "StreamedFiles": [{"Id": "1", "ShortName": "VO_A.wav", "Language": "English(US)"}],
                "MediaFilesNotInAnyBank": [{"Id": "2", "ShortName": "Rain.wav", "Language": "SFX"}]
            }}"#,
        )
        .unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].source, CatalogPartition::StreamedFiles);
        assert!(entries[0].is_localized());
        assert_eq!(entries[1].source, CatalogPartition::MediaFilesNotInAnyBank);
    }

    #[test]
    fn test_invalid_catalog() {
        let err = parse_catalog(r#"{"Banks": []}"#).unwrap_err();
        assert!(matches!(err, Error::InvalidCatalog(_)));
    }

    #[test]
    fn test_find_audio_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub/b.WEM"), "").unwrap();
        std::fs::write(dir.path().join("a.wav"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();

        let files = find_audio_files(dir.path()).unwrap();
        assert_eq!(files, vec![dir.path().join("a.wav"), dir.path().join("sub/b.WEM")]);
    }
}
