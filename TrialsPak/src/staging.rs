//! Mod staging
//!
//! Builds the folder tree the game expects inside a patch archive:
//!
//! ```text
//! <root>/OPP/Content/WwiseAudio/Windows/<id>.wem
//! <root>/OPP/Content/WwiseAudio/Windows/<language>/<id>.wem
//! <root>/OPP/Content/Localization/<category>/<culture>/<category>.locres
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use trialscore::catalog::{CatalogIndex, Resolution, file_basename, resolve, unique_destination};

use crate::error::Result;

/// Suffix the game requires on patch archives
pub const PATCH_SUFFIX: &str = "_P";

/// Top-level project folder inside the game's content tree
pub const DEFAULT_PROJECT: &str = "OPP";

const AUDIO_SUBDIR: &str = "Content/WwiseAudio/Windows";
const LOCALIZATION_SUBDIR: &str = "Content/Localization";
const CONTAINER_EXTENSION: &str = "locres";

/// `name` with the patch suffix, added only when missing
#[must_use]
pub fn patch_folder_name(name: &str) -> String {
    if name.ends_with(PATCH_SUFFIX) {
        name.to_string()
    } else {
        format!("{name}{PATCH_SUFFIX}")
    }
}

/// Where staged files go
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModLayout {
    /// Staging folder; its name becomes the archive name
    pub root: PathBuf,
    pub project: String,
    pub audio_subdir: PathBuf,
    pub localization_subdir: PathBuf,
}

impl ModLayout {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            project: DEFAULT_PROJECT.to_string(),
            audio_subdir: PathBuf::from(AUDIO_SUBDIR),
            localization_subdir: PathBuf::from(LOCALIZATION_SUBDIR),
        }
    }

    fn project_dir(&self) -> PathBuf {
        self.root.join(&self.project)
    }

    /// Folder for localized dialogue audio
    #[must_use]
    pub fn dialogue_dir(&self, language: &str) -> PathBuf {
        self.effects_dir().join(language)
    }

    /// Folder for non-localized audio
    #[must_use]
    pub fn effects_dir(&self) -> PathBuf {
        self.project_dir().join(&self.audio_subdir)
    }

    /// Path of a localization container
    #[must_use]
    pub fn container_path(&self, category: &str, culture: &str) -> PathBuf {
        self.project_dir()
            .join(&self.localization_subdir)
            .join(category)
            .join(culture)
            .join(format!("{category}.{CONTAINER_EXTENSION}"))
    }
}

/// One file copied into the staging tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedFile {
    pub source: PathBuf,
    pub destination: PathBuf,
    pub resolution: Resolution,
}

/// Result of [`stage_audio`]
#[derive(Debug, Clone, Default)]
pub struct StagingReport {
    pub files: Vec<StagedFile>,
}

impl StagingReport {
    #[must_use]
    pub fn matched(&self) -> usize {
        self.files.iter().filter(|f| f.resolution.is_match()).count()
    }

    /// Files staged under their original name
    pub fn unmatched(&self) -> impl Iterator<Item = &StagedFile> {
        self.files.iter().filter(|f| !f.resolution.is_match())
    }
}

/// Copy `files` into the staging tree, renamed to their catalog IDs
///
/// Dialogue goes under the `language` folder, everything else in the
/// effects folder. A file with no catalog match keeps its original name.
/// Existing files are never overwritten.
pub fn stage_audio(
    files: &[PathBuf],
    index: &CatalogIndex,
    layout: &ModLayout,
    language: &str,
) -> Result<StagingReport> {
    let mut report = StagingReport::default();

    for source in files {
        let name = source.to_string_lossy();
        let basename = file_basename(&name);
        let resolution = resolve(&name, index);

        let dir = if index.is_dialogue(basename) {
            layout.dialogue_dir(language)
        } else {
            layout.effects_dir()
        };
        fs::create_dir_all(&dir)?;

        let stem = resolution.id().unwrap_or(basename);
        let ext = source
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        let destination = unique_destination(&dir, stem, &ext);
        fs::copy(source, &destination)?;

        if resolution.is_match() {
            tracing::debug!(source = %source.display(), destination = %destination.display(), "Staged audio");
        } else {
            tracing::warn!(
                source = %source.display(),
                "Staged without an asset ID; this file will not override game audio"
            );
        }

        report.files.push(StagedFile {
            source: source.clone(),
            destination,
            resolution,
        });
    }

    tracing::info!(
        staged = report.files.len(),
        matched = report.matched(),
        root = %layout.root.display(),
        "Staged audio files"
    );
    Ok(report)
}

/// Copy an edited container into the staging tree, replacing any earlier copy
pub fn stage_container(
    container: &Path,
    layout: &ModLayout,
    category: &str,
    culture: &str,
) -> Result<PathBuf> {
    if !container.is_file() {
        return Err(trialscore::Error::ContainerNotFound(container.to_path_buf()).into());
    }
    let destination = layout.container_path(category, culture);
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(container, &destination)?;
    tracing::info!(destination = %destination.display(), "Staged localization container");
    Ok(destination)
}
