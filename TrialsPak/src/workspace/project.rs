//! Project manifest types for trialspak.toml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use trialscore::tools::PackOptions;

use crate::error::Result;
use crate::staging::{ModLayout, patch_folder_name};

/// File name of the manifest in a project root
pub const MANIFEST_FILE: &str = "trialspak.toml";

fn default_language() -> String {
    "English(US)".to_string()
}

fn default_category() -> String {
    "Game".to_string()
}

fn default_culture() -> String {
    "en".to_string()
}

fn default_output_dir() -> String {
    "build".to_string()
}

/// The full project manifest (trialspak.toml)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectManifest {
    pub project: ProjectMeta,
    #[serde(default)]
    pub build: BuildSettings,
}

/// Mod project metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMeta {
    pub name: String,
    /// Staging folder and archive name, without the `_P` suffix
    pub folder: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub description: String,
    /// Audio language folder dialogue is staged under
    #[serde(default = "default_language")]
    pub language: String,
    /// Localization category (`Game` ships the subtitles)
    #[serde(default = "default_category")]
    pub category: String,
    /// Localization culture folder
    #[serde(default = "default_culture")]
    pub culture: String,
}

/// Build configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildSettings {
    #[serde(default = "default_output_dir")]
    pub output_dir: String,
    #[serde(flatten)]
    pub pack: PackOptions,
}

impl Default for BuildSettings {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            pack: PackOptions::default(),
        }
    }
}

impl ProjectManifest {
    /// A manifest with defaults; the folder is the name without whitespace
    #[must_use]
    pub fn new(name: &str) -> Self {
        let folder: String = name.split_whitespace().collect();
        Self {
            project: ProjectMeta {
                name: name.to_string(),
                folder,
                author: String::new(),
                description: String::new(),
                language: default_language(),
                category: default_category(),
                culture: default_culture(),
            },
            build: BuildSettings::default(),
        }
    }

    /// Read `trialspak.toml` from `project_dir`
    pub fn load(project_dir: &Path) -> Result<Self> {
        let content = fs::read_to_string(project_dir.join(MANIFEST_FILE))?;
        Ok(toml::from_str(&content)?)
    }

    /// Write `trialspak.toml` into `project_dir`
    pub fn save(&self, project_dir: &Path) -> Result<PathBuf> {
        let path = project_dir.join(MANIFEST_FILE);
        fs::write(&path, toml::to_string_pretty(self)?)?;
        Ok(path)
    }

    /// Staging folder name, with the `_P` suffix
    #[must_use]
    pub fn pak_name(&self) -> String {
        patch_folder_name(&self.project.folder)
    }

    /// Staging layout for this project rooted under its output dir
    #[must_use]
    pub fn layout(&self, project_dir: &Path) -> ModLayout {
        ModLayout::new(
            project_dir
                .join(&self.build.output_dir)
                .join(self.pak_name()),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let mut manifest = ProjectManifest::new("Spooky Door Lines");
        manifest.project.author = "ModderName".to_string();
        manifest.build.pack.compression = "None".to_string();
        manifest.save(dir.path()).unwrap();

        let parsed = ProjectManifest::load(dir.path()).unwrap();
        assert_eq!(parsed.project.folder, "SpookyDoorLines");
        assert_eq!(parsed.project.category, "Game");
        assert_eq!(parsed.build.pack.version, "V11");
        assert_eq!(parsed.build.pack.compression, "None");
        assert_eq!(parsed, manifest);
    }

    #[test]
    fn test_minimal_manifest() {
        let parsed: ProjectManifest =
            toml::from_str("[project]\nname = \"Door\"\nfolder = \"Door\"\n").unwrap();
        assert_eq!(parsed.pak_name(), "Door_P");
        assert_eq!(parsed.build.output_dir, "build");
        assert_eq!(
            parsed.layout(Path::new("/mods/door")).root,
            PathBuf::from("/mods/door/build/Door_P")
        );
    }
}
