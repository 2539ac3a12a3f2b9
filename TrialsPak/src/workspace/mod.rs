//! Mod project workspace
//!
//! A project directory holds a manifest, loose source audio and a subtitle
//! overlay; building it stages and packs everything under the output dir.

pub mod project;

use std::fs;
use std::path::Path;

use trialscore::locres::SubtitleMap;

pub use project::{BuildSettings, MANIFEST_FILE, ProjectManifest, ProjectMeta};

use crate::error::Result;
use crate::session::save_overlay;

/// Folder for source audio inside a project
pub const AUDIO_DIR: &str = "audio";

/// Subtitle overlay file inside a project
pub const OVERLAY_FILE: &str = "subtitles.json";

/// Create a new project skeleton in `project_dir`
///
/// 1. Creates the project root and the `audio/` folder
/// 2. Writes an empty subtitle overlay unless one exists
/// 3. Writes `trialspak.toml`
pub fn init_project(project_dir: &Path, manifest: &ProjectManifest) -> Result<()> {
    fs::create_dir_all(project_dir.join(AUDIO_DIR))?;

    let overlay = project_dir.join(OVERLAY_FILE);
    if !overlay.exists() {
        save_overlay(&overlay, &SubtitleMap::new())?;
    }

    let manifest_path = manifest.save(project_dir)?;
    tracing::info!(
        project = %manifest.project.name,
        manifest = %manifest_path.display(),
        "Initialized mod project"
    );
    Ok(())
}
