//! CLI commands for mod projects

use std::path::Path;
use std::time::Instant;

use anyhow::Context;
use trialscore::catalog::find_audio_files;

use super::audio::build_index;
use crate::cli::progress::{
    DISK, GEAR, LOOKING_GLASS, PACKAGE, print_done, print_step, print_warning, simple_spinner,
};
use crate::config::Settings;
use crate::packaging::package_mod;
use crate::session::load_overlay;
use crate::staging::{stage_audio, stage_container};
use crate::workspace::{AUDIO_DIR, OVERLAY_FILE, ProjectManifest};

/// Stage project audio and subtitles into the mod folder
pub fn stage(project: &Path, container: Option<&Path>, catalog: Option<&Path>) -> anyhow::Result<()> {
    let start = Instant::now();
    let settings = Settings::load();
    let manifest = ProjectManifest::load(project)
        .with_context(|| format!("no project manifest in {}", project.display()))?;
    let layout = manifest.layout(project);
    let steps = if container.is_some() { 3 } else { 2 };

    print_step(1, steps, LOOKING_GLASS, "Loading asset catalog...");
    let index = build_index(&settings, catalog, std::slice::from_ref(&manifest.project.language))?;

    print_step(2, steps, GEAR, "Staging audio...");
    let audio_dir = project.join(AUDIO_DIR);
    let files = if audio_dir.is_dir() {
        find_audio_files(&audio_dir)?
    } else {
        Vec::new()
    };
    let report = stage_audio(&files, &index, &layout, &manifest.project.language)?;
    println!("  {} files staged, {} matched to asset IDs", report.files.len(), report.matched());
    for file in report.unmatched() {
        print_warning(&format!(
            "{} has no asset ID and will not replace game audio",
            file.source.display()
        ));
    }

    if let Some(container) = container {
        print_step(3, steps, DISK, "Staging subtitles...");
        let staged = stage_container(
            container,
            &layout,
            &manifest.project.category,
            &manifest.project.culture,
        )?;
        let overlay_path = project.join(OVERLAY_FILE);
        if overlay_path.exists() {
            let overlay = load_overlay(&overlay_path)?;
            if !overlay.is_empty() {
                let merger = settings.merger()?;
                let merged = merger.merge_and_import(&staged, &overlay)?;
                println!(
                    "  {} subtitles replaced, {} added",
                    merged.stats.replaced, merged.stats.appended
                );
            }
        }
    }

    println!("Staged into {}", layout.root.display());
    print_done(start.elapsed());
    Ok(())
}

/// Pack the staged mod folder
pub fn pack(project: &Path) -> anyhow::Result<()> {
    let start = Instant::now();
    let settings = Settings::load();
    let manifest = ProjectManifest::load(project)
        .with_context(|| format!("no project manifest in {}", project.display()))?;
    let mut layout = manifest.layout(project);
    let packer = settings.packer()?;

    print_step(1, 1, PACKAGE, "Packing...");
    let pb = simple_spinner(&format!("{}", layout.root.display()));
    let archive = package_mod(&mut layout, &packer, &manifest.project.folder, &manifest.build.pack);
    pb.finish_and_clear();
    let archive = archive?;

    println!("Created {}", archive.display());
    print_done(start.elapsed());
    Ok(())
}
