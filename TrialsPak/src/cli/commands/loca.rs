//! CLI commands for subtitle containers

use std::path::Path;
use std::sync::atomic::AtomicBool;
use std::time::Instant;

use anyhow::Context;
use trialscore::locres::{ImportStatus, MergeReport};

use crate::cli::progress::{
    DISK, GEAR, LOOKING_GLASS, print_done, print_step, print_warning, simple_bar, simple_spinner,
};
use crate::config::Settings;
use crate::scan::{find_containers, scan_containers};
use crate::session::{SubtitleSession, load_overlay, save_overlay};

/// Print every subtitle, or write them to an overlay file
pub fn export(container: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let merger = Settings::load().merger()?;
    let pb = simple_spinner(&format!("Exporting {}", container.display()));
    let subtitles = merger.export(container);
    pb.finish_and_clear();
    let subtitles = subtitles?;

    match output {
        Some(path) => {
            save_overlay(path, &subtitles)?;
            println!("Wrote {} subtitles to {}", subtitles.len(), path.display());
        }
        None => {
            for (key, text) in &subtitles {
                println!("{key}\t{}", text.replace('\n', "\\n"));
            }
        }
    }
    Ok(())
}

/// Print the text of one key
pub fn get(container: &Path, key: &str) -> anyhow::Result<()> {
    let merger = Settings::load().merger()?;
    let session = SubtitleSession::load(&merger, container)?;
    let text = session
        .get(key)
        .with_context(|| format!("no subtitle '{key}' in {}", container.display()))?;
    println!("{text}");
    Ok(())
}

/// Change one key and write the container
pub fn set(container: &Path, key: &str, text: &str) -> anyhow::Result<()> {
    let merger = Settings::load().merger()?;
    let mut session = SubtitleSession::load(&merger, container)?;
    if session.entry(key).is_none() {
        print_warning(&format!("'{key}' is a new key; a row will be added"));
    }
    session.set(key, text);
    let report = session.save(&merger)?;
    print_report(&report);
    Ok(())
}

/// Merge an overlay file into a container
pub fn apply(container: &Path, overlay_path: &Path, dry_run: bool) -> anyhow::Result<()> {
    let start = Instant::now();
    let settings = Settings::load();
    let merger = settings.merger()?;

    print_step(1, 3, LOOKING_GLASS, "Reading overlay...");
    let overlay = load_overlay(overlay_path)?;

    print_step(2, 3, GEAR, "Comparing with container...");
    let mut session = SubtitleSession::load(&merger, container)?;
    session.apply(&overlay);
    let modified = session.modified_keys();
    println!("  {} of {} overlay keys change the container", modified.len(), overlay.len());

    if dry_run {
        for key in modified {
            println!("  {key}");
        }
        return Ok(());
    }

    print_step(3, 3, DISK, "Importing...");
    let report = session.save(&merger)?;
    print_report(&report);
    print_done(start.elapsed());
    Ok(())
}

/// Search subtitles across all containers under a folder
pub fn search(query: &str, dir: Option<&Path>, limit: usize, quiet: bool) -> anyhow::Result<()> {
    let settings = Settings::load();
    let dir = dir
        .map(Path::to_path_buf)
        .or_else(|| settings.game_content.clone())
        .context("no folder given and no game content folder configured")?;
    let merger = settings.merger()?;

    let containers = find_containers(&dir);
    if containers.is_empty() {
        println!("No .locres containers found under {}", dir.display());
        return Ok(());
    }

    let pb = simple_bar(containers.len() as u64, "Scanning");
    if quiet {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    let stop = AtomicBool::new(false);
    let report = scan_containers(&merger, &containers, &stop, |p| {
        pb.set_position(p.current as u64);
    });
    pb.finish_and_clear();

    for failure in &report.failures {
        print_warning(&format!("{}: {}", failure.container.display(), failure.error));
    }

    let hits = report.search(query, limit);
    if hits.is_empty() {
        println!("No subtitles found containing '{query}'");
        return Ok(());
    }
    if !quiet {
        println!("Found {} matches in {} containers:", hits.len(), report.entries.len());
        println!();
    }
    for hit in hits {
        println!("{}  {}", hit.key, hit.container.display());
        if !quiet {
            println!("  {}", hit.text.replace('\n', "\\n"));
        }
    }
    Ok(())
}

fn print_report(report: &MergeReport) {
    let stats = &report.stats;
    println!(
        "Updated {}: {} replaced, {} added, {} unchanged",
        report.container.display(),
        stats.replaced,
        stats.appended,
        stats.unchanged
    );
    for key in &stats.ambiguous_keys {
        print_warning(&format!("'{key}' matched several rows; all were updated"));
    }
    if report.import == ImportStatus::AssumedInPlace {
        print_warning("the codec wrote no .new file; assuming it updated the container in place");
    }
}
