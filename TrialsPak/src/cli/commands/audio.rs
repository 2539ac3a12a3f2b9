//! CLI commands for audio assets

use std::path::{Path, PathBuf};

use anyhow::Context;
use trialscore::catalog::{CatalogIndex, Resolution, find_audio_files, load_catalog, resolve};

use crate::cli::progress::{SPEAKER, simple_spinner};
use crate::config::Settings;

/// Show stream properties of an audio file
pub fn info(path: &Path) -> anyhow::Result<()> {
    let converter = Settings::load().audio_converter()?;
    let info = converter.query_info(path)?;

    println!("{}{}", SPEAKER, path.display());
    if let Some(rate) = info.sample_rate {
        println!("  Sample rate: {rate} Hz");
    }
    if let Some(channels) = info.channels {
        println!("  Channels:    {channels}");
    }
    if let Some(samples) = info.total_samples {
        println!("  Samples:     {samples}");
    }
    if let Some(duration) = info.duration() {
        println!("  Duration:    {:.3}s", duration.as_secs_f64());
    }
    if let Some(encoding) = &info.encoding {
        println!("  Encoding:    {encoding}");
    }
    Ok(())
}

/// Decode an audio file to WAV
pub fn convert(source: &Path, output: Option<&Path>) -> anyhow::Result<()> {
    let converter = Settings::load().audio_converter()?;
    let output = output.map_or_else(|| source.with_extension("wav"), Path::to_path_buf);

    let pb = simple_spinner(&format!("Converting {}", source.display()));
    let result = converter.convert(source, &output);
    pb.finish_and_clear();
    result?;

    println!("Wrote {}", output.display());
    Ok(())
}

/// Show the asset ID each file resolves to
pub fn resolve_files(paths: &[PathBuf], catalog: Option<&Path>, languages: &[String]) -> anyhow::Result<()> {
    let settings = Settings::load();
    let index = build_index(&settings, catalog, languages)?;

    let mut files = Vec::new();
    for path in paths {
        if path.is_dir() {
            files.extend(find_audio_files(path)?);
        } else {
            files.push(path.clone());
        }
    }

    let mut unmatched = 0usize;
    for file in &files {
        let name = file.to_string_lossy();
        match resolve(&name, &index) {
            Resolution::Exact { id } => println!("{id}\t{}", file.display()),
            Resolution::Fallback { id, rule, matched } => {
                println!("{id}\t{}\t({} -> {matched})", file.display(), rule.as_str());
            }
            Resolution::NoMatch => {
                unmatched += 1;
                println!("-\t{}\t(no match)", file.display());
            }
        }
    }
    println!();
    println!("{} files, {} unmatched", files.len(), unmatched);
    Ok(())
}

/// Load the catalog and build the lookup tables
pub(crate) fn build_index(
    settings: &Settings,
    catalog: Option<&Path>,
    languages: &[String],
) -> anyhow::Result<CatalogIndex> {
    let catalog = catalog
        .or(settings.catalog.as_deref())
        .context("no catalog given and none configured (see `config set-catalog`)")?;
    let entries = load_catalog(catalog)?;
    let languages = if languages.is_empty() {
        settings.languages.as_slice()
    } else {
        languages
    };
    Ok(CatalogIndex::build(&entries, languages, &settings.dialogue_prefix))
}
