//! Preview conversion
//!
//! Game audio cannot be played directly, so previews are decoded to `.wav`
//! in a cache folder. Playback itself is left to the caller.

use std::collections::hash_map::DefaultHasher;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver};
use std::thread;

use trialscore::tools::AudioConverter;

use crate::error::Result;

/// Something that decodes game audio to a playable file
pub trait PreviewConverter: Send + Sync {
    fn convert(&self, source: &Path, output: &Path) -> trialscore::Result<()>;
}

impl PreviewConverter for AudioConverter {
    fn convert(&self, source: &Path, output: &Path) -> trialscore::Result<()> {
        AudioConverter::convert(self, source, output)
    }
}

/// Cache path for the preview of `source`
///
/// The name carries a hash of the full source path so files sharing a
/// name in different folders do not share a preview.
#[must_use]
pub fn preview_path(cache_dir: &Path, source: &Path) -> PathBuf {
    let stem = source
        .file_stem()
        .map_or_else(|| "preview".to_string(), |s| s.to_string_lossy().into_owned());
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    cache_dir.join(format!("{stem}_{:016x}.wav", hasher.finish()))
}

/// Decode `source` into the cache, reusing an up-to-date earlier result
pub fn convert_for_preview<C: PreviewConverter + ?Sized>(
    converter: &C,
    source: &Path,
    cache_dir: &Path,
) -> Result<PathBuf> {
    let output = preview_path(cache_dir, source);
    if is_fresh(&output, source) {
        tracing::debug!(output = %output.display(), "Using cached preview");
        return Ok(output);
    }

    fs::create_dir_all(cache_dir)?;
    converter.convert(source, &output)?;
    Ok(output)
}

/// Run [`convert_for_preview`] on a background thread
///
/// The receiver yields exactly one result. There is no cancellation; the
/// converter's own timeout bounds the work.
pub fn spawn_conversion<C: PreviewConverter + ?Sized + 'static>(
    converter: Arc<C>,
    source: PathBuf,
    cache_dir: PathBuf,
) -> Receiver<Result<PathBuf>> {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let result = convert_for_preview(converter.as_ref(), &source, &cache_dir);
        if let Err(e) = &result {
            tracing::warn!(source = %source.display(), error = %e, "Preview conversion failed");
        }
        // the caller may have stopped listening
        let _ = tx.send(result);
    });
    rx
}

fn is_fresh(output: &Path, source: &Path) -> bool {
    let modified = |p: &Path| fs::metadata(p).and_then(|m| m.modified()).ok();
    match (modified(output), modified(source)) {
        (Some(out), Some(src)) => out >= src,
        _ => false,
    }
}
