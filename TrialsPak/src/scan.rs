//! Bulk subtitle scan
//!
//! Exports every container under a folder so their subtitles can be
//! searched together. Exports run in parallel; a stop flag is checked
//! before each container so a scan can be abandoned part way.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::thread::{self, JoinHandle};

use rayon::prelude::*;
use trialscore::locres::{LocresMerger, SubtitleMap};
use trialscore::tools::LocresCodec;
use walkdir::WalkDir;

use crate::error::{Error, Result};

/// Progress of a running scan
#[derive(Debug, Clone)]
pub struct ScanProgress {
    /// Containers finished so far, including this one
    pub current: usize,
    pub total: usize,
    pub container: PathBuf,
}

/// Subtitles exported from one container
#[derive(Debug, Clone)]
pub struct ScanEntry {
    pub container: PathBuf,
    pub subtitles: SubtitleMap,
}

/// A container that could not be exported
#[derive(Debug)]
pub struct ScanFailure {
    pub container: PathBuf,
    pub error: trialscore::Error,
}

/// Result of a scan, in input order
#[derive(Debug, Default)]
pub struct ScanReport {
    pub entries: Vec<ScanEntry>,
    pub failures: Vec<ScanFailure>,
    /// Whether the stop flag ended the scan early
    pub cancelled: bool,
}

/// One search hit across scanned containers
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanHit<'a> {
    pub container: &'a Path,
    pub key: &'a str,
    pub text: &'a str,
}

impl ScanReport {
    /// Total subtitles across all exported containers
    #[must_use]
    pub fn subtitle_count(&self) -> usize {
        self.entries.iter().map(|e| e.subtitles.len()).sum()
    }

    /// Subtitles whose key or text contains `query`, case-insensitively
    #[must_use]
    pub fn search(&self, query: &str, limit: usize) -> Vec<ScanHit<'_>> {
        let query = query.to_lowercase();
        self.entries
            .iter()
            .flat_map(|entry| {
                entry.subtitles.iter().map(move |(key, text)| ScanHit {
                    container: entry.container.as_path(),
                    key: key.as_str(),
                    text: text.as_str(),
                })
            })
            .filter(|hit| {
                hit.key.to_lowercase().contains(&query) || hit.text.to_lowercase().contains(&query)
            })
            .take(limit)
            .collect()
    }
}

/// Find all `.locres` containers under `dir`, sorted
pub fn find_containers<P: AsRef<Path>>(dir: P) -> Vec<PathBuf> {
    let mut containers: Vec<_> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(std::result::Result::ok)
        .filter(|e| {
            e.file_type().is_file()
                && e.path()
                    .extension()
                    .is_some_and(|ext| ext.eq_ignore_ascii_case("locres"))
        })
        .map(walkdir::DirEntry::into_path)
        .collect();

    containers.sort();
    containers
}

/// Export `containers` until done or `stop` is set
pub fn scan_containers<C, F>(
    merger: &LocresMerger<C>,
    containers: &[PathBuf],
    stop: &AtomicBool,
    progress: F,
) -> ScanReport
where
    C: LocresCodec,
    F: Fn(&ScanProgress) + Send + Sync,
{
    let processed = AtomicUsize::new(0);
    let total = containers.len();

    let results: Vec<Option<(PathBuf, trialscore::Result<SubtitleMap>)>> = containers
        .par_iter()
        .map(|container| {
            if stop.load(Ordering::SeqCst) {
                return None;
            }
            let result = merger.export(container);

            let current = processed.fetch_add(1, Ordering::SeqCst) + 1;
            progress(&ScanProgress {
                current,
                total,
                container: container.clone(),
            });
            Some((container.clone(), result))
        })
        .collect();

    let mut report = ScanReport::default();
    for result in results {
        match result {
            Some((container, Ok(subtitles))) => report.entries.push(ScanEntry { container, subtitles }),
            Some((container, Err(error))) => {
                tracing::warn!(container = %container.display(), error = %error, "Skipping container");
                report.failures.push(ScanFailure { container, error });
            }
            None => report.cancelled = true,
        }
    }

    tracing::info!(
        scanned = report.entries.len(),
        failed = report.failures.len(),
        subtitles = report.subtitle_count(),
        cancelled = report.cancelled,
        "Subtitle scan finished"
    );
    report
}

/// A scan running on its own thread
///
/// The container list is a snapshot taken at spawn time.
pub struct ScanHandle {
    stop: Arc<AtomicBool>,
    thread: JoinHandle<ScanReport>,
}

impl ScanHandle {
    pub fn spawn<C, F>(merger: LocresMerger<C>, containers: Vec<PathBuf>, progress: F) -> Self
    where
        C: LocresCodec + 'static,
        F: Fn(&ScanProgress) + Send + Sync + 'static,
    {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&stop);
        let thread = thread::spawn(move || scan_containers(&merger, &containers, &flag, progress));
        Self { stop, thread }
    }

    /// Ask the scan to stop after the containers already in flight
    pub fn cancel(&self) {
        self.stop.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.thread.is_finished()
    }

    /// Wait for the scan and take its report
    pub fn join(self) -> Result<ScanReport> {
        self.thread
            .join()
            .map_err(|_| Error::Worker("subtitle scan thread panicked".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_find_containers() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir_all(dir.path().join("Game/en")).unwrap();
        fs::write(dir.path().join("Game/en/Game.locres"), "").unwrap();
        fs::write(dir.path().join("B.LOCRES"), "").unwrap();
        fs::write(dir.path().join("Game.csv"), "").unwrap();

        assert_eq!(
            find_containers(dir.path()),
            vec![dir.path().join("B.LOCRES"), dir.path().join("Game/en/Game.locres")]
        );
    }

    /// Copies the container to its table after a delay
    struct SlowCodec(std::time::Duration);

    impl LocresCodec for SlowCodec {
        fn export(&self, container: &Path) -> trialscore::Result<()> {
            thread::sleep(self.0);
            fs::copy(container, self.table_path(container))?;
            Ok(())
        }

        fn import(&self, _: &Path, _: &Path) -> trialscore::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_cancel_mid_scan() {
        let dir = tempfile::tempdir().unwrap();
        let total = rayon::current_num_threads() * 4 + 8;
        for i in 0..total {
            fs::write(dir.path().join(format!("C{i:03}.locres")), "Subtitles/VO_A,a\n").unwrap();
        }
        let containers = find_containers(dir.path());
        assert_eq!(containers.len(), total);

        let merger = LocresMerger::new(SlowCodec(std::time::Duration::from_millis(30)));
        let (tx, rx) = std::sync::mpsc::channel();
        let handle = ScanHandle::spawn(merger, containers.clone(), move |p: &ScanProgress| {
            let _ = tx.send(p.current);
        });

        assert_eq!(rx.recv().unwrap(), 1);
        handle.cancel();
        let report = handle.join().unwrap();

        assert!(report.cancelled);
        assert!(report.failures.is_empty());
        assert!(!report.entries.is_empty());
        assert!(report.entries.len() < total);
        assert!(
            report
                .entries
                .iter()
                .all(|e| containers.contains(&e.container) && e.subtitles.len() == 1)
        );
    }

    #[test]
    fn test_search_report() {
        let subtitles: SubtitleMap = [("VO_Door_01", "Open the door"), ("VO_Run", "Run!")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let report = ScanReport {
            entries: vec![ScanEntry {
                container: PathBuf::from("Game.locres"),
                subtitles,
            }],
            ..ScanReport::default()
        };

        let hits = report.search("door", 10);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].key, "VO_Door_01");
        assert_eq!(report.search("vo_", 1).len(), 1);
    }
}
