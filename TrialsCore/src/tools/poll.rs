//! Bounded polling for tool output files
//!
//! Process exit is the real completion signal. Some tools still publish
//! their output file slightly after exiting, so callers poll for it with a
//! fixed number of attempts before treating it as missing.

use std::path::Path;
use std::thread;
use std::time::Duration;

/// How long to wait for an output file to appear
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Number of existence checks (at least one is always made)
    pub attempts: u32,
    /// Sleep between checks
    pub interval: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            attempts: 50,
            interval: Duration::from_millis(100),
        }
    }
}

impl PollSettings {
    #[must_use]
    pub fn new(attempts: u32, interval: Duration) -> Self {
        Self { attempts, interval }
    }

    /// A single check with no waiting
    #[must_use]
    pub fn immediate() -> Self {
        Self {
            attempts: 1,
            interval: Duration::ZERO,
        }
    }

    /// Upper bound on the time spent polling
    #[must_use]
    pub fn budget(&self) -> Duration {
        self.interval * self.attempts.saturating_sub(1)
    }
}

/// Wait until `path` exists or the attempts run out
///
/// # Returns
/// `true` if the file was seen
pub fn wait_for_file(path: &Path, settings: PollSettings) -> bool {
    let attempts = settings.attempts.max(1);
    for attempt in 1..=attempts {
        if path.exists() {
            if attempt > 1 {
                tracing::debug!(
                    path = %path.display(),
                    attempt,
                    "Tool output appeared after polling"
                );
            }
            return true;
        }
        if attempt < attempts {
            thread::sleep(settings.interval);
        }
    }
    tracing::debug!(path = %path.display(), attempts, "Tool output never appeared");
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_existing_file_is_seen_immediately() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.csv");
        std::fs::write(&path, "x").unwrap();
        assert!(wait_for_file(&path, PollSettings::immediate()));
    }

    #[test]
    fn test_missing_file_gives_up() {
        let dir = tempfile::tempdir().unwrap();
        let settings = PollSettings::new(3, Duration::from_millis(5));
        assert!(!wait_for_file(&dir.path().join("never"), settings));
        assert_eq!(settings.budget(), Duration::from_millis(10));
    }

    #[test]
    fn test_late_file_is_seen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("late.new");
        let writer_path = path.clone();
        let writer = thread::spawn(move || {
            thread::sleep(Duration::from_millis(50));
            std::fs::write(writer_path, "done").unwrap();
        });
        assert!(wait_for_file(&path, PollSettings::new(100, Duration::from_millis(10))));
        writer.join().unwrap();
    }
}
