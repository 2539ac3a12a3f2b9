//! Audio converter tool
//!
//! Game audio ships as Wwise `.wem` files. The converter answers metadata
//! queries and decodes to `.wav`:
//!
//! ```text
//! vgmstream-cli -m VO_Door_01.wem
//! vgmstream-cli VO_Door_01.wem -o VO_Door_01.wav
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::discovery::{AUDIO_TOOL, locate_tool};
use super::poll::{PollSettings, wait_for_file};
use super::process::{DEFAULT_TIMEOUT, ToolCommand};
use crate::error::{Error, Result};

/// Stream properties reported by the metadata query
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AudioInfo {
    pub sample_rate: Option<u32>,
    pub channels: Option<u16>,
    pub total_samples: Option<u64>,
    /// Codec description, e.g. `Custom Vorbis`
    pub encoding: Option<String>,
}

impl AudioInfo {
    /// Stream length, when both the sample count and rate are known
    #[must_use]
    pub fn duration(&self) -> Option<Duration> {
        match (self.total_samples, self.sample_rate) {
            (Some(samples), Some(rate)) if rate > 0 => {
                let rate = u64::from(rate);
                // remainder * 1e9 stays below u64::MAX for any u32 rate
                let nanos = (samples % rate) * 1_000_000_000 / rate;
                Some(Duration::from_secs(samples / rate) + Duration::from_nanos(nanos))
            }
            _ => None,
        }
    }
}

/// Scan the labeled lines of a metadata query
///
/// Lines look like `sample rate: 48000 Hz` or
/// `stream total samples: 123456 (0:02.572 seconds)`. Unknown labels are ignored.
#[must_use]
pub fn parse_audio_info(text: &str) -> AudioInfo {
    let mut info = AudioInfo::default();

    for line in text.lines() {
        let Some((label, value)) = line.split_once(':') else {
            continue;
        };
        let value = value.trim();
        let first_number = value.split_whitespace().next().unwrap_or("");

        match label.trim().to_ascii_lowercase().as_str() {
            "sample rate" => info.sample_rate = first_number.parse().ok(),
            "channels" => info.channels = first_number.parse().ok(),
            "stream total samples" => info.total_samples = first_number.parse().ok(),
            "encoding" => info.encoding = Some(value.to_string()),
            _ => {}
        }
    }

    info
}

/// The external audio converter
#[derive(Debug, Clone)]
pub struct AudioConverter {
    executable: PathBuf,
    timeout: Duration,
    poll: PollSettings,
}

impl AudioConverter {
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: DEFAULT_TIMEOUT,
            poll: PollSettings::default(),
        }
    }

    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        locate_tool(AUDIO_TOOL, configured).map(Self::new)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn with_poll(mut self, poll: PollSettings) -> Self {
        self.poll = poll;
        self
    }

    /// Query stream properties of `file`
    pub fn query_info(&self, file: &Path) -> Result<AudioInfo> {
        if !file.exists() {
            return Err(Error::InvalidPath(file.display().to_string()));
        }

        let output = ToolCommand::new(&self.executable)
            .arg("-m")
            .arg(file)
            .timeout(self.timeout)
            .run()?
            .ensure_success()?;

        let info = parse_audio_info(&output.stdout);
        if info.sample_rate.is_none() {
            return Err(Error::AudioInfoUnavailable {
                path: file.to_path_buf(),
                message: "no 'sample rate' line in converter output".to_string(),
            });
        }
        Ok(info)
    }

    /// Decode `file` into `output`
    pub fn convert(&self, file: &Path, output: &Path) -> Result<()> {
        if !file.exists() {
            return Err(Error::InvalidPath(file.display().to_string()));
        }
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        ToolCommand::new(&self.executable)
            .arg(file)
            .arg("-o")
            .arg(output)
            .timeout(self.timeout)
            .run()?
            .ensure_success()?;

        if !wait_for_file(output, self.poll) {
            tracing::warn!(output = %output.display(), "Converter exited cleanly but wrote no output");
            return Err(Error::OutputTimeout {
                path: output.to_path_buf(),
                attempts: self.poll.attempts,
            });
        }
        tracing::debug!(source = %file.display(), output = %output.display(), "Converted audio");
        Ok(())
    }
}
