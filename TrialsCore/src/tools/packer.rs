//! Pak archive packer
//!
//! `repak pack --version V11 --compression Zlib MyMod_P` writes `MyMod_P.pak`
//! beside the folder.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::discovery::{PACKER_TOOL, locate_tool};
use super::poll::{PollSettings, wait_for_file};
use super::process::ToolCommand;
use super::with_suffix;
use crate::error::{Error, Result};

/// Packing an entire mod can take a while
pub const PACK_TIMEOUT: Duration = Duration::from_secs(120);

fn default_version() -> String {
    "V11".to_string()
}

fn default_compression() -> String {
    "Zlib".to_string()
}

/// Archive format options passed to the packer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackOptions {
    /// Pak version understood by the game (UE 4.27 reads `V11`)
    #[serde(default = "default_version")]
    pub version: String,
    /// Compression algorithm name
    #[serde(default = "default_compression")]
    pub compression: String,
}

impl Default for PackOptions {
    fn default() -> Self {
        Self {
            version: default_version(),
            compression: default_compression(),
        }
    }
}

/// Something that turns a staged folder into an archive
pub trait Packer: Send + Sync {
    /// Pack `folder`, returning the archive path
    fn pack(&self, folder: &Path, options: &PackOptions) -> Result<PathBuf>;
}

/// Path of the archive produced for `folder`
#[must_use]
pub fn archive_path_for(folder: &Path) -> PathBuf {
    with_suffix(folder, ".pak")
}

/// The external packer executable
#[derive(Debug, Clone)]
pub struct RepakTool {
    executable: PathBuf,
    timeout: Duration,
    poll: PollSettings,
}

impl RepakTool {
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: PACK_TIMEOUT,
            poll: PollSettings::default(),
        }
    }

    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        locate_tool(PACKER_TOOL, configured).map(Self::new)
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
}

impl Packer for RepakTool {
    fn pack(&self, folder: &Path, options: &PackOptions) -> Result<PathBuf> {
        if !folder.is_dir() {
            return Err(Error::InvalidPath(folder.display().to_string()));
        }

        ToolCommand::new(&self.executable)
            .arg("pack")
            .arg("--version")
            .arg(&options.version)
            .arg("--compression")
            .arg(&options.compression)
            .arg(folder)
            .timeout(self.timeout)
            .run()?
            .ensure_success()?;

        let archive = archive_path_for(folder);
        if !wait_for_file(&archive, self.poll) {
            return Err(Error::OutputTimeout {
                path: archive,
                attempts: self.poll.attempts,
            });
        }
        tracing::info!(archive = %archive.display(), "Packed mod archive");
        Ok(archive)
    }
}
