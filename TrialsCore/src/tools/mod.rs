//! External tool plumbing
//!
//! The toolkit coordinates three closed-source command-line tools:
//! a localization codec, an audio converter and a pak packer. Each is
//! treated as an opaque executable with fixed argument conventions; exit
//! status is the only success signal.

pub mod audio;
pub mod discovery;
pub mod locres;
pub mod packer;
pub mod poll;
pub mod process;

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub use audio::{AudioConverter, AudioInfo, parse_audio_info};
pub use discovery::{AUDIO_TOOL, LOCRES_TOOL, PACKER_TOOL, locate_tool};
pub use locres::{IMPORTED_SUFFIX, LocresCodec, LocresTool};
pub use packer::{PackOptions, Packer, RepakTool, archive_path_for};
pub use poll::{PollSettings, wait_for_file};
pub use process::{DEFAULT_TIMEOUT, ToolCommand, ToolOutput, run_tool};

/// Append `suffix` to the full file name (`Game.locres` -> `Game.locres.new`)
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}
