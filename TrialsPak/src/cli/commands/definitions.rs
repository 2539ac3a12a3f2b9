//! Subcommand enum definitions for CLI

use clap::Subcommand;
use std::path::PathBuf;

use crate::config::ToolKind;

/// Subtitle container commands
#[derive(Subcommand)]
pub enum LocaCommands {
    /// Export all subtitles from a container
    Export {
        /// Container file (.locres)
        container: PathBuf,

        /// Write to an overlay file (.json or .csv) instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the text of one subtitle key
    Get {
        /// Container file (.locres)
        container: PathBuf,

        /// Subtitle key (e.g. VO_Door_01)
        key: String,
    },

    /// Set the text of one subtitle key and write the container
    Set {
        /// Container file (.locres)
        container: PathBuf,

        /// Subtitle key (e.g. VO_Door_01)
        key: String,

        /// New subtitle text
        text: String,
    },

    /// Merge an overlay file into a container
    Apply {
        /// Container file (.locres)
        container: PathBuf,

        /// Overlay file: JSON object or two-column table
        overlay: PathBuf,

        /// Report what would change without writing
        #[arg(long)]
        dry_run: bool,
    },

    /// Search subtitles across every container under a folder
    Search {
        /// Text to search for in keys and subtitles
        query: String,

        /// Folder to scan (defaults to the configured game content folder)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// Maximum results to return
        #[arg(short, long, default_value = "50")]
        limit: usize,

        /// Suppress progress bar
        #[arg(short, long)]
        quiet: bool,
    },
}

/// Audio asset commands
#[derive(Subcommand)]
pub enum AudioCommands {
    /// Show stream properties of an audio file
    Info {
        /// Audio file (.wem)
        path: PathBuf,
    },

    /// Decode an audio file to WAV
    Convert {
        /// Audio file (.wem)
        source: PathBuf,

        /// Output file (defaults to the source with a .wav extension)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Show which asset ID each file would be staged as
    Resolve {
        /// Audio files or folders
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Asset catalog (defaults to the configured catalog)
        #[arg(short, long)]
        catalog: Option<PathBuf>,

        /// Dialogue language filter, repeatable (defaults to the configured languages)
        #[arg(short, long)]
        language: Vec<String>,
    },
}

/// Mod project commands
#[derive(Subcommand)]
pub enum ModCommands {
    /// Stage project audio (and optionally subtitles) into the mod folder
    Stage {
        /// Project directory containing trialspak.toml
        #[arg(short, long, default_value = ".")]
        project: PathBuf,

        /// Game container to copy into the mod and merge the project overlay into
        #[arg(long)]
        container: Option<PathBuf>,

        /// Asset catalog (defaults to the configured catalog)
        #[arg(long)]
        catalog: Option<PathBuf>,
    },

    /// Pack the staged mod folder into a patch archive
    Pack {
        /// Project directory containing trialspak.toml
        #[arg(short, long, default_value = ".")]
        project: PathBuf,
    },
}

/// Settings commands
#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Print the current settings
    Show,

    /// Print the settings file location
    Path,

    /// Set (or clear) the path of an external tool
    SetTool {
        /// Which tool
        #[arg(value_enum)]
        tool: ToolKind,

        /// Executable path; omit to search for the tool again
        path: Option<PathBuf>,
    },

    /// Set the asset catalog used for audio renaming
    SetCatalog {
        /// Catalog file (SoundbanksInfo.json)
        path: PathBuf,
    },

    /// Create a new mod project
    InitProject {
        /// Project directory
        dir: PathBuf,

        /// Mod name (defaults to the directory name)
        #[arg(short, long)]
        name: Option<String>,
    },
}
