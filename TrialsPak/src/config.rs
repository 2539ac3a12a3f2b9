//! Persisted toolkit settings
//!
//! Stored as JSON at `<config dir>/TrialsPak/config.json`. Every field has a
//! serde default so older or hand-edited files keep loading.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use trialscore::catalog::DEFAULT_DIALOGUE_PREFIX;
use trialscore::formats::{DEFAULT_NAMESPACE, KeyConvention};
use trialscore::locres::{DuplicatePolicy, LocresMerger};
use trialscore::tools::{
    AudioConverter, LocresTool, PackOptions, PollSettings, RepakTool, DEFAULT_TIMEOUT,
};

use crate::error::{Error, Result};

const CONFIG_DIR_NAME: &str = "TrialsPak";
const CONFIG_FILE_NAME: &str = "config.json";

// Default value functions for serde
fn default_namespace() -> String {
    DEFAULT_NAMESPACE.to_string()
}
fn default_dialogue_prefix() -> String {
    DEFAULT_DIALOGUE_PREFIX.to_string()
}
fn default_languages() -> Vec<String> {
    vec!["English(US)".to_string()]
}
fn default_poll_attempts() -> u32 {
    PollSettings::default().attempts
}
fn default_poll_interval_ms() -> u64 {
    u64::try_from(PollSettings::default().interval.as_millis()).unwrap_or(100)
}
fn default_timeout_secs() -> u64 {
    DEFAULT_TIMEOUT.as_secs()
}

/// Which external tool a path belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ToolKind {
    /// Localization container codec
    Locres,
    /// Audio converter
    Audio,
    /// Pak packer
    Packer,
}

/// Explicit tool locations; unset tools are searched for
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolPaths {
    #[serde(default)]
    pub locres: Option<PathBuf>,
    #[serde(default)]
    pub audio: Option<PathBuf>,
    #[serde(default)]
    pub packer: Option<PathBuf>,
}

impl ToolPaths {
    #[must_use]
    pub fn get(&self, kind: ToolKind) -> Option<&Path> {
        match kind {
            ToolKind::Locres => self.locres.as_deref(),
            ToolKind::Audio => self.audio.as_deref(),
            ToolKind::Packer => self.packer.as_deref(),
        }
    }

    pub fn set(&mut self, kind: ToolKind, path: Option<PathBuf>) {
        match kind {
            ToolKind::Locres => self.locres = path,
            ToolKind::Audio => self.audio = path,
            ToolKind::Packer => self.packer = path,
        }
    }
}

/// Toolkit settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub tools: ToolPaths,
    /// The game's `Content` folder, used as the default scan root
    #[serde(default)]
    pub game_content: Option<PathBuf>,
    /// Asset catalog (`SoundbanksInfo.json`) used for audio renaming
    #[serde(default)]
    pub catalog: Option<PathBuf>,
    #[serde(default = "default_namespace")]
    pub namespace: String,
    #[serde(default = "default_dialogue_prefix")]
    pub dialogue_prefix: String,
    /// Languages accepted into the dialogue index
    #[serde(default = "default_languages")]
    pub languages: Vec<String>,
    /// Refuse merges where one key matches several rows
    #[serde(default)]
    pub strict_duplicates: bool,
    #[serde(default)]
    pub pack: PackOptions,
    #[serde(default = "default_poll_attempts")]
    pub poll_attempts: u32,
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    #[serde(default = "default_timeout_secs")]
    pub tool_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            tools: ToolPaths::default(),
            game_content: None,
            catalog: None,
            namespace: default_namespace(),
            dialogue_prefix: default_dialogue_prefix(),
            languages: default_languages(),
            strict_duplicates: false,
            pack: PackOptions::default(),
            poll_attempts: default_poll_attempts(),
            poll_interval_ms: default_poll_interval_ms(),
            tool_timeout_secs: default_timeout_secs(),
        }
    }
}

impl Settings {
    /// Location of the settings file, if the platform has a config dir
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
    }

    /// Load from the default location, falling back to defaults
    #[must_use]
    pub fn load() -> Self {
        let Some(path) = Self::config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        match Self::load_from(&path) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Ignoring unreadable settings");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Save to the default location
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()
            .ok_or_else(|| Error::Config("no configuration directory on this platform".into()))?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        tracing::debug!(path = %path.display(), "Saved settings");
        Ok(())
    }

    #[must_use]
    pub fn convention(&self) -> KeyConvention {
        KeyConvention::new(self.namespace.clone())
    }

    #[must_use]
    pub fn poll(&self) -> PollSettings {
        PollSettings::new(self.poll_attempts, Duration::from_millis(self.poll_interval_ms))
    }

    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.tool_timeout_secs)
    }

    #[must_use]
    pub fn duplicate_policy(&self) -> DuplicatePolicy {
        if self.strict_duplicates {
            DuplicatePolicy::Reject
        } else {
            DuplicatePolicy::Warn
        }
    }

    /// A merge engine over the configured codec
    pub fn merger(&self) -> Result<LocresMerger<LocresTool>> {
        let tool = LocresTool::locate(self.tools.locres.as_deref())?.with_timeout(self.timeout());
        Ok(LocresMerger::new(tool)
            .with_convention(self.convention())
            .with_poll(self.poll())
            .with_duplicate_policy(self.duplicate_policy()))
    }

    pub fn audio_converter(&self) -> Result<AudioConverter> {
        Ok(AudioConverter::locate(self.tools.audio.as_deref())?
            .with_timeout(self.timeout())
            .with_poll(self.poll()))
    }

    pub fn packer(&self) -> Result<RepakTool> {
        Ok(RepakTool::locate(self.tools.packer.as_deref())?.with_poll(self.poll()))
    }
}
