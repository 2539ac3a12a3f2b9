//! Localization codec tool
//!
//! The codec converts a binary `.locres` container to a row table and back:
//!
//! ```text
//! UnrealLocres export Game.locres            -> Game.csv
//! UnrealLocres import Game.locres Game.csv   -> Game.locres.new
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use super::discovery::{LOCRES_TOOL, locate_tool};
use super::process::{DEFAULT_TIMEOUT, ToolCommand};
use super::with_suffix;
use crate::error::Result;
use crate::formats::TABLE_EXTENSION;

/// Suffix the codec appends to the container it writes on import
pub const IMPORTED_SUFFIX: &str = ".new";

/// A localization container codec
///
/// Implementations only run the conversion; waiting for and swapping the
/// output files is done by the merge engine so every codec gets the same
/// bookkeeping.
pub trait LocresCodec: Send + Sync {
    /// Write the table for `container` at [`LocresCodec::table_path`]
    fn export(&self, container: &Path) -> Result<()>;

    /// Build a new container from `table`, written at [`LocresCodec::imported_path`]
    /// or over `container` in place
    fn import(&self, container: &Path, table: &Path) -> Result<()>;

    /// Where `export` writes the table
    fn table_path(&self, container: &Path) -> PathBuf {
        container.with_extension(TABLE_EXTENSION)
    }

    /// Where `import` writes the new container
    fn imported_path(&self, container: &Path) -> PathBuf {
        with_suffix(container, IMPORTED_SUFFIX)
    }
}

/// The external codec executable
#[derive(Debug, Clone)]
pub struct LocresTool {
    executable: PathBuf,
    timeout: Duration,
}

impl LocresTool {
    #[must_use]
    pub fn new(executable: impl Into<PathBuf>) -> Self {
        Self {
            executable: executable.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Find the codec via the configured path, the bundle folder or `PATH`
    pub fn locate(configured: Option<&Path>) -> Result<Self> {
        locate_tool(LOCRES_TOOL, configured).map(Self::new)
    }

    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[must_use]
    pub fn executable(&self) -> &Path {
        &self.executable
    }

    fn command(&self, container: &Path) -> ToolCommand {
        let mut command = ToolCommand::new(&self.executable).timeout(self.timeout);
        // Relative container paths are resolved against our own working directory
        if container.is_absolute() {
            if let Some(dir) = container.parent() {
                command = command.current_dir(dir);
            }
        }
        command
    }
}

impl LocresCodec for LocresTool {
    fn export(&self, container: &Path) -> Result<()> {
        let output = self
            .command(container)
            .arg("export")
            .arg(container)
            .run()?
            .ensure_success()?;
        tracing::debug!(stdout = %output.stdout.trim(), "Locres export output");
        Ok(())
    }

    fn import(&self, container: &Path, table: &Path) -> Result<()> {
        let output = self
            .command(container)
            .arg("import")
            .arg(container)
            .arg(table)
            .run()?
            .ensure_success()?;
        tracing::debug!(stdout = %output.stdout.trim(), "Locres import output");
        Ok(())
    }
}
