//! Locating the external executables

use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Localization codec (`export` / `import` of `.locres` containers)
pub const LOCRES_TOOL: &str = "UnrealLocres";
/// Audio converter (`-m` metadata query, `-o` conversion)
pub const AUDIO_TOOL: &str = "vgmstream-cli";
/// Pak archive packer
pub const PACKER_TOOL: &str = "repak";

/// Find an executable
///
/// Search order:
/// 1. The configured path, if one is set (a missing configured file is an error)
/// 2. Next to the running executable, or in a `tools/` folder beside it
/// 3. `PATH`
pub fn locate_tool(name: &str, configured: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = configured {
        if path.is_file() {
            return Ok(path.to_path_buf());
        }
        return Err(Error::ToolNotFound {
            name: path.display().to_string(),
        });
    }

    let file_name = executable_name(name);
    if let Some(dir) = std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        for candidate in [dir.join(&file_name), dir.join("tools").join(&file_name)] {
            if candidate.is_file() {
                tracing::debug!(tool = name, path = %candidate.display(), "Found bundled tool");
                return Ok(candidate);
            }
        }
    }

    which::which(name).map_err(|_| Error::ToolNotFound {
        name: name.to_string(),
    })
}

fn executable_name(name: &str) -> String {
    if cfg!(windows) && !name.to_ascii_lowercase().ends_with(".exe") {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_configured_path_wins() {
        let dir = tempfile::tempdir().unwrap();
        let tool = dir.path().join("UnrealLocres.exe");
        std::fs::write(&tool, "").unwrap();
        assert_eq!(locate_tool(LOCRES_TOOL, Some(&tool)).unwrap(), tool);
    }

    #[test]
    fn test_missing_configured_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = locate_tool(PACKER_TOOL, Some(&dir.path().join("repak"))).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }

    #[test]
    fn test_unknown_tool_is_not_found() {
        let err = locate_tool("trialspak-no-such-tool-x9", None).unwrap_err();
        assert!(matches!(err, Error::ToolNotFound { .. }));
    }
}
