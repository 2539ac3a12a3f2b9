//! Error types for `TrialsCore`

use std::path::PathBuf;

use thiserror::Error;

/// The error type for `TrialsCore` operations.
#[non_exhaustive]
#[derive(Error, Debug)]
pub enum Error {
    // ==================== IO Errors ====================
    /// IO error from file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // ==================== External Tool Errors ====================
    /// An external executable could not be located.
    #[error("external tool not found: {name}")]
    ToolNotFound {
        /// The tool name or configured path that was searched for.
        name: String,
    },

    /// An external tool exited with a non-zero status.
    #[error("{tool} failed with status {status}: {stderr}")]
    ToolFailed {
        /// The tool that failed.
        tool: String,
        /// Exit code, or -1 if the process was terminated by a signal.
        status: i32,
        /// Trimmed standard error output.
        stderr: String,
    },

    /// An external tool did not exit within the allowed time.
    #[error("{tool} did not finish within {seconds}s")]
    ToolTimeout {
        /// The tool that timed out.
        tool: String,
        /// The timeout that was applied.
        seconds: u64,
    },

    /// The file an external tool was expected to produce never appeared.
    #[error("expected output {path} did not appear after {attempts} attempts")]
    OutputTimeout {
        /// The path that was polled.
        path: PathBuf,
        /// Number of polling attempts made.
        attempts: u32,
    },

    /// The metadata query output did not contain the expected labeled lines.
    #[error("could not read audio info from {path}: {message}")]
    AudioInfoUnavailable {
        /// The audio file that was queried.
        path: PathBuf,
        /// What was missing.
        message: String,
    },

    // ==================== Localization Errors ====================
    /// The localization container does not exist.
    #[error("localization container not found: {0}")]
    ContainerNotFound(PathBuf),

    /// The row table could not be parsed.
    #[error("malformed table at line {line}: {message}")]
    MalformedTable {
        /// 1-based line where the problem was detected.
        line: usize,
        /// Description of the problem.
        message: String,
    },

    /// Several addressable rows share one normalized key.
    #[error("ambiguous key '{key}' matches {count} rows")]
    AmbiguousKey {
        /// The normalized key.
        key: String,
        /// Number of rows sharing the key.
        count: usize,
    },

    // ==================== Catalog Errors ====================
    /// The asset catalog could not be interpreted.
    #[error("invalid asset catalog: {0}")]
    InvalidCatalog(String),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    // ==================== File System Errors ====================
    /// Invalid file path.
    #[error("invalid path: {0}")]
    InvalidPath(String),

    /// Directory traversal error.
    #[error("directory walk error: {0}")]
    WalkDirError(String),
}

impl From<walkdir::Error> for Error {
    fn from(err: walkdir::Error) -> Self {
        Error::WalkDirError(err.to_string())
    }
}

/// A specialized Result type for `TrialsCore` operations.
pub type Result<T> = std::result::Result<T, Error>;
