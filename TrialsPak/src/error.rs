use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("TrialsCore error: {0}")]
    Core(#[from] trialscore::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    #[error("TOML serialization error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unknown subtitle key: {0}")]
    UnknownKey(String),

    #[error("Nothing staged under {0}")]
    EmptyStaging(PathBuf),

    #[error("Invalid overlay file {path}: {message}")]
    InvalidOverlay { path: PathBuf, message: String },

    #[error("Background task failed: {0}")]
    Worker(String),
}

pub type Result<T> = std::result::Result<T, Error>;
