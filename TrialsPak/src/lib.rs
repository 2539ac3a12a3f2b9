//! TrialsPak - Outlast Trials modding toolkit
//!
//! Subtitle editing, audio staging and mod packaging on top of the
//! `trialscore` engine.

// Re-export trialscore
pub use trialscore;

pub mod config;
pub mod error;
pub mod packaging;
pub mod preview;
pub mod scan;
pub mod session;
pub mod staging;
pub mod workspace;

#[cfg(feature = "cli")]
pub mod cli;

pub use config::{Settings, ToolKind, ToolPaths};
pub use error::{Error, Result};
pub use packaging::package_mod;
pub use scan::{ScanHandle, ScanReport, find_containers, scan_containers};
pub use session::{SubtitleEntry, SubtitleSession, load_overlay, save_overlay};
pub use staging::{ModLayout, StagingReport, stage_audio, stage_container};
pub use workspace::{ProjectManifest, init_project};
