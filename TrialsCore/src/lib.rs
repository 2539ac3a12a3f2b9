//! # TrialsCore
//!
//! Engine crate for Outlast Trials modding: localization tables, the
//! subtitle merge engine, audio asset catalog lookups and the plumbing around
//! the external command-line tools the game's formats require.
//!
//! ## Quick Start
//!
//! ### Editing subtitles in a `.locres` container
//!
//! ```no_run
//! use trialscore::locres::{LocresMerger, SubtitleMap};
//! use trialscore::tools::LocresTool;
//!
//! let merger = LocresMerger::new(LocresTool::locate(None)?);
//! let current = merger.export("Game.locres".as_ref())?;
//! println!("{} subtitles", current.len());
//!
//! let mut overlay = SubtitleMap::new();
//! overlay.insert("VO_Door_01".into(), "Open the door, now.".into());
//! let report = merger.merge_and_import("Game.locres".as_ref(), &overlay)?;
//! println!("replaced {} appended {}", report.stats.replaced, report.stats.appended);
//! # Ok::<(), trialscore::Error>(())
//! ```
//!
//! ### Resolving audio files to asset IDs
//!
//! ```no_run
//! use trialscore::catalog::{CatalogIndex, load_catalog, resolve, DEFAULT_DIALOGUE_PREFIX};
//!
//! let entries = load_catalog("SoundbanksInfo.json")?;
//! let index = CatalogIndex::build(&entries, &["English(US)"], DEFAULT_DIALOGUE_PREFIX);
//! if let Some(id) = resolve("VO_Door_01_a1b2c3d4.wem", &index).id() {
//!     println!("rename to {id}.wem");
//! }
//! # Ok::<(), trialscore::Error>(())
//! ```

pub mod catalog;
pub mod error;
pub mod formats;
pub mod locres;
pub mod tools;

// Re-exports for convenience
pub use error::{Error, Result};

/// Prelude module for common imports
pub mod prelude {
    pub use crate::error::{Error, Result};
    pub use crate::formats::{KeyConvention, LocalizationTable, TableRow, normalize_key};
    pub use crate::locres::{
        DuplicatePolicy, ImportStatus, LocresMerger, MergeReport, MergeStats, SubtitleMap,
    };
    pub use crate::catalog::{
        AssetCatalogEntry, CatalogIndex, CatalogPartition, FallbackRule, Resolution, load_catalog,
        resolve,
    };
    pub use crate::tools::{
        AudioConverter, AudioInfo, LocresCodec, LocresTool, PackOptions, Packer, PollSettings,
        RepakTool,
    };
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
