//! CLI command definitions and implementations

pub mod audio;
pub mod config;
pub mod definitions;
pub mod execute;
pub mod loca;
pub mod mod_cmd;

use clap::Subcommand;

pub use definitions::{AudioCommands, ConfigCommands, LocaCommands, ModCommands};

#[derive(Subcommand)]
pub enum Commands {
    /// Subtitle container operations (.locres)
    Loca {
        #[command(subcommand)]
        command: LocaCommands,
    },

    /// Audio asset operations (info, preview conversion, ID lookup)
    Audio {
        #[command(subcommand)]
        command: AudioCommands,
    },

    /// Mod project staging and packaging
    Mod {
        #[command(subcommand)]
        command: ModCommands,
    },

    /// Show and edit persisted settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}
