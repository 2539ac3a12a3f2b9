//! Command execution implementations

use super::Commands;
use super::definitions::{AudioCommands, ConfigCommands, LocaCommands, ModCommands};
use super::{audio, config, loca, mod_cmd};

impl Commands {
    /// Execute the selected command.
    ///
    /// # Errors
    /// Returns an error if the underlying command fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            Commands::Loca { command } => command.execute(),
            Commands::Audio { command } => command.execute(),
            Commands::Mod { command } => command.execute(),
            Commands::Config { command } => command.execute(),
        }
    }
}

impl LocaCommands {
    /// Execute the selected subtitle command.
    ///
    /// # Errors
    /// Returns an error if the container cannot be exported or imported.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            LocaCommands::Export { container, output } => {
                loca::export(container, output.as_deref())
            }
            LocaCommands::Get { container, key } => loca::get(container, key),
            LocaCommands::Set {
                container,
                key,
                text,
            } => loca::set(container, key, text),
            LocaCommands::Apply {
                container,
                overlay,
                dry_run,
            } => loca::apply(container, overlay, *dry_run),
            LocaCommands::Search {
                query,
                dir,
                limit,
                quiet,
            } => loca::search(query, dir.as_deref(), *limit, *quiet),
        }
    }
}

impl AudioCommands {
    /// Execute the selected audio command.
    ///
    /// # Errors
    /// Returns an error if the converter fails or the catalog cannot be read.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            AudioCommands::Info { path } => audio::info(path),
            AudioCommands::Convert { source, output } => audio::convert(source, output.as_deref()),
            AudioCommands::Resolve {
                paths,
                catalog,
                language,
            } => audio::resolve_files(paths, catalog.as_deref(), language),
        }
    }
}

impl ModCommands {
    /// Execute the selected mod command.
    ///
    /// # Errors
    /// Returns an error if staging or packing fails.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            ModCommands::Stage {
                project,
                container,
                catalog,
            } => mod_cmd::stage(project, container.as_deref(), catalog.as_deref()),
            ModCommands::Pack { project } => mod_cmd::pack(project),
        }
    }
}

impl ConfigCommands {
    /// Execute the selected settings command.
    ///
    /// # Errors
    /// Returns an error if the settings cannot be saved.
    pub fn execute(&self) -> anyhow::Result<()> {
        match self {
            ConfigCommands::Show => config::show(),
            ConfigCommands::Path => config::path(),
            ConfigCommands::SetTool { tool, path } => config::set_tool(*tool, path.clone()),
            ConfigCommands::SetCatalog { path } => config::set_catalog(path),
            ConfigCommands::InitProject { dir, name } => {
                config::init_project(dir, name.as_deref())
            }
        }
    }
}
