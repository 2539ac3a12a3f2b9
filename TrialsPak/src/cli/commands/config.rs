//! CLI commands for settings and project setup

use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::config::{Settings, ToolKind};
use crate::workspace::{ProjectManifest, init_project as create_project};

pub fn show() -> anyhow::Result<()> {
    let settings = Settings::load();
    println!("{}", serde_json::to_string_pretty(&settings)?);
    Ok(())
}

pub fn path() -> anyhow::Result<()> {
    let path = Settings::config_path().context("no configuration directory on this platform")?;
    println!("{}", path.display());
    Ok(())
}

pub fn set_tool(tool: ToolKind, path: Option<PathBuf>) -> anyhow::Result<()> {
    if let Some(path) = &path {
        anyhow::ensure!(path.is_file(), "{} is not a file", path.display());
    }
    let mut settings = Settings::load();
    settings.tools.set(tool, path);
    let saved = settings.save()?;
    println!("Saved {}", saved.display());
    Ok(())
}

pub fn set_catalog(path: &Path) -> anyhow::Result<()> {
    // validate before saving
    let entries = trialscore::catalog::load_catalog(path)?;
    let mut settings = Settings::load();
    settings.catalog = Some(path.to_path_buf());
    let saved = settings.save()?;
    println!("Catalog with {} assets saved to {}", entries.len(), saved.display());
    Ok(())
}

pub fn init_project(dir: &Path, name: Option<&str>) -> anyhow::Result<()> {
    let name = match name {
        Some(name) => name.to_string(),
        None => dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .context("cannot derive a project name from the directory; pass --name")?,
    };
    let manifest = ProjectManifest::new(&name);
    create_project(dir, &manifest)?;
    println!("Created project '{}' in {}", name, dir.display());
    Ok(())
}
