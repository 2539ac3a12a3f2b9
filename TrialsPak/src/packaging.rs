//! Pack a staged mod into a patch archive

use std::fs;
use std::path::PathBuf;

use trialscore::tools::{PackOptions, Packer};
use walkdir::WalkDir;

use crate::error::{Error, Result};
use crate::staging::{ModLayout, patch_folder_name};

/// Pack `layout.root` as `<pak_name>_P.pak`
///
/// The staging folder is renamed first when its name does not already
/// match, since the packer names the archive after the folder. `layout` is
/// updated to the new root.
pub fn package_mod<P: Packer + ?Sized>(
    layout: &mut ModLayout,
    packer: &P,
    pak_name: &str,
    options: &PackOptions,
) -> Result<PathBuf> {
    let has_files = layout.root.is_dir()
        && WalkDir::new(&layout.root)
            .into_iter()
            .filter_map(std::result::Result::ok)
            .any(|e| e.file_type().is_file());
    if !has_files {
        return Err(Error::EmptyStaging(layout.root.clone()));
    }

    let folder_name = patch_folder_name(pak_name);
    let target = layout
        .root
        .parent()
        .map_or_else(|| PathBuf::from(&folder_name), |p| p.join(&folder_name));

    if target != layout.root {
        if target.exists() {
            return Err(Error::Config(format!(
                "cannot rename staging folder, {} already exists",
                target.display()
            )));
        }
        tracing::info!(from = %layout.root.display(), to = %target.display(), "Renaming staging folder");
        fs::rename(&layout.root, &target)?;
        layout.root = target;
    }

    let archive = packer.pack(&layout.root, options)?;
    tracing::info!(
        archive = %archive.display(),
        version = %options.version,
        compression = %options.compression,
        "Packaged mod"
    );
    Ok(archive)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use trialscore::tools::archive_path_for;

    struct FakePacker;

    impl Packer for FakePacker {
        fn pack(&self, folder: &Path, _options: &PackOptions) -> trialscore::Result<PathBuf> {
            let archive = archive_path_for(folder);
            fs::write(&archive, "pak")?;
            Ok(archive)
        }
    }

    #[test]
    fn test_package_renames_to_patch_name() {
        let dir = tempfile::tempdir().unwrap();
        let mut layout = ModLayout::new(dir.path().join("Door"));
        fs::create_dir_all(layout.effects_dir()).unwrap();
        fs::write(layout.effects_dir().join("900.wem"), "x").unwrap();

        let archive = package_mod(&mut layout, &FakePacker, "Door", &PackOptions::default()).unwrap();
        assert_eq!(archive, dir.path().join("Door_P.pak"));
        assert_eq!(layout.root, dir.path().join("Door_P"));
        assert!(layout.effects_dir().join("900.wem").exists());
    }

    #[test]
    fn test_empty_staging_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let mut layout = ModLayout::new(dir.path().join("Door_P"));
        fs::create_dir_all(layout.effects_dir()).unwrap();

        let err = package_mod(&mut layout, &FakePacker, "Door", &PackOptions::default()).unwrap_err();
        assert!(matches!(err, Error::EmptyStaging(_)));
    }
}
