use std::fs;
use std::path::Path;
use std::time::Duration;

use pretty_assertions::assert_eq;
use tempfile::tempdir;
use trialscore::catalog::{
    AssetCatalogEntry, CatalogIndex, DEFAULT_DIALOGUE_PREFIX, Resolution, parse_catalog, resolve,
    unique_destination,
};
use trialscore::formats::{read_table, write_table};
use trialscore::prelude::*;

/// Codec over plain-text containers: the container already is a table.
/// Import writes `key,effective text` rows to the `.new` path, or over the
/// container itself when `in_place` is set.
struct TextCodec {
    in_place: bool,
}

impl LocresCodec for TextCodec {
    fn export(&self, container: &Path) -> trialscore::Result<()> {
        fs::copy(container, self.table_path(container))?;
        Ok(())
    }

    fn import(&self, container: &Path, table: &Path) -> trialscore::Result<()> {
        let mut imported = read_table(table)?;
        for row in &mut imported.rows {
            let text = row.effective_text().unwrap_or_default().to_string();
            *row = TableRow::new(row.key(), text);
        }
        let target = if self.in_place {
            container.to_path_buf()
        } else {
            self.imported_path(container)
        };
        write_table(target, &imported)
    }
}

fn merger() -> LocresMerger<TextCodec> {
    LocresMerger::new(TextCodec { in_place: false })
        .with_poll(PollSettings::new(5, Duration::from_millis(10)))
}

fn container(dir: &Path, text: &str) -> std::path::PathBuf {
    let path = dir.join("Game.locres");
    fs::write(&path, text).unwrap();
    path
}

fn map(pairs: &[(&str, &str)]) -> SubtitleMap {
    pairs
        .iter()
        .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
        .collect()
}

const GAME: &str = "Subtitles/VO_Door_01,Open it.\nMenu_Start,Start\nSubtitles/VO_Door_02,Run!\n";

#[test]
fn test_export_normalizes_and_cleans_up() {
    let dir = tempdir().unwrap();
    let path = container(dir.path(), GAME);

    let exported = merger().export(&path).unwrap();
    assert_eq!(
        exported,
        map(&[
            ("VO_Door_01", "Open it."),
            ("Menu_Start", "Start"),
            ("VO_Door_02", "Run!"),
        ])
    );
    assert!(!dir.path().join("Game.csv").exists());
}

#[test]
fn test_empty_overlay_round_trip() {
    let dir = tempdir().unwrap();
    let path = container(dir.path(), GAME);
    let merger = merger();

    let before = merger.export(&path).unwrap();
    let report = merger.merge_and_import(&path, &SubtitleMap::new()).unwrap();
    assert!(report.stats.is_noop());
    assert_eq!(report.import, ImportStatus::Replaced);
    assert_eq!(merger.export(&path).unwrap(), before);
    assert!(!dir.path().join("Game.locres.new").exists());
}

#[test]
fn test_merge_replaces_and_appends() {
    let dir = tempdir().unwrap();
    let path = container(dir.path(), GAME);
    let merger = merger();

    let overlay = map(&[("VO_Door_02", "Hide!"), ("VO_Window_01", "Break it.")]);
    let report = merger.merge_and_import(&path, &overlay).unwrap();
    assert_eq!(report.stats.replaced, 1);
    assert_eq!(report.stats.appended, 1);
    assert_eq!(report.stats.passthrough, 1);

    let after = merger.export(&path).unwrap();
    assert_eq!(after.get("VO_Door_02").map(String::as_str), Some("Hide!"));
    assert_eq!(after.get("VO_Window_01").map(String::as_str), Some("Break it."));
    assert_eq!(after.get("Menu_Start").map(String::as_str), Some("Start"));
    assert!(fs::read_to_string(&path).unwrap().contains("Subtitles/VO_Window_01"));
}

#[test]
fn test_merge_is_idempotent() {
    let dir = tempdir().unwrap();
    let path = container(dir.path(), GAME);
    let merger = merger();
    let overlay = map(&[("VO_Door_01", "Shut it."), ("VO_New", "Hello")]);

    merger.merge_and_import(&path, &overlay).unwrap();
    let once = fs::read_to_string(&path).unwrap();

    let second = merger.merge_and_import(&path, &overlay).unwrap();
    assert!(second.stats.is_noop());
    assert_eq!(fs::read_to_string(&path).unwrap(), once);
}

#[test]
fn test_in_place_import_is_accepted() {
    let dir = tempdir().unwrap();
    let path = container(dir.path(), GAME);
    let merger = LocresMerger::new(TextCodec { in_place: true })
        .with_poll(PollSettings::new(2, Duration::from_millis(5)));

    let report = merger
        .merge_and_import(&path, &map(&[("VO_Door_01", "Close it.")]))
        .unwrap();
    assert_eq!(report.import, ImportStatus::AssumedInPlace);
    assert_eq!(
        merger.export(&path).unwrap().get("VO_Door_01").map(String::as_str),
        Some("Close it.")
    );
}

#[test]
fn test_missing_container() {
    let dir = tempdir().unwrap();
    let err = merger().export(&dir.path().join("Nope.locres")).unwrap_err();
    assert!(matches!(err, Error::ContainerNotFound(_)));
}

#[test]
fn test_export_timeout_when_codec_writes_nothing() {
    struct SilentCodec;
    impl LocresCodec for SilentCodec {
        fn export(&self, _: &Path) -> trialscore::Result<()> {
            Ok(())
        }
        fn import(&self, _: &Path, _: &Path) -> trialscore::Result<()> {
            Ok(())
        }
    }

    let dir = tempdir().unwrap();
    let path = container(dir.path(), GAME);
    let err = LocresMerger::new(SilentCodec)
        .with_poll(PollSettings::new(2, Duration::from_millis(5)))
        .export(&path)
        .unwrap_err();
    assert!(matches!(err, Error::OutputTimeout { attempts: 2, .. }));
}

#[test]
fn test_resolve_catalog_scenario() {
    let catalog = parse_catalog(
        r#"[{"Id": "12345", "ShortName": "VO_Door_01.wav"},
            {"Id": "900", "ShortName": "Rain_Loop_02.wav", "Language": "SFX"}]"#,
    )
    .unwrap();
    let index = CatalogIndex::build(&catalog, &["English(US)"], DEFAULT_DIALOGUE_PREFIX);

    assert_eq!(resolve("VO_Door_01_a1b2c3d4.wem", &index).id(), Some("12345"));
    assert_eq!(resolve("VO_Door_01.wem", &index).id(), Some("12345"));
    assert_eq!(resolve("Rain_Loop.wem", &index).id(), Some("900"));
    assert_eq!(resolve("Rain_Loop_02_Alt.wem", &index).id(), Some("900"));
    assert_eq!(resolve("Thunder.wem", &index), Resolution::NoMatch);
}

#[test]
fn test_colliding_ids_never_overwrite() {
    let entries = vec![AssetCatalogEntry::new("12345", "VO_Door_01.wav")];
    let index = CatalogIndex::build(&entries, &[] as &[&str], DEFAULT_DIALOGUE_PREFIX);
    let out = tempdir().unwrap();

    let mut written = Vec::new();
    for name in ["VO_Door_01.wem", "VO_Door_01_a1b2c3d4.wem", "VO_Door_01_00000000.wem"] {
        let id = resolve(name, &index).id().unwrap().to_string();
        let dest = unique_destination(out.path(), &id, "wem");
        fs::write(&dest, name).unwrap();
        written.push(dest.file_name().unwrap().to_string_lossy().into_owned());
    }

    assert_eq!(written, vec!["12345.wem", "12345_1.wem", "12345_2.wem"]);
}
