//! File-backed level persistence.
//!
//! ```text
//! <name>.json   - level document (pretty JSON, version field first)
//! <id>.h        - exported header: tile array + spawn macros
//! ```

use crate::document::{LevelDocument, LoadOutcome};
use crate::error::FormatError;
use crate::export::{export_file_name, export_header_file};
use crate::header::{HeaderImport, parse_header};
use raylevel_kernel::Level;
use std::path::{Path, PathBuf};

/// Read and validate a level document.
pub fn load_level(path: impl AsRef<Path>) -> Result<LoadOutcome, FormatError> {
    let path = path.as_ref();
    let doc: LevelDocument = serde_json::from_reader(std::io::BufReader::new(
        std::fs::File::open(path)?,
    ))?;
    let outcome = doc.into_level()?;
    tracing::info!(
        path = %path.display(),
        width = outcome.level.width(),
        height = outcome.level.height(),
        warnings = outcome.warnings.len(),
        "level loaded"
    );
    Ok(outcome)
}

/// Write the level as a pretty JSON document. Returns the document
/// fingerprint.
pub fn save_level(path: impl AsRef<Path>, level: &Level) -> Result<String, FormatError> {
    let path = path.as_ref();
    let doc = LevelDocument::from_level(level);
    let mut text = doc.to_json_pretty()?;
    text.push('\n');
    std::fs::write(path, text)?;
    let fingerprint = doc.fingerprint()?;
    tracing::info!(path = %path.display(), fingerprint = %fingerprint, "level saved");
    Ok(fingerprint)
}

/// Parse a header file from disk.
pub fn load_header(path: impl AsRef<Path>) -> Result<HeaderImport, FormatError> {
    let text = std::fs::read_to_string(path)?;
    parse_header(&text)
}

/// Write the `.h` export into `dir`, named after the level id.
pub fn save_header(dir: impl AsRef<Path>, level: &Level, raw_id: &str) -> Result<PathBuf, FormatError> {
    let path = dir.as_ref().join(export_file_name(raw_id));
    std::fs::write(&path, export_header_file(level, raw_id))?;
    tracing::info!(path = %path.display(), "header exported");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use raylevel_common::{EnemyKind, TileKind, TilePos};
    use raylevel_kernel::{SpawnSlot, SwitchLink};

    fn sample() -> Level {
        let mut level = Level::new(12, 9);
        level.set_tile(3, 3, TileKind::Door).unwrap();
        level.set_tile(5, 5, TileKind::Switch).unwrap();
        level.set_link(0, SwitchLink::Exit);
        level.place_spawn(SpawnSlot::One, TilePos::new(2, 2)).unwrap();
        level.add_enemy(EnemyKind::Demon, TilePos::new(8, 6)).unwrap();
        level
    }

    #[test]
    fn save_and_load_preserves_state_hash() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("level.json");
        let level = sample();

        let fingerprint = save_level(&path, &level).unwrap();
        let loaded = load_level(&path).unwrap();
        assert_eq!(loaded.level.state_hash(), level.state_hash());
        assert_eq!(
            LevelDocument::from_level(&loaded.level).fingerprint().unwrap(),
            fingerprint
        );
    }

    #[test]
    fn saved_file_is_plain_json() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("level.json");
        save_level(&path, &sample()).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["version"], 1);
        assert_eq!(value["mapW"], 12);
        assert_eq!(value["switchLinks"][0], -1);
    }

    #[test]
    fn newer_file_is_rejected_without_loading() {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join("future.json");
        let mut doc = LevelDocument::from_level(&sample());
        doc.version = Some(99);
        std::fs::write(&path, doc.to_json_pretty().unwrap()).unwrap();
        match load_level(&path) {
            Err(FormatError::VersionTooNew { found, supported }) => {
                assert_eq!(found, 99);
                assert_eq!(supported, 1);
            }
            Err(e) => panic!("expected VersionTooNew, got: {e}"),
            Ok(_) => panic!("expected error, got Ok"),
        }
    }

    #[test]
    fn missing_file_is_io_error() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_level(tmp.path().join("nope.json")),
            Err(FormatError::Io(_))
        ));
    }

    #[test]
    fn header_round_trip_through_disk() {
        let tmp = tempfile::tempdir().unwrap();
        let level = sample();
        let path = save_header(tmp.path(), &level, "E1M4").unwrap();
        assert_eq!(path.file_name().unwrap(), "e1m4.h");

        let import = load_header(&path).unwrap();
        assert_eq!(import.level_id, "e1m4");
        let back = import.into_level().unwrap().level;
        assert_eq!(back.grid(), level.grid());
        assert_eq!(
            back.entities().spawn(SpawnSlot::One).map(|s| s.pos),
            Some(TilePos::new(2, 2))
        );
    }
}
