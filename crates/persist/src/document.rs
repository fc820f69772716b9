//! The versioned JSON level document.

use crate::error::FormatError;
use raylevel_common::{Angle, EnemyKind, PickupKind, TileKind, TilePos};
use raylevel_kernel::{
    CapacityWarning, DoorOrientation, DoorSwitchGraph, Enemy, EntityRegistry, Level, Pickup,
    Spawn, SpawnSlot, SwitchLink, TileGrid,
};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

/// Current document format. Documents with a newer version are refused.
pub const LEVEL_FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRecord {
    pub x: u32,
    pub y: u32,
    #[serde(default)]
    pub angle: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnemyRecord {
    #[serde(rename = "type")]
    pub kind: i64,
    pub tile_x: u32,
    pub tile_y: u32,
    #[serde(default)]
    pub angle: Option<i64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PickupRecord {
    #[serde(rename = "type")]
    pub kind: i64,
    pub tile_x: u32,
    pub tile_y: u32,
}

/// On-disk shape of a level. Field names match the files the editor has
/// always written, so older saves keep loading.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDocument {
    #[serde(default)]
    pub version: Option<u32>,
    pub map_w: u32,
    pub map_h: u32,
    pub map: Vec<i64>,
    #[serde(default)]
    pub spawn1: Option<SpawnRecord>,
    #[serde(default)]
    pub spawn2: Option<SpawnRecord>,
    #[serde(default)]
    pub enemies: Vec<EnemyRecord>,
    #[serde(default)]
    pub pickups: Vec<PickupRecord>,
    #[serde(default)]
    pub switch_links: Vec<i64>,
    #[serde(default)]
    pub door_orientations: BTreeMap<String, String>,
}

/// A successfully loaded level plus the non-fatal problems found on the way.
#[derive(Debug, Clone)]
pub struct LoadOutcome {
    pub level: Level,
    pub warnings: Vec<CapacityWarning>,
}

fn angle_from(units: i64) -> Angle {
    Angle::new(units.rem_euclid(i64::from(Angle::FULL_TURN)) as i32)
}

fn spawn_record(spawn: Option<Spawn>) -> Option<SpawnRecord> {
    spawn.map(|s| SpawnRecord {
        x: s.pos.x,
        y: s.pos.y,
        angle: Some(i64::from(s.angle.units())),
    })
}

fn spawn_from(record: Option<&SpawnRecord>) -> Option<Spawn> {
    record.map(|r| Spawn {
        pos: TilePos::new(r.x, r.y),
        angle: r.angle.map_or(Spawn::DEFAULT_ANGLE, angle_from),
    })
}

fn parse_pos_key(key: &str) -> Option<TilePos> {
    let (x, y) = key.split_once(',')?;
    Some(TilePos::new(x.trim().parse().ok()?, y.trim().parse().ok()?))
}

impl LevelDocument {
    /// Capture the current level.
    pub fn from_level(level: &Level) -> Self {
        let entities = level.entities();
        Self {
            version: Some(LEVEL_FORMAT_VERSION),
            map_w: level.width(),
            map_h: level.height(),
            map: level.grid().tiles().iter().map(|t| i64::from(t.id())).collect(),
            spawn1: spawn_record(entities.spawn(SpawnSlot::One)),
            spawn2: spawn_record(entities.spawn(SpawnSlot::Two)),
            enemies: entities
                .enemies()
                .iter()
                .map(|e| EnemyRecord {
                    kind: i64::from(e.kind.id()),
                    tile_x: e.pos.x,
                    tile_y: e.pos.y,
                    angle: Some(i64::from(e.angle.units())),
                })
                .collect(),
            pickups: entities
                .pickups()
                .iter()
                .map(|p| PickupRecord {
                    kind: i64::from(p.kind.id()),
                    tile_x: p.pos.x,
                    tile_y: p.pos.y,
                })
                .collect(),
            switch_links: level.graph().links().iter().map(|&l| i64::from(l)).collect(),
            door_orientations: level
                .graph()
                .orientations()
                .iter()
                .map(|(pos, o)| (pos.to_string(), o.code().to_string()))
                .collect(),
        }
    }

    pub fn from_json(text: &str) -> Result<Self, FormatError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, FormatError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// SHA-256 over the compact JSON encoding, as lowercase hex.
    pub fn fingerprint(&self) -> Result<String, FormatError> {
        let bytes = serde_json::to_vec(self)?;
        let digest = Sha256::digest(&bytes);
        Ok(format!("{digest:x}"))
    }

    /// Validate the document and build a level from it. Nothing is built
    /// unless every part validates.
    pub fn into_level(self) -> Result<LoadOutcome, FormatError> {
        if let Some(found) = self.version.filter(|&v| v > LEVEL_FORMAT_VERSION) {
            return Err(FormatError::VersionTooNew {
                found,
                supported: LEVEL_FORMAT_VERSION,
            });
        }
        let (width, height) = (self.map_w, self.map_h);
        if width == 0 || height == 0 {
            return Err(FormatError::ZeroDimension { width, height });
        }
        let expected = width as usize * height as usize;
        let length_mismatch = || FormatError::MapLengthMismatch {
            width,
            height,
            expected,
            actual: self.map.len(),
        };
        if self.map.len() != expected {
            return Err(length_mismatch());
        }

        let tiles = self
            .map
            .iter()
            .enumerate()
            .map(|(index, &id)| {
                u8::try_from(id)
                    .ok()
                    .and_then(|b| TileKind::try_from(b).ok())
                    .ok_or(FormatError::InvalidTile { index, id })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let grid = TileGrid::from_tiles(width, height, tiles).ok_or_else(length_mismatch)?;

        let enemies = self
            .enemies
            .iter()
            .enumerate()
            .map(|(index, r)| {
                let kind = u8::try_from(r.kind)
                    .ok()
                    .and_then(|b| EnemyKind::try_from(b).ok())
                    .ok_or(FormatError::InvalidEnemyKind { index, id: r.kind })?;
                Ok(Enemy {
                    kind,
                    pos: TilePos::new(r.tile_x, r.tile_y),
                    angle: r.angle.map_or(Enemy::DEFAULT_ANGLE, angle_from),
                })
            })
            .collect::<Result<Vec<_>, FormatError>>()?;
        let pickups = self
            .pickups
            .iter()
            .enumerate()
            .map(|(index, r)| {
                let kind = u8::try_from(r.kind)
                    .ok()
                    .and_then(|b| PickupKind::try_from(b).ok())
                    .ok_or(FormatError::InvalidPickupKind { index, id: r.kind })?;
                Ok(Pickup {
                    kind,
                    pos: TilePos::new(r.tile_x, r.tile_y),
                })
            })
            .collect::<Result<Vec<_>, FormatError>>()?;

        let links = self
            .switch_links
            .iter()
            .enumerate()
            .map(|(index, &value)| {
                SwitchLink::try_from(value)
                    .map_err(|_| FormatError::InvalidSwitchLink { index, value })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let orientations = self
            .door_orientations
            .iter()
            .map(|(key, value)| {
                parse_pos_key(key)
                    .zip(DoorOrientation::from_code(value))
                    .ok_or_else(|| FormatError::InvalidOrientation {
                        key: key.clone(),
                        value: value.clone(),
                    })
            })
            .collect::<Result<BTreeMap<_, _>, _>>()?;

        let spawns = [
            spawn_from(self.spawn1.as_ref()),
            spawn_from(self.spawn2.as_ref()),
        ];
        let (entities, mut warnings) = EntityRegistry::from_parts(spawns, enemies, pickups);
        for warning in &warnings {
            tracing::warn!(
                kind = %warning.kind,
                found = warning.found,
                limit = warning.limit,
                "loaded level had {} {}, trimmed to {} (game limit)",
                warning.found,
                warning.kind,
                warning.limit
            );
        }

        let level = Level::from_parts(grid, DoorSwitchGraph::from_parts(links, orientations), entities);
        let derived = level.derived_capacity_warnings();
        for warning in &derived {
            tracing::warn!(
                kind = %warning.kind,
                found = warning.found,
                limit = warning.limit,
                "loaded level has more {} than the game supports",
                warning.kind
            );
        }
        warnings.extend(derived);
        tracing::debug!(width, height, "level document loaded");
        Ok(LoadOutcome { level, warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raylevel_kernel::CapacityKind;

    fn sample_level() -> Level {
        let mut level = Level::new(10, 8);
        level.set_tile(2, 2, TileKind::Door).unwrap();
        level.set_tile(3, 3, TileKind::KeyYellow).unwrap();
        level.set_tile(5, 5, TileKind::Switch).unwrap();
        level.set_tile(6, 5, TileKind::Switch).unwrap();
        level.set_tile(4, 1, TileKind::TechWall).unwrap();
        level.set_link(0, SwitchLink::Exit);
        level.set_link(1, SwitchLink::Door(1));
        level.set_door_orientation(TilePos::new(3, 3), DoorOrientation::EastWest);
        level.place_spawn(SpawnSlot::One, TilePos::new(1, 1)).unwrap();
        level.set_spawn_angle(SpawnSlot::One, Angle::new(300));
        level.add_enemy(EnemyKind::Imp, TilePos::new(7, 6)).unwrap();
        level.set_enemy_angle(0, Angle::new(100));
        level.add_pickup(PickupKind::Armor, TilePos::new(8, 2)).unwrap();
        level
    }

    fn minimal(map_w: u32, map_h: u32) -> LevelDocument {
        LevelDocument::from_level(&Level::new(map_w, map_h))
    }

    #[test]
    fn save_load_roundtrip_is_identical() {
        let level = sample_level();
        let json = LevelDocument::from_level(&level).to_json_pretty().unwrap();
        let loaded = LevelDocument::from_json(&json).unwrap().into_level().unwrap();
        assert!(loaded.warnings.is_empty());
        let back = loaded.level;
        assert_eq!(back.grid(), level.grid());
        assert_eq!(back.entities(), level.entities());
        assert_eq!(back.graph().links(), level.graph().links());
        assert_eq!(back.graph().orientations(), level.graph().orientations());
        assert_eq!(back.state_hash(), level.state_hash());
    }

    #[test]
    fn field_names_match_saved_files() {
        let json = LevelDocument::from_level(&sample_level())
            .to_json_pretty()
            .unwrap();
        for key in [
            "\"version\"",
            "\"mapW\"",
            "\"mapH\"",
            "\"spawn1\"",
            "\"spawn2\": null",
            "\"tileX\"",
            "\"type\"",
            "\"switchLinks\"",
            "\"doorOrientations\"",
            "\"3,3\": \"ew\"",
        ] {
            assert!(json.contains(key), "missing {key} in {json}");
        }
    }

    #[test]
    fn newer_version_is_rejected() {
        let mut doc = minimal(4, 4);
        doc.version = Some(2);
        assert!(matches!(
            doc.into_level(),
            Err(FormatError::VersionTooNew { found: 2, supported: 1 })
        ));
    }

    #[test]
    fn missing_version_is_accepted() {
        let mut doc = minimal(4, 4);
        doc.version = None;
        assert!(doc.into_level().is_ok());
    }

    #[test]
    fn map_length_mismatch_is_rejected() {
        let mut doc = minimal(4, 4);
        doc.map.pop();
        assert!(matches!(
            doc.into_level(),
            Err(FormatError::MapLengthMismatch {
                expected: 16,
                actual: 15,
                ..
            })
        ));
    }

    #[test]
    fn non_numeric_dimensions_are_rejected() {
        let text = r#"{"version":1,"mapW":"4","mapH":4,"map":[]}"#;
        assert!(matches!(
            LevelDocument::from_json(text),
            Err(FormatError::Json(_))
        ));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let mut doc = minimal(4, 4);
        doc.map[5] = 12;
        assert!(matches!(
            doc.into_level(),
            Err(FormatError::InvalidTile { index: 5, id: 12 })
        ));

        let mut doc = minimal(4, 4);
        doc.enemies.push(EnemyRecord {
            kind: 4,
            tile_x: 1,
            tile_y: 1,
            angle: None,
        });
        assert!(matches!(
            doc.into_level(),
            Err(FormatError::InvalidEnemyKind { index: 0, id: 4 })
        ));

        let mut doc = minimal(4, 4);
        doc.switch_links.push(-2);
        assert!(matches!(
            doc.into_level(),
            Err(FormatError::InvalidSwitchLink { index: 0, value: -2 })
        ));

        let mut doc = minimal(4, 4);
        doc.door_orientations.insert("1,1".into(), "up".into());
        assert!(matches!(
            doc.into_level(),
            Err(FormatError::InvalidOrientation { .. })
        ));
    }

    #[test]
    fn optional_fields_take_defaults() {
        let text = r#"{
            "mapW": 3, "mapH": 3,
            "map": [1,1,1, 1,0,1, 1,1,1],
            "spawn1": {"x": 1, "y": 1},
            "enemies": [{"type": 2, "tileX": 1, "tileY": 1}]
        }"#;
        let outcome = LevelDocument::from_json(text).unwrap().into_level().unwrap();
        let entities = outcome.level.entities();
        assert_eq!(
            entities.spawn(SpawnSlot::One).map(|s| s.angle),
            Some(Angle::SOUTH)
        );
        assert_eq!(entities.spawn(SpawnSlot::Two), None);
        assert_eq!(entities.enemies()[0].angle, Angle::NORTH);
        assert!(outcome.level.graph().links().is_empty());
        assert!(outcome.level.graph().orientations().is_empty());
    }

    #[test]
    fn over_capacity_lists_are_trimmed_with_warning() {
        let mut doc = minimal(8, 8);
        doc.enemies = (0..25)
            .map(|i| EnemyRecord {
                kind: i % 4,
                tile_x: 1,
                tile_y: 1,
                angle: Some(0),
            })
            .collect();
        let outcome = doc.into_level().unwrap();
        assert_eq!(outcome.level.entities().enemies().len(), 21);
        assert_eq!(outcome.warnings.len(), 1);
        assert_eq!(outcome.warnings[0].kind, CapacityKind::Enemies);
        assert_eq!(outcome.warnings[0].found, 25);
    }

    #[test]
    fn link_table_is_resized_to_switch_count() {
        let mut doc = minimal(6, 6);
        doc.map[6 + 2] = i64::from(TileKind::Switch.id());
        doc.switch_links = vec![-1, 0, 0];
        let level = doc.into_level().unwrap().level;
        assert_eq!(level.graph().links(), &[SwitchLink::Exit]);

        let mut doc = minimal(6, 6);
        doc.map[6 + 2] = i64::from(TileKind::Switch.id());
        let level = doc.into_level().unwrap().level;
        assert_eq!(level.graph().links(), &[SwitchLink::Door(0)]);
    }

    #[test]
    fn empty_border_cells_are_sealed_on_load() {
        let mut doc = minimal(4, 4);
        doc.map[0] = 0;
        doc.map[1] = 3;
        let level = doc.into_level().unwrap().level;
        assert_eq!(level.grid().get(0, 0).unwrap(), TileKind::BORDER);
        assert_eq!(level.grid().get(1, 0).unwrap(), TileKind::TechWall);
    }

    #[test]
    fn fingerprint_changes_with_content() {
        let a = LevelDocument::from_level(&sample_level());
        let mut b = a.clone();
        assert_eq!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        b.map[11] = 3;
        assert_ne!(a.fingerprint().unwrap(), b.fingerprint().unwrap());
        assert_eq!(a.fingerprint().unwrap().len(), 64);
    }
}
