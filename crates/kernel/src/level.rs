use crate::entities::{
    CapacityError, CapacityKind, CapacityWarning, Enemy, EntityRegistry, Pickup, Spawn, SpawnSlot,
};
use crate::graph::{Door, DoorOrientation, DoorSwitchGraph, Switch, SwitchLink, scan_doors, scan_switches};
use crate::grid::{OutOfBounds, TileGrid};
use raylevel_common::{Angle, EnemyKind, PickupKind, TileKind, TilePos, limits};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Errors from level mutations that can be refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LevelError {
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBounds),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

/// An event record produced by every mutation to the level.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum LevelEvent {
    TileSet {
        pos: TilePos,
        old: TileKind,
        new: TileKind,
    },
    Resized {
        width: u32,
        height: u32,
        dropped_entities: usize,
    },
    SpawnPlaced {
        slot: SpawnSlot,
        spawn: Spawn,
    },
    SpawnCleared {
        slot: SpawnSlot,
    },
    SpawnTurned {
        slot: SpawnSlot,
        angle: Angle,
    },
    EnemyAdded {
        index: usize,
        enemy: Enemy,
    },
    EnemyRemoved {
        index: usize,
        enemy: Enemy,
    },
    EnemyTurned {
        index: usize,
        angle: Angle,
    },
    PickupAdded {
        index: usize,
        pickup: Pickup,
    },
    PickupRemoved {
        index: usize,
        pickup: Pickup,
    },
    LinkSet {
        switch_index: usize,
        link: SwitchLink,
    },
    DoorOriented {
        pos: TilePos,
        orientation: DoorOrientation,
    },
    CapacityExceeded(CapacityWarning),
}

/// Result of a grid edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileEdit {
    /// The tile actually stored (border coercion may differ from the request).
    pub stored: TileKind,
    /// Derived door/switch counts over the game limit after this edit.
    pub warnings: Vec<CapacityWarning>,
}

/// What occupies a cell, in the priority order the editor reports it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellInfo {
    Spawn(SpawnSlot),
    Enemy {
        index: usize,
        kind: EnemyKind,
        pos: TilePos,
    },
    Pickup {
        index: usize,
        kind: PickupKind,
        pos: TilePos,
    },
    Door {
        index: usize,
    },
    Switch {
        index: usize,
        link: Option<SwitchLink>,
    },
    Tile(TileKind),
}

impl fmt::Display for CellInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellInfo::Spawn(slot) => write!(f, "{slot}"),
            CellInfo::Enemy { kind, pos, .. } => write!(f, "{kind} ({},{})", pos.x, pos.y),
            CellInfo::Pickup { kind, pos, .. } => write!(f, "{kind} ({},{})", pos.x, pos.y),
            CellInfo::Door { index } => write!(f, "Door {index}"),
            CellInfo::Switch { index, link } => match link {
                Some(link) => write!(f, "Switch {index} -> {link}"),
                None => write!(f, "Switch {index}"),
            },
            CellInfo::Tile(tile) => write!(f, "{tile}"),
        }
    }
}

/// The authoritative level being edited.
///
/// All mutations go through explicit operations so the link table stays
/// sized to the switch count and every change lands in the event log. The
/// owner drains that log after each operation (see `drain_events`). The
/// preview, persistence and inspector layers only read from the level.
#[derive(Debug, Clone)]
pub struct Level {
    grid: TileGrid,
    graph: DoorSwitchGraph,
    entities: EntityRegistry,
    /// Mutations since the last `drain_events`.
    event_log: Vec<LevelEvent>,
}

impl Default for Level {
    fn default() -> Self {
        Self::new(Self::DEFAULT_SIDE, Self::DEFAULT_SIDE)
    }
}

impl Level {
    pub const DEFAULT_SIDE: u32 = 32;

    /// An empty bordered level with no entities.
    pub fn new(width: u32, height: u32) -> Self {
        Self::from_parts(
            TileGrid::new(width, height),
            DoorSwitchGraph::new(),
            EntityRegistry::new(),
        )
    }

    /// Assemble a level from loaded parts. The link table is resized to the
    /// grid's switch count.
    pub fn from_parts(grid: TileGrid, mut graph: DoorSwitchGraph, entities: EntityRegistry) -> Self {
        graph.sync(&grid);
        Self {
            grid,
            graph,
            entities,
            event_log: Vec::new(),
        }
    }

    pub fn grid(&self) -> &TileGrid {
        &self.grid
    }

    pub fn graph(&self) -> &DoorSwitchGraph {
        &self.graph
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    pub fn width(&self) -> u32 {
        self.grid.width()
    }

    pub fn height(&self) -> u32 {
        self.grid.height()
    }

    pub fn doors(&self) -> Vec<Door> {
        scan_doors(&self.grid)
    }

    pub fn switches(&self) -> Vec<Switch> {
        scan_switches(&self.grid)
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<LevelEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[LevelEvent] {
        &self.event_log
    }

    /// Paint one cell. Doors and switches are re-derived afterwards.
    pub fn set_tile(&mut self, x: u32, y: u32, tile: TileKind) -> Result<TileEdit, OutOfBounds> {
        let old = self.grid.get(x, y)?;
        let stored = self.grid.set(x, y, tile)?;
        self.graph.sync(&self.grid);
        if old != stored {
            self.event_log.push(LevelEvent::TileSet {
                pos: TilePos::new(x, y),
                old,
                new: stored,
            });
        }
        let warnings = self.derived_capacity_warnings();
        for warning in &warnings {
            tracing::warn!(
                kind = %warning.kind,
                found = warning.found,
                limit = warning.limit,
                "too many {} tiles",
                warning.kind
            );
            self.event_log.push(LevelEvent::CapacityExceeded(*warning));
        }
        Ok(TileEdit { stored, warnings })
    }

    /// Door and switch counts currently over the game limits.
    pub fn derived_capacity_warnings(&self) -> Vec<CapacityWarning> {
        let doors = self.grid.scan(TileKind::is_door).count();
        let switches = self.graph.links().len();
        [
            (CapacityKind::Doors, doors, limits::MAX_DOORS),
            (CapacityKind::Switches, switches, limits::MAX_SWITCHES),
        ]
        .into_iter()
        .filter(|(_, found, limit)| found > limit)
        .map(|(kind, found, limit)| CapacityWarning { kind, found, limit })
        .collect()
    }

    /// Resize the grid. Entities outside the new bounds are dropped and the
    /// link table is cleared, since scan indices no longer mean anything.
    /// Returns the number of dropped entities.
    pub fn resize(&mut self, width: u32, height: u32) -> usize {
        self.grid.resize(width, height);
        let dropped = self
            .entities
            .retain_within(self.grid.width(), self.grid.height());
        self.graph.clear_links();
        self.graph.sync(&self.grid);
        tracing::info!(
            width = self.grid.width(),
            height = self.grid.height(),
            dropped,
            "level resized"
        );
        self.event_log.push(LevelEvent::Resized {
            width: self.grid.width(),
            height: self.grid.height(),
            dropped_entities: dropped,
        });
        dropped
    }

    fn check_pos(&self, pos: TilePos) -> Result<(), OutOfBounds> {
        self.grid.get_at(pos).map(|_| ())
    }

    pub fn place_spawn(&mut self, slot: SpawnSlot, pos: TilePos) -> Result<Spawn, OutOfBounds> {
        self.check_pos(pos)?;
        let spawn = self.entities.place_spawn(slot, pos);
        self.event_log.push(LevelEvent::SpawnPlaced { slot, spawn });
        Ok(spawn)
    }

    pub fn set_spawn_angle(&mut self, slot: SpawnSlot, angle: Angle) -> bool {
        let changed = self.entities.set_spawn_angle(slot, angle);
        if changed {
            self.event_log.push(LevelEvent::SpawnTurned { slot, angle });
        }
        changed
    }

    pub fn clear_spawn(&mut self, slot: SpawnSlot) -> Option<Spawn> {
        let removed = self.entities.clear_spawn(slot);
        if removed.is_some() {
            self.event_log.push(LevelEvent::SpawnCleared { slot });
        }
        removed
    }

    pub fn add_enemy(&mut self, kind: EnemyKind, pos: TilePos) -> Result<usize, LevelError> {
        self.check_pos(pos)?;
        let index = self.entities.add_enemy(kind, pos)?;
        self.event_log.push(LevelEvent::EnemyAdded {
            index,
            enemy: self.entities.enemies()[index],
        });
        Ok(index)
    }

    pub fn remove_enemy(&mut self, index: usize) -> Option<Enemy> {
        let enemy = self.entities.remove_enemy(index)?;
        self.event_log.push(LevelEvent::EnemyRemoved { index, enemy });
        Some(enemy)
    }

    pub fn set_enemy_angle(&mut self, index: usize, angle: Angle) -> bool {
        let changed = self.entities.set_enemy_angle(index, angle);
        if changed {
            self.event_log.push(LevelEvent::EnemyTurned { index, angle });
        }
        changed
    }

    pub fn add_pickup(&mut self, kind: PickupKind, pos: TilePos) -> Result<usize, LevelError> {
        self.check_pos(pos)?;
        let index = self.entities.add_pickup(kind, pos)?;
        self.event_log.push(LevelEvent::PickupAdded {
            index,
            pickup: self.entities.pickups()[index],
        });
        Ok(index)
    }

    pub fn remove_pickup(&mut self, index: usize) -> Option<Pickup> {
        let pickup = self.entities.remove_pickup(index)?;
        self.event_log.push(LevelEvent::PickupRemoved { index, pickup });
        Some(pickup)
    }

    /// Link a switch (by scan index) to a door scan index or the exit. The
    /// door index is not validated.
    pub fn set_link(&mut self, switch_index: usize, link: SwitchLink) -> bool {
        let stored = self.graph.set_link(switch_index, link);
        if stored {
            self.event_log.push(LevelEvent::LinkSet { switch_index, link });
        }
        stored
    }

    pub fn set_door_orientation(&mut self, pos: TilePos, orientation: DoorOrientation) {
        self.graph.set_orientation(pos, orientation);
        self.event_log
            .push(LevelEvent::DoorOriented { pos, orientation });
    }

    /// Describe what occupies a cell: spawns first, then enemies, pickups,
    /// doors, switches and finally the bare tile.
    pub fn cell_info(&self, x: u32, y: u32) -> Option<CellInfo> {
        let tile = self.grid.get(x, y).ok()?;
        let pos = TilePos::new(x, y);
        for slot in [SpawnSlot::One, SpawnSlot::Two] {
            if self.entities.spawn(slot).is_some_and(|s| s.pos == pos) {
                return Some(CellInfo::Spawn(slot));
            }
        }
        if let Some((index, e)) = self
            .entities
            .enemies()
            .iter()
            .enumerate()
            .find(|(_, e)| e.pos == pos)
        {
            return Some(CellInfo::Enemy {
                index,
                kind: e.kind,
                pos,
            });
        }
        if let Some((index, p)) = self
            .entities
            .pickups()
            .iter()
            .enumerate()
            .find(|(_, p)| p.pos == pos)
        {
            return Some(CellInfo::Pickup {
                index,
                kind: p.kind,
                pos,
            });
        }
        if tile.is_door() {
            let index = self.grid.scan(TileKind::is_door).position(|(p, _)| p == pos)?;
            return Some(CellInfo::Door { index });
        }
        if tile.is_switch() {
            let index = self.grid.scan(TileKind::is_switch).position(|(p, _)| p == pos)?;
            return Some(CellInfo::Switch {
                index,
                link: self.graph.link(index),
            });
        }
        Some(CellInfo::Tile(tile))
    }

    /// Deterministic hash of the level contents (not the event log), for
    /// comparing levels across save/load.
    pub fn state_hash(&self) -> u64 {
        let mut h: u64 = 0xcbf2_9ce4_8422_2325; // FNV offset basis
        let mix = |h: &mut u64, bytes: &[u8]| {
            for &b in bytes {
                *h ^= b as u64;
                *h = h.wrapping_mul(0x0100_0000_01b3);
            }
        };
        mix(&mut h, &self.grid.width().to_le_bytes());
        mix(&mut h, &self.grid.height().to_le_bytes());
        for tile in self.grid.tiles() {
            mix(&mut h, &[tile.id()]);
        }
        for spawn in self.entities.spawns() {
            match spawn {
                Some(s) => {
                    mix(&mut h, &[1]);
                    mix(&mut h, &s.pos.x.to_le_bytes());
                    mix(&mut h, &s.pos.y.to_le_bytes());
                    mix(&mut h, &s.angle.units().to_le_bytes());
                }
                None => mix(&mut h, &[0]),
            }
        }
        for e in self.entities.enemies() {
            mix(&mut h, &[e.kind.id()]);
            mix(&mut h, &e.pos.x.to_le_bytes());
            mix(&mut h, &e.pos.y.to_le_bytes());
            mix(&mut h, &e.angle.units().to_le_bytes());
        }
        mix(&mut h, &[0xff]);
        for p in self.entities.pickups() {
            mix(&mut h, &[p.kind.id()]);
            mix(&mut h, &p.pos.x.to_le_bytes());
            mix(&mut h, &p.pos.y.to_le_bytes());
        }
        mix(&mut h, &[0xff]);
        for link in self.graph.links() {
            mix(&mut h, &i64::from(*link).to_le_bytes());
        }
        for (pos, orientation) in self.graph.orientations() {
            mix(&mut h, &pos.x.to_le_bytes());
            mix(&mut h, &pos.y.to_le_bytes());
            mix(&mut h, orientation.code().as_bytes());
        }
        h
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_table_follows_switch_count_after_every_edit() {
        let mut level = Level::new(10, 10);
        let edits = [
            (2, 2, TileKind::Switch),
            (3, 2, TileKind::Switch),
            (4, 4, TileKind::Door),
            (2, 2, TileKind::Empty),
            (5, 5, TileKind::Switch),
            (0, 5, TileKind::Switch),
            (3, 2, TileKind::TechWall),
        ];
        for (x, y, t) in edits {
            level.set_tile(x, y, t).unwrap();
            assert_eq!(level.switches().len(), level.graph().links().len());
        }
    }

    #[test]
    fn too_many_switches_warns_but_applies() {
        let mut level = Level::new(10, 10);
        for x in 1..=4 {
            let edit = level.set_tile(x, 1, TileKind::Switch).unwrap();
            assert!(edit.warnings.is_empty());
        }
        let edit = level.set_tile(5, 1, TileKind::Switch).unwrap();
        assert_eq!(edit.stored, TileKind::Switch);
        assert_eq!(edit.warnings.len(), 1);
        assert_eq!(edit.warnings[0].kind, CapacityKind::Switches);
        assert_eq!(edit.warnings[0].found, 5);
        assert_eq!(level.switches().len(), 5);
        assert!(
            level
                .events()
                .iter()
                .any(|e| matches!(e, LevelEvent::CapacityExceeded(_)))
        );
    }

    #[test]
    fn too_many_doors_warns() {
        let mut level = Level::new(30, 4);
        for x in 1..=25 {
            level.set_tile(x, 1, TileKind::Door).unwrap();
        }
        let warnings = level.derived_capacity_warnings();
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].kind, CapacityKind::Doors);
        assert_eq!(warnings[0].found, 25);
    }

    #[test]
    fn resize_clears_links_and_drops_entities() {
        let mut level = Level::new(12, 12);
        level.set_tile(2, 2, TileKind::Switch).unwrap();
        level.set_tile(3, 3, TileKind::Door).unwrap();
        level.set_link(0, SwitchLink::Exit);
        level.place_spawn(SpawnSlot::One, TilePos::new(1, 1)).unwrap();
        level.add_enemy(EnemyKind::Imp, TilePos::new(10, 10)).unwrap();

        let dropped = level.resize(8, 8);
        assert_eq!(dropped, 1);
        assert_eq!(level.graph().links(), &[SwitchLink::Door(0)]);
        assert!(level.entities().enemies().is_empty());
        assert!(level.entities().spawn(SpawnSlot::One).is_some());
    }

    #[test]
    fn placement_outside_grid_is_refused() {
        let mut level = Level::new(8, 8);
        assert!(matches!(
            level.add_enemy(EnemyKind::Zombie, TilePos::new(8, 1)),
            Err(LevelError::OutOfBounds(_))
        ));
        assert!(level.place_spawn(SpawnSlot::Two, TilePos::new(1, 20)).is_err());
    }

    #[test]
    fn exit_and_door_links_example() {
        let mut level = Level::new(10, 10);
        level.set_tile(1, 1, TileKind::Door).unwrap();
        level.set_tile(2, 1, TileKind::KeyBlue).unwrap();
        level.set_tile(4, 4, TileKind::Switch).unwrap();
        level.set_tile(5, 4, TileKind::Switch).unwrap();
        level.set_link(0, SwitchLink::Exit);
        level.set_link(1, SwitchLink::Door(0));
        assert_eq!(level.graph().links(), &[SwitchLink::Exit, SwitchLink::Door(0)]);
        assert_eq!(
            level.cell_info(4, 4).unwrap().to_string(),
            "Switch 0 -> EXIT"
        );
        assert_eq!(
            level.cell_info(5, 4).unwrap().to_string(),
            "Switch 1 -> Door 0"
        );
    }

    #[test]
    fn cell_info_priority() {
        let mut level = Level::new(8, 8);
        level.set_tile(3, 3, TileKind::Door).unwrap();
        level.add_pickup(PickupKind::Shotgun, TilePos::new(3, 3)).unwrap();
        assert_eq!(level.cell_info(3, 3).unwrap().to_string(), "Shotgun (3,3)");
        level.add_enemy(EnemyKind::Demon, TilePos::new(3, 3)).unwrap();
        assert_eq!(level.cell_info(3, 3).unwrap().to_string(), "Demon (3,3)");
        level.place_spawn(SpawnSlot::Two, TilePos::new(3, 3)).unwrap();
        assert_eq!(level.cell_info(3, 3), Some(CellInfo::Spawn(SpawnSlot::Two)));
        assert_eq!(level.cell_info(2, 2), Some(CellInfo::Tile(TileKind::Empty)));
        assert_eq!(level.cell_info(0, 0).unwrap().to_string(), "STARTAN");
        assert_eq!(level.cell_info(8, 0), None);
    }

    #[test]
    fn events_are_recorded() {
        let mut level = Level::new(8, 8);
        level.set_tile(2, 2, TileKind::TechWall).unwrap();
        level.set_tile(2, 2, TileKind::TechWall).unwrap(); // no change, no event
        level.place_spawn(SpawnSlot::One, TilePos::new(1, 1)).unwrap();
        level.add_enemy(EnemyKind::Imp, TilePos::new(4, 4)).unwrap();
        assert_eq!(level.events().len(), 3);
        let drained = level.drain_events();
        assert_eq!(drained.len(), 3);
        assert!(level.events().is_empty());
    }

    #[test]
    fn state_hash_tracks_content() {
        let mut a = Level::new(8, 8);
        let mut b = Level::new(8, 8);
        assert_eq!(a.state_hash(), b.state_hash());
        a.set_tile(3, 3, TileKind::TechWall).unwrap();
        assert_ne!(a.state_hash(), b.state_hash());
        b.set_tile(3, 3, TileKind::TechWall).unwrap();
        assert_eq!(a.state_hash(), b.state_hash());
        a.set_door_orientation(TilePos::new(1, 1), DoorOrientation::EastWest);
        assert_ne!(a.state_hash(), b.state_hash());
    }
}
