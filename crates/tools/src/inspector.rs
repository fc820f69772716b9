use raylevel_common::{Angle, TilePos, limits};
use raylevel_kernel::{CellInfo, DoorOrientation, Level, LinkTarget, SpawnSlot};
use serde::Serialize;
use std::fmt;

/// Level inspector for developer tooling.
///
/// Provides read-only queries against a level: capacity summaries, the
/// door and switch lists in scan order, entity listings and per-cell info.
pub struct LevelInspector;

impl LevelInspector {
    /// Produce a summary of the level state.
    pub fn summary(level: &Level) -> LevelSummary {
        let entities = level.entities();
        LevelSummary {
            width: level.width(),
            height: level.height(),
            enemies: CountLine::new(entities.enemies().len(), limits::MAX_ENEMIES),
            pickups: CountLine::new(entities.pickups().len(), limits::MAX_PICKUPS),
            doors: CountLine::new(level.doors().len(), limits::MAX_DOORS),
            switches: CountLine::new(level.switches().len(), limits::MAX_SWITCHES),
            spawns: entities.spawns().iter().filter(|s| s.is_some()).count(),
            state_hash: level.state_hash(),
        }
    }

    /// Doors in scan order with their orientation.
    pub fn doors(level: &Level) -> Vec<DoorInfo> {
        level
            .doors()
            .into_iter()
            .map(|door| DoorInfo {
                index: door.index,
                pos: door.pos,
                tile: door.tile.name(),
                orientation: level.graph().orientation_of(door.pos),
            })
            .collect()
    }

    /// Switches in scan order with what their stored link resolves to.
    pub fn switches(level: &Level) -> Vec<SwitchInfo> {
        let doors = level.doors();
        level
            .switches()
            .into_iter()
            .map(|switch| SwitchInfo {
                index: switch.index,
                pos: switch.pos,
                target: level.graph().resolve(switch.index, &doors),
            })
            .collect()
    }

    /// Spawns, enemies and pickups, one line each.
    pub fn entities(level: &Level) -> Vec<EntityLine> {
        let entities = level.entities();
        let spawns = [SpawnSlot::One, SpawnSlot::Two]
            .into_iter()
            .filter_map(|slot| {
                entities.spawn(slot).map(|s| EntityLine {
                    label: slot.to_string(),
                    pos: s.pos,
                    angle: Some(s.angle),
                })
            });
        let enemies = entities.enemies().iter().enumerate().map(|(i, e)| EntityLine {
            label: format!("Enemy {i}: {}", e.kind),
            pos: e.pos,
            angle: Some(e.angle),
        });
        let pickups = entities.pickups().iter().enumerate().map(|(i, p)| EntityLine {
            label: format!("Pickup {i}: {}", p.kind),
            pos: p.pos,
            angle: None,
        });
        spawns.chain(enemies).chain(pickups).collect()
    }

    /// What occupies a cell, or `None` outside the grid.
    pub fn cell(level: &Level, x: u32, y: u32) -> Option<CellInfo> {
        level.cell_info(x, y)
    }
}

/// A count against its game limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CountLine {
    pub count: usize,
    pub limit: usize,
}

impl CountLine {
    fn new(count: usize, limit: usize) -> Self {
        Self { count, limit }
    }

    pub fn over_limit(&self) -> bool {
        self.count > self.limit
    }
}

impl fmt::Display for CountLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.count, self.limit)?;
        if self.over_limit() {
            f.write_str(" (over limit)")?;
        }
        Ok(())
    }
}

/// Summary of level state for the inspector.
#[derive(Debug, Clone, Serialize)]
pub struct LevelSummary {
    pub width: u32,
    pub height: u32,
    pub enemies: CountLine,
    pub pickups: CountLine,
    pub doors: CountLine,
    pub switches: CountLine,
    pub spawns: usize,
    pub state_hash: u64,
}

impl LevelSummary {
    /// Whether any count is past its limit.
    pub fn has_overruns(&self) -> bool {
        [self.enemies, self.pickups, self.doors, self.switches]
            .iter()
            .any(CountLine::over_limit)
    }
}

impl fmt::Display for LevelSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Level: {}x{} spawns={} enemies={} pickups={} doors={} switches={} hash={:016x}",
            self.width,
            self.height,
            self.spawns,
            self.enemies,
            self.pickups,
            self.doors,
            self.switches,
            self.state_hash
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DoorInfo {
    pub index: usize,
    pub pos: TilePos,
    pub tile: &'static str,
    pub orientation: DoorOrientation,
}

impl fmt::Display for DoorInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Door {} ({}) {} {}",
            self.index,
            self.pos,
            self.tile,
            self.orientation.code()
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitchInfo {
    pub index: usize,
    pub pos: TilePos,
    pub target: Option<LinkTarget>,
}

impl fmt::Display for SwitchInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Switch {} ({})", self.index, self.pos)?;
        match self.target {
            Some(LinkTarget::Exit) => f.write_str(" -> EXIT"),
            Some(LinkTarget::Door(door)) => write!(f, " -> Door {} ({})", door.index, door.pos),
            Some(LinkTarget::Dangling(n)) => write!(f, " -> Door {n} (missing)"),
            None => f.write_str(" -> unlinked"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityLine {
    pub label: String,
    pub pos: TilePos,
    pub angle: Option<Angle>,
}

impl fmt::Display for EntityLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at ({})", self.label, self.pos)?;
        if let Some(angle) = self.angle {
            write!(f, " angle={}", angle.units())?;
        }
        Ok(())
    }
}
