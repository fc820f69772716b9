use raylevel_common::{Angle, EnemyKind, PickupKind, TilePos, limits};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Player start. Two slots exist; slot one also seeds the preview camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Spawn {
    pub pos: TilePos,
    pub angle: Angle,
}

impl Spawn {
    /// Facing given to newly placed spawns and to loaded spawns without one.
    pub const DEFAULT_ANGLE: Angle = Angle::SOUTH;

    pub fn new(pos: TilePos) -> Self {
        Self {
            pos,
            angle: Self::DEFAULT_ANGLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpawnSlot {
    One,
    Two,
}

impl SpawnSlot {
    fn index(self) -> usize {
        match self {
            SpawnSlot::One => 0,
            SpawnSlot::Two => 1,
        }
    }
}

impl fmt::Display for SpawnSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpawnSlot::One => f.write_str("Spawn 1"),
            SpawnSlot::Two => f.write_str("Spawn 2"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Enemy {
    pub kind: EnemyKind,
    pub pos: TilePos,
    pub angle: Angle,
}

impl Enemy {
    /// Facing given to newly placed enemies and to loaded ones without one.
    pub const DEFAULT_ANGLE: Angle = Angle::NORTH;

    pub fn new(kind: EnemyKind, pos: TilePos) -> Self {
        Self {
            kind,
            pos,
            angle: Self::DEFAULT_ANGLE,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pickup {
    pub kind: PickupKind,
    pub pos: TilePos,
}

/// What a capacity limit applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CapacityKind {
    Enemies,
    Pickups,
    Doors,
    Switches,
}

impl CapacityKind {
    pub fn limit(self) -> usize {
        match self {
            CapacityKind::Enemies => limits::MAX_ENEMIES,
            CapacityKind::Pickups => limits::MAX_PICKUPS,
            CapacityKind::Doors => limits::MAX_DOORS,
            CapacityKind::Switches => limits::MAX_SWITCHES,
        }
    }
}

impl fmt::Display for CapacityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CapacityKind::Enemies => "enemies",
            CapacityKind::Pickups => "pickups",
            CapacityKind::Doors => "doors",
            CapacityKind::Switches => "switches",
        })
    }
}

/// An interactive placement refused because the table is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("max {kind} reached ({limit})")]
pub struct CapacityError {
    pub kind: CapacityKind,
    pub limit: usize,
}

/// A non-fatal overrun: either a bulk load was trimmed or a derived count
/// (doors, switches) went past the game limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapacityWarning {
    pub kind: CapacityKind,
    /// Count before trimming, or the derived count.
    pub found: usize,
    pub limit: usize,
}

impl fmt::Display for CapacityWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} exceed the game limit of {}",
            self.found, self.kind, self.limit
        )
    }
}

/// Spawn points, enemies and pickups.
///
/// Enemy and pickup counts never exceed the game limits: interactive adds
/// are refused at the limit and bulk loads are truncated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntityRegistry {
    spawns: [Option<Spawn>; 2],
    enemies: Vec<Enemy>,
    pickups: Vec<Pickup>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bulk load. Over-capacity lists are truncated and reported.
    pub fn from_parts(
        spawns: [Option<Spawn>; 2],
        mut enemies: Vec<Enemy>,
        mut pickups: Vec<Pickup>,
    ) -> (Self, Vec<CapacityWarning>) {
        let mut warnings = Vec::new();
        if enemies.len() > limits::MAX_ENEMIES {
            warnings.push(CapacityWarning {
                kind: CapacityKind::Enemies,
                found: enemies.len(),
                limit: limits::MAX_ENEMIES,
            });
            enemies.truncate(limits::MAX_ENEMIES);
        }
        if pickups.len() > limits::MAX_PICKUPS {
            warnings.push(CapacityWarning {
                kind: CapacityKind::Pickups,
                found: pickups.len(),
                limit: limits::MAX_PICKUPS,
            });
            pickups.truncate(limits::MAX_PICKUPS);
        }
        let registry = Self {
            spawns,
            enemies,
            pickups,
        };
        (registry, warnings)
    }

    pub fn spawn(&self, slot: SpawnSlot) -> Option<Spawn> {
        self.spawns[slot.index()]
    }

    pub fn spawns(&self) -> [Option<Spawn>; 2] {
        self.spawns
    }

    /// Place (or move) a spawn. A freshly placed spawn faces the default angle.
    pub fn place_spawn(&mut self, slot: SpawnSlot, pos: TilePos) -> Spawn {
        let spawn = Spawn::new(pos);
        self.spawns[slot.index()] = Some(spawn);
        spawn
    }

    pub fn set_spawn_angle(&mut self, slot: SpawnSlot, angle: Angle) -> bool {
        match &mut self.spawns[slot.index()] {
            Some(spawn) => {
                spawn.angle = angle;
                true
            }
            None => false,
        }
    }

    pub fn clear_spawn(&mut self, slot: SpawnSlot) -> Option<Spawn> {
        self.spawns[slot.index()].take()
    }

    pub fn enemies(&self) -> &[Enemy] {
        &self.enemies
    }

    pub fn add_enemy(&mut self, kind: EnemyKind, pos: TilePos) -> Result<usize, CapacityError> {
        if self.enemies.len() >= limits::MAX_ENEMIES {
            return Err(CapacityError {
                kind: CapacityKind::Enemies,
                limit: limits::MAX_ENEMIES,
            });
        }
        self.enemies.push(Enemy::new(kind, pos));
        Ok(self.enemies.len() - 1)
    }

    pub fn remove_enemy(&mut self, index: usize) -> Option<Enemy> {
        (index < self.enemies.len()).then(|| self.enemies.remove(index))
    }

    pub fn set_enemy_angle(&mut self, index: usize, angle: Angle) -> bool {
        match self.enemies.get_mut(index) {
            Some(enemy) => {
                enemy.angle = angle;
                true
            }
            None => false,
        }
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn add_pickup(&mut self, kind: PickupKind, pos: TilePos) -> Result<usize, CapacityError> {
        if self.pickups.len() >= limits::MAX_PICKUPS {
            return Err(CapacityError {
                kind: CapacityKind::Pickups,
                limit: limits::MAX_PICKUPS,
            });
        }
        self.pickups.push(Pickup { kind, pos });
        Ok(self.pickups.len() - 1)
    }

    pub fn remove_pickup(&mut self, index: usize) -> Option<Pickup> {
        (index < self.pickups.len()).then(|| self.pickups.remove(index))
    }

    /// Drop everything whose tile lies outside a `width` x `height` grid.
    /// Returns how many records were dropped.
    pub fn retain_within(&mut self, width: u32, height: u32) -> usize {
        let inside = |p: TilePos| p.x < width && p.y < height;
        let before = self.len();
        for slot in &mut self.spawns {
            if slot.is_some_and(|s| !inside(s.pos)) {
                *slot = None;
            }
        }
        self.enemies.retain(|e| inside(e.pos));
        self.pickups.retain(|p| inside(p.pos));
        before - self.len()
    }

    /// Total number of records, spawns included.
    pub fn len(&self) -> usize {
        self.spawns.iter().flatten().count() + self.enemies.len() + self.pickups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_defaults_to_south() {
        let mut reg = EntityRegistry::new();
        let spawn = reg.place_spawn(SpawnSlot::One, TilePos::new(2, 3));
        assert_eq!(spawn.angle.units(), 512);
        assert_eq!(reg.spawn(SpawnSlot::One), Some(spawn));
        assert_eq!(reg.spawn(SpawnSlot::Two), None);
    }

    #[test]
    fn enemy_capacity_is_enforced() {
        let mut reg = EntityRegistry::new();
        for i in 0..limits::MAX_ENEMIES {
            assert_eq!(reg.add_enemy(EnemyKind::Imp, TilePos::new(1, 1)), Ok(i));
        }
        let err = reg.add_enemy(EnemyKind::Imp, TilePos::new(1, 1)).unwrap_err();
        assert_eq!(err.kind, CapacityKind::Enemies);
        assert_eq!(err.limit, 21);
        assert_eq!(reg.enemies().len(), 21);
    }

    #[test]
    fn pickup_capacity_is_enforced() {
        let mut reg = EntityRegistry::new();
        for _ in 0..limits::MAX_PICKUPS {
            reg.add_pickup(PickupKind::Armor, TilePos::new(2, 2)).unwrap();
        }
        assert!(reg.add_pickup(PickupKind::Armor, TilePos::new(2, 2)).is_err());
        assert_eq!(reg.pickups().len(), 16);
    }

    #[test]
    fn bulk_load_truncates_with_warnings() {
        let enemies = vec![Enemy::new(EnemyKind::Zombie, TilePos::new(1, 1)); 30];
        let pickups = vec![
            Pickup {
                kind: PickupKind::Shells,
                pos: TilePos::new(1, 2)
            };
            5
        ];
        let (reg, warnings) = EntityRegistry::from_parts([None, None], enemies, pickups);
        assert_eq!(reg.enemies().len(), 21);
        assert_eq!(reg.pickups().len(), 5);
        assert_eq!(warnings.len(), 1);
        assert_eq!(warnings[0].found, 30);
        assert_eq!(warnings[0].kind, CapacityKind::Enemies);
    }

    #[test]
    fn retain_within_drops_out_of_bounds() {
        let mut reg = EntityRegistry::new();
        reg.place_spawn(SpawnSlot::One, TilePos::new(1, 1));
        reg.place_spawn(SpawnSlot::Two, TilePos::new(9, 1));
        reg.add_enemy(EnemyKind::Demon, TilePos::new(2, 9)).unwrap();
        reg.add_enemy(EnemyKind::Demon, TilePos::new(2, 2)).unwrap();
        reg.add_pickup(PickupKind::Helmet, TilePos::new(7, 7)).unwrap();

        let dropped = reg.retain_within(8, 8);
        assert_eq!(dropped, 2);
        assert!(reg.spawn(SpawnSlot::One).is_some());
        assert!(reg.spawn(SpawnSlot::Two).is_none());
        assert_eq!(reg.enemies().len(), 1);
        assert_eq!(reg.pickups().len(), 1);
    }

    #[test]
    fn remove_and_reorient() {
        let mut reg = EntityRegistry::new();
        reg.add_enemy(EnemyKind::Sergeant, TilePos::new(3, 3)).unwrap();
        assert!(reg.set_enemy_angle(0, Angle::new(384)));
        assert_eq!(reg.enemies()[0].angle.units(), 384);
        assert!(!reg.set_enemy_angle(1, Angle::NORTH));
        assert!(reg.remove_enemy(0).is_some());
        assert!(reg.remove_enemy(0).is_none());
    }
}
