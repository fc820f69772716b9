use serde::{Deserialize, Serialize};
use std::f32::consts::{FRAC_PI_2, TAU};
use std::fmt;

/// Kind of a single grid cell. The discriminant is the on-disk tile id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
#[repr(u8)]
pub enum TileKind {
    #[default]
    Empty = 0,
    StoneWallA = 1,
    StoneWallB = 2,
    TechWall = 3,
    Door = 4,
    Switch = 5,
    SecretBrick = 6,
    SecretStone = 7,
    SecretTech = 8,
    KeyRed = 9,
    KeyYellow = 10,
    KeyBlue = 11,
}

/// A tile id outside `0..=11`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("unknown tile id {0}")]
pub struct UnknownTile(pub u8);

impl TileKind {
    /// Every kind, in id order.
    pub const ALL: [TileKind; 12] = [
        TileKind::Empty,
        TileKind::StoneWallA,
        TileKind::StoneWallB,
        TileKind::TechWall,
        TileKind::Door,
        TileKind::Switch,
        TileKind::SecretBrick,
        TileKind::SecretStone,
        TileKind::SecretTech,
        TileKind::KeyRed,
        TileKind::KeyYellow,
        TileKind::KeyBlue,
    ];

    /// Wall written into border cells whenever they would otherwise be empty.
    pub const BORDER: TileKind = TileKind::StoneWallA;

    pub fn id(self) -> u8 {
        self as u8
    }

    pub fn name(self) -> &'static str {
        match self {
            TileKind::Empty => "Empty",
            TileKind::StoneWallA => "STARTAN",
            TileKind::StoneWallB => "STONE",
            TileKind::TechWall => "TECH",
            TileKind::Door => "DOOR",
            TileKind::Switch => "SWITCH",
            TileKind::SecretBrick => "Secret(Brick)",
            TileKind::SecretStone => "Secret(Stone)",
            TileKind::SecretTech => "Secret(Tech)",
            TileKind::KeyRed => "Key Red",
            TileKind::KeyYellow => "Key Yellow",
            TileKind::KeyBlue => "Key Blue",
        }
    }

    /// Door, secret doors and key doors.
    pub fn is_door(self) -> bool {
        matches!(
            self,
            TileKind::Door
                | TileKind::SecretBrick
                | TileKind::SecretStone
                | TileKind::SecretTech
                | TileKind::KeyRed
                | TileKind::KeyYellow
                | TileKind::KeyBlue
        )
    }

    pub fn is_switch(self) -> bool {
        self == TileKind::Switch
    }

    /// Tiles the preview camera and its rays pass straight through: every
    /// door-like kind plus switches.
    pub fn is_preview_passthrough(self) -> bool {
        self.is_door() || self.is_switch()
    }

    /// Whether this tile stops preview rays and preview movement.
    pub fn blocks_preview(self) -> bool {
        self != TileKind::Empty && !self.is_preview_passthrough()
    }
}

impl TryFrom<u8> for TileKind {
    type Error = UnknownTile;

    fn try_from(id: u8) -> Result<Self, Self::Error> {
        TileKind::ALL
            .get(usize::from(id))
            .copied()
            .ok_or(UnknownTile(id))
    }
}

impl From<TileKind> for u8 {
    fn from(kind: TileKind) -> u8 {
        kind.id()
    }
}

impl fmt::Display for TileKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Integer tile coordinate. `x` grows east, `y` grows south.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: u32,
    pub y: u32,
}

impl TilePos {
    pub fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// World-space centre of the tile.
    pub fn center(self) -> glam::Vec2 {
        glam::Vec2::new(self.x as f32 + 0.5, self.y as f32 + 0.5)
    }
}

impl fmt::Display for TilePos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x, self.y)
    }
}

/// Orientation in angle units: 1024 units make a full turn and 0 faces
/// north (towards decreasing `y`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(from = "u16", into = "u16")]
pub struct Angle(u16);

impl Angle {
    pub const FULL_TURN: u16 = 1024;
    pub const NORTH: Angle = Angle(0);
    pub const EAST: Angle = Angle(256);
    pub const SOUTH: Angle = Angle(512);
    pub const WEST: Angle = Angle(768);

    /// Wraps any value into `0..1024`.
    pub fn new(units: i32) -> Self {
        Self(units.rem_euclid(i32::from(Self::FULL_TURN)) as u16)
    }

    pub fn units(self) -> u16 {
        self.0
    }

    /// Rotate by a signed number of units, wrapping.
    pub fn rotated(self, delta: i32) -> Self {
        Self::new(i32::from(self.0) + delta)
    }

    /// Clockwise angle from north, in radians (`0..TAU`).
    pub fn radians(self) -> f32 {
        f32::from(self.0) / f32::from(Self::FULL_TURN) * TAU
    }

    /// Angle of the facing direction in screen convention, where `(cos, sin)`
    /// gives the unit vector with `y` pointing south.
    pub fn screen_radians(self) -> f32 {
        self.radians() - FRAC_PI_2
    }

    /// Unit vector of the facing direction.
    pub fn direction(self) -> glam::Vec2 {
        let a = self.screen_radians();
        glam::Vec2::new(a.cos(), a.sin())
    }

    /// Which of the eight 45-degree buckets this angle falls into.
    pub fn octant(self) -> u8 {
        (self.0 / (Self::FULL_TURN / 8)) as u8
    }
}

impl From<u16> for Angle {
    fn from(units: u16) -> Self {
        Self::new(i32::from(units))
    }
}

impl From<Angle> for u16 {
    fn from(angle: Angle) -> u16 {
        angle.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tile_ids_roundtrip() {
        for kind in TileKind::ALL {
            assert_eq!(TileKind::try_from(kind.id()), Ok(kind));
        }
        assert_eq!(TileKind::try_from(12), Err(UnknownTile(12)));
    }

    #[test]
    fn tile_partitions() {
        let doors = TileKind::ALL.iter().filter(|t| t.is_door()).count();
        let passthrough = TileKind::ALL
            .iter()
            .filter(|t| t.is_preview_passthrough())
            .count();
        assert_eq!(doors, 7);
        assert_eq!(passthrough, 8);
        assert!(!TileKind::Empty.blocks_preview());
        assert!(!TileKind::Switch.blocks_preview());
        assert!(!TileKind::KeyBlue.blocks_preview());
        assert!(TileKind::StoneWallA.blocks_preview());
        assert!(TileKind::TechWall.blocks_preview());
    }

    #[test]
    fn angle_wraps() {
        assert_eq!(Angle::new(1024).units(), 0);
        assert_eq!(Angle::new(-4).units(), 1020);
        assert_eq!(Angle::from(2000).units(), 976);
        assert_eq!(Angle::new(1020).rotated(4), Angle::NORTH);
    }

    #[test]
    fn angle_direction_north_is_negative_y() {
        let d = Angle::NORTH.direction();
        assert!(d.x.abs() < 1e-6);
        assert!((d.y + 1.0).abs() < 1e-6);
        let e = Angle::EAST.direction();
        assert!((e.x - 1.0).abs() < 1e-6);
        assert!(e.y.abs() < 1e-6);
    }

    #[test]
    fn angle_octants() {
        assert_eq!(Angle::new(0).octant(), 0);
        assert_eq!(Angle::new(127).octant(), 0);
        assert_eq!(Angle::new(128).octant(), 1);
        assert_eq!(Angle::new(1023).octant(), 7);
    }

    #[test]
    fn tile_center_is_offset_by_half() {
        let c = TilePos::new(3, 4).center();
        assert_eq!(c, glam::Vec2::new(3.5, 4.5));
    }
}
