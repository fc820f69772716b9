//! Flat colours used whenever no texture is loaded.

use raylevel_common::{EnemyKind, PickupKind, TileKind};
use serde::{Deserialize, Serialize};

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgba(pub [u8; 4]);

impl Rgba {
    pub const WHITE: Rgba = Rgba::hex(0xffffff);
    pub const TRANSPARENT: Rgba = Rgba([0, 0, 0, 0]);

    /// Opaque colour from `0xRRGGBB`.
    pub const fn hex(rgb: u32) -> Self {
        Self([(rgb >> 16) as u8, (rgb >> 8) as u8, rgb as u8, 0xff])
    }

    pub fn alpha(self) -> u8 {
        self.0[3]
    }

    /// `self` drawn over `dst` with the given extra opacity.
    pub fn over(self, dst: Rgba, opacity: f32) -> Rgba {
        let a = (f32::from(self.alpha()) / 255.0 * opacity).clamp(0.0, 1.0);
        let mix = |s: u8, d: u8| (f32::from(s) * a + f32::from(d) * (1.0 - a)).round() as u8;
        Rgba([
            mix(self.0[0], dst.0[0]),
            mix(self.0[1], dst.0[1]),
            mix(self.0[2], dst.0[2]),
            dst.alpha().max((a * 255.0).round() as u8),
        ])
    }
}

pub const CEILING: Rgba = Rgba::hex(0x1a1a2a);
pub const FLOOR: Rgba = Rgba::hex(0x2a1a1a);
pub const SPAWN_MARKER: Rgba = Rgba::hex(0x00aa55);

const WALL_COLORS: [Rgba; 12] = [
    Rgba::hex(0x1a0a0a),
    Rgba::hex(0x8b4513),
    Rgba::hex(0x555555),
    Rgba::hex(0x4a4a6a),
    Rgba::hex(0x6a3a2a),
    Rgba::hex(0x5a4a3a),
    Rgba::hex(0x7a3525),
    Rgba::hex(0x454545),
    Rgba::hex(0x3a3a5a),
    Rgba::hex(0x8b2a2a),
    Rgba::hex(0x8b7a2a),
    Rgba::hex(0x2a4a8b),
];

const ENEMY_COLORS: [Rgba; 4] = [
    Rgba::hex(0xe05050),
    Rgba::hex(0x8b8b00),
    Rgba::hex(0xe08020),
    Rgba::hex(0xa020a0),
];

const PICKUP_COLORS: [Rgba; 8] = [
    Rgba::hex(0xffcc00),
    Rgba::hex(0x50ff50),
    Rgba::hex(0x50ffff),
    Rgba::hex(0xff9050),
    Rgba::hex(0xc0c0c0),
    Rgba::hex(0x8080ff),
    Rgba::hex(0xffa060),
    Rgba::hex(0xff4040),
];

pub fn wall_color(tile: TileKind) -> Rgba {
    WALL_COLORS[usize::from(tile.id())]
}

pub fn enemy_color(kind: EnemyKind) -> Rgba {
    ENEMY_COLORS[usize::from(kind.id())]
}

pub fn pickup_color(kind: PickupKind) -> Rgba {
    PICKUP_COLORS[usize::from(kind.id())]
}
