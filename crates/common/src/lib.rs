//! Shared value types for the level model, the preview renderer and the
//! persistence layer.
//!
//! # Invariants
//! - Tile ids are stable on the wire (0-11) and never renumbered.
//! - Angles are always stored wrapped into `0..1024`.

mod kinds;
mod types;

pub use kinds::{EnemyKind, PickupKind, UnknownKind};
pub use types::{Angle, TileKind, TilePos, UnknownTile};

/// Game-imposed capacity limits. These mirror the fixed-size tables of the
/// target runtime and must not drift from it.
pub mod limits {
    pub const MAX_ENEMIES: usize = 21;
    pub const MAX_PICKUPS: usize = 16;
    pub const MAX_DOORS: usize = 24;
    pub const MAX_SWITCHES: usize = 4;
}
