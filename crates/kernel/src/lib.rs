//! Level kernel: the authoritative tile grid, the door/switch topology derived
//! from it, and the entity registry.
//!
//! # Invariants
//! - Every border cell holds a non-empty tile.
//! - The switch link table has exactly one entry per switch tile after any
//!   grid mutation.
//! - Enemy and pickup counts never exceed the game limits.
//! - All state mutations flow through explicit operations on [`Level`].

pub mod entities;
pub mod graph;
pub mod grid;
pub mod level;

pub use entities::{
    CapacityError, CapacityKind, CapacityWarning, Enemy, EntityRegistry, Pickup, Spawn, SpawnSlot,
};
pub use graph::{
    Door, DoorOrientation, DoorSwitchGraph, InvalidLink, LinkTarget, Switch, SwitchLink,
    scan_doors, scan_switches,
};
pub use grid::{OutOfBounds, TileGrid};
pub use level::{CellInfo, Level, LevelError, LevelEvent, TileEdit};
