//! Developer tooling: read-only views over a level for the CLI and debugging.
//!
//! # Invariants
//! - Tools never mutate the level.

pub mod inspector;

pub use inspector::{CountLine, DoorInfo, EntityLine, LevelInspector, LevelSummary, SwitchInfo};
