//! Doors and switches derived from the grid.
//!
//! Neither doors nor switches are stored: both are recomputed by a row-major
//! scan, and a switch's identity is its position in that scan. The link
//! table is indexed by that scan position, so editing the grid can shift
//! which switch (or door) an index refers to. Links are not repaired when
//! that happens; callers that need referential integrity must check
//! [`DoorSwitchGraph::resolve`].

use crate::grid::TileGrid;
use raylevel_common::{TileKind, TilePos};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// What a switch triggers. On the wire this is `-1` for the level exit and a
/// door scan index otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub enum SwitchLink {
    Exit,
    Door(usize),
}

impl SwitchLink {
    pub const EXIT_SENTINEL: i64 = -1;
}

impl Default for SwitchLink {
    fn default() -> Self {
        SwitchLink::Door(0)
    }
}

/// A stored link value other than `-1` or a non-negative door index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("invalid switch link {0}")]
pub struct InvalidLink(pub i64);

impl TryFrom<i64> for SwitchLink {
    type Error = InvalidLink;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            SwitchLink::EXIT_SENTINEL => Ok(SwitchLink::Exit),
            n if n >= 0 => usize::try_from(n)
                .map(SwitchLink::Door)
                .map_err(|_| InvalidLink(n)),
            n => Err(InvalidLink(n)),
        }
    }
}

impl From<SwitchLink> for i64 {
    fn from(link: SwitchLink) -> i64 {
        match link {
            SwitchLink::Exit => SwitchLink::EXIT_SENTINEL,
            SwitchLink::Door(n) => n as i64,
        }
    }
}

impl fmt::Display for SwitchLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SwitchLink::Exit => f.write_str("EXIT"),
            SwitchLink::Door(n) => write!(f, "Door {n}"),
        }
    }
}

/// Which way a door's wall runs. A north-south wall is approached from the
/// east or west.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum DoorOrientation {
    #[default]
    #[serde(rename = "ns")]
    NorthSouth,
    #[serde(rename = "ew")]
    EastWest,
}

impl DoorOrientation {
    pub fn code(self) -> &'static str {
        match self {
            DoorOrientation::NorthSouth => "ns",
            DoorOrientation::EastWest => "ew",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "ns" => Some(DoorOrientation::NorthSouth),
            "ew" => Some(DoorOrientation::EastWest),
            _ => None,
        }
    }
}

/// A door-like tile found by the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Door {
    pub index: usize,
    pub pos: TilePos,
    pub tile: TileKind,
}

/// A switch tile found by the scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Switch {
    pub index: usize,
    pub pos: TilePos,
}

/// Where a stored link actually points given the current door list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkTarget {
    Exit,
    Door(Door),
    /// The stored door index is past the end of the current door list.
    Dangling(usize),
}

/// Fresh row-major scan for door-like tiles.
pub fn scan_doors(grid: &TileGrid) -> Vec<Door> {
    grid.scan(TileKind::is_door)
        .enumerate()
        .map(|(index, (pos, tile))| Door { index, pos, tile })
        .collect()
}

/// Fresh row-major scan for switch tiles.
pub fn scan_switches(grid: &TileGrid) -> Vec<Switch> {
    grid.scan(TileKind::is_switch)
        .enumerate()
        .map(|(index, (pos, _))| Switch { index, pos })
        .collect()
}

/// Switch link table plus per-position door orientations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DoorSwitchGraph {
    links: Vec<SwitchLink>,
    orientations: BTreeMap<TilePos, DoorOrientation>,
}

impl DoorSwitchGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild from stored parts (bulk load). Call [`Self::sync`] afterwards.
    pub fn from_parts(
        links: Vec<SwitchLink>,
        orientations: BTreeMap<TilePos, DoorOrientation>,
    ) -> Self {
        Self {
            links,
            orientations,
        }
    }

    /// One entry per switch, in scan order.
    pub fn links(&self) -> &[SwitchLink] {
        &self.links
    }

    pub fn link(&self, switch_index: usize) -> Option<SwitchLink> {
        self.links.get(switch_index).copied()
    }

    /// Store a link for an existing switch slot. The door index is not
    /// checked against the current door count. Returns `false` when there
    /// is no such switch slot.
    pub fn set_link(&mut self, switch_index: usize, link: SwitchLink) -> bool {
        match self.links.get_mut(switch_index) {
            Some(slot) => {
                *slot = link;
                true
            }
            None => false,
        }
    }

    /// Resize the link table to the grid's current switch count. Existing
    /// leading entries are kept; new trailing entries default to door 0.
    /// Returns the switch count.
    pub fn sync(&mut self, grid: &TileGrid) -> usize {
        let count = grid.scan(TileKind::is_switch).count();
        self.links.resize(count, SwitchLink::default());
        count
    }

    pub fn clear_links(&mut self) {
        self.links.clear();
    }

    /// Orientation of the door at `pos`, north-south unless set otherwise.
    pub fn orientation_of(&self, pos: TilePos) -> DoorOrientation {
        self.orientations.get(&pos).copied().unwrap_or_default()
    }

    pub fn set_orientation(&mut self, pos: TilePos, orientation: DoorOrientation) {
        self.orientations.insert(pos, orientation);
    }

    /// Orientations that were explicitly set, keyed by position.
    pub fn orientations(&self) -> &BTreeMap<TilePos, DoorOrientation> {
        &self.orientations
    }

    /// Resolve a switch's link against a door list from [`scan_doors`].
    pub fn resolve(&self, switch_index: usize, doors: &[Door]) -> Option<LinkTarget> {
        self.link(switch_index).map(|link| match link {
            SwitchLink::Exit => LinkTarget::Exit,
            SwitchLink::Door(n) => doors
                .get(n)
                .map_or(LinkTarget::Dangling(n), |d| LinkTarget::Door(*d)),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid_with(tiles: &[(u32, u32, TileKind)]) -> TileGrid {
        let mut grid = TileGrid::new(8, 8);
        for &(x, y, t) in tiles {
            grid.set(x, y, t).unwrap();
        }
        grid
    }

    #[test]
    fn scans_are_row_major() {
        let grid = grid_with(&[
            (5, 1, TileKind::Door),
            (2, 3, TileKind::KeyRed),
            (1, 1, TileKind::SecretTech),
            (3, 2, TileKind::Switch),
            (6, 1, TileKind::Switch),
        ]);
        let doors = scan_doors(&grid);
        assert_eq!(doors.len(), 3);
        assert_eq!(doors[0].pos, TilePos::new(1, 1));
        assert_eq!(doors[1].pos, TilePos::new(5, 1));
        assert_eq!(doors[2].tile, TileKind::KeyRed);

        let switches = scan_switches(&grid);
        assert_eq!(switches.len(), 2);
        assert_eq!(switches[0].pos, TilePos::new(6, 1));
        assert_eq!(switches[1].index, 1);
    }

    #[test]
    fn sync_tracks_switch_count() {
        let mut grid = grid_with(&[(2, 2, TileKind::Switch)]);
        let mut graph = DoorSwitchGraph::new();
        assert_eq!(graph.sync(&grid), 1);
        assert_eq!(graph.links(), &[SwitchLink::Door(0)]);

        graph.set_link(0, SwitchLink::Exit);
        grid.set(4, 4, TileKind::Switch).unwrap();
        graph.sync(&grid);
        assert_eq!(graph.links(), &[SwitchLink::Exit, SwitchLink::Door(0)]);

        grid.set(4, 4, TileKind::Empty).unwrap();
        graph.sync(&grid);
        assert_eq!(graph.links(), &[SwitchLink::Exit]);
    }

    #[test]
    fn links_are_not_reassociated_on_renumbering() {
        let mut grid = grid_with(&[(2, 4, TileKind::Switch), (2, 5, TileKind::Switch)]);
        let mut graph = DoorSwitchGraph::new();
        graph.sync(&grid);
        graph.set_link(0, SwitchLink::Exit);
        graph.set_link(1, SwitchLink::Door(3));

        // A new switch earlier in scan order shifts the others down by one.
        grid.set(1, 1, TileKind::Switch).unwrap();
        graph.sync(&grid);
        assert_eq!(
            graph.links(),
            &[SwitchLink::Exit, SwitchLink::Door(3), SwitchLink::Door(0)]
        );
    }

    #[test]
    fn set_link_skips_validation_but_needs_a_slot() {
        let grid = grid_with(&[(2, 2, TileKind::Switch)]);
        let mut graph = DoorSwitchGraph::new();
        graph.sync(&grid);
        assert!(graph.set_link(0, SwitchLink::Door(99)));
        assert!(!graph.set_link(1, SwitchLink::Exit));
        assert_eq!(graph.resolve(0, &scan_doors(&grid)), Some(LinkTarget::Dangling(99)));
    }

    #[test]
    fn exit_and_door_links_resolve() {
        let grid = grid_with(&[
            (1, 1, TileKind::Door),
            (2, 1, TileKind::Door),
            (3, 3, TileKind::Switch),
            (4, 3, TileKind::Switch),
        ]);
        let mut graph = DoorSwitchGraph::new();
        graph.sync(&grid);
        graph.set_link(0, SwitchLink::Exit);
        graph.set_link(1, SwitchLink::Door(0));
        let doors = scan_doors(&grid);
        assert_eq!(graph.resolve(0, &doors), Some(LinkTarget::Exit));
        match graph.resolve(1, &doors) {
            Some(LinkTarget::Door(d)) => assert_eq!(d.pos, TilePos::new(1, 1)),
            other => panic!("expected door link, got {other:?}"),
        }
        assert_eq!(graph.resolve(2, &doors), None);
    }

    #[test]
    fn orientation_defaults_and_is_keyed_by_position() {
        let mut graph = DoorSwitchGraph::new();
        let pos = TilePos::new(3, 4);
        assert_eq!(graph.orientation_of(pos), DoorOrientation::NorthSouth);
        graph.set_orientation(pos, DoorOrientation::EastWest);
        assert_eq!(graph.orientation_of(pos), DoorOrientation::EastWest);
        assert_eq!(graph.orientation_of(TilePos::new(4, 3)), DoorOrientation::NorthSouth);
    }

    #[test]
    fn link_wire_values() {
        assert_eq!(SwitchLink::try_from(-1), Ok(SwitchLink::Exit));
        assert_eq!(SwitchLink::try_from(2), Ok(SwitchLink::Door(2)));
        assert_eq!(SwitchLink::try_from(-3), Err(InvalidLink(-3)));
        assert_eq!(i64::from(SwitchLink::Exit), -1);
        assert_eq!(SwitchLink::Exit.to_string(), "EXIT");
        assert_eq!(SwitchLink::Door(4).to_string(), "Door 4");
    }
}
