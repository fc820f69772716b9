use crate::config::MotionConfig;
use crate::preview::{PreviewController, PreviewState};
use raylevel_common::{Angle, EnemyKind, PickupKind, TileKind, TilePos};
use raylevel_input::Intents;
use raylevel_kernel::{
    CapacityError, DoorOrientation, Enemy, Level, LevelError, LevelEvent, OutOfBounds, Pickup,
    Spawn, SpawnSlot, SwitchLink, TileEdit,
};

/// A one-shot placement tool. After a successful placement the session goes
/// back to painting with the current brush.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    Spawn(SpawnSlot),
    Enemy(EnemyKind),
    Pickup(PickupKind),
}

/// What a grid click did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClickOutcome {
    Painted { pos: TilePos, edit: TileEdit },
    SpawnPlaced { slot: SpawnSlot, spawn: Spawn },
    EnemyPlaced { index: usize },
    PickupPlaced { index: usize },
    /// Link mode: a switch is now waiting for its target.
    SwitchSelected { switch_index: usize },
    /// Link mode: the pending switch now opens this door.
    Linked { switch_index: usize, door_index: usize },
    /// Link mode: the click hit neither a door nor a switch.
    LinkCancelled,
    /// Link mode: nothing pending and the click was not on a switch.
    Ignored,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error(transparent)]
    OutOfBounds(#[from] OutOfBounds),
    #[error(transparent)]
    Capacity(#[from] CapacityError),
    #[error("no door at {0}")]
    NotADoor(TilePos),
    #[error("no enemy at index {0}")]
    NoSuchEnemy(usize),
    #[error("no pickup at index {0}")]
    NoSuchPickup(usize),
    #[error("{0} is not placed")]
    NoSuchSpawn(SpawnSlot),
    #[error("no switch is selected")]
    NoPendingSwitch,
}

impl From<LevelError> for EditError {
    fn from(err: LevelError) -> Self {
        match err {
            LevelError::OutOfBounds(e) => Self::OutOfBounds(e),
            LevelError::Capacity(e) => Self::Capacity(e),
        }
    }
}

/// One editing session over a level.
///
/// Clicks on the grid either paint with the current brush, place an entity
/// with the active placement tool, or (in link mode) wire switches to doors.
///
/// After every operation the level's event log is drained into
/// [`EditorSession::last_events`], so it only ever holds one operation's
/// worth of events.
pub struct EditorSession {
    level: Level,
    level_id: String,
    brush: TileKind,
    placing: Option<Placement>,
    link_mode: bool,
    pending_switch: Option<usize>,
    preview: PreviewController,
    last_events: Vec<LevelEvent>,
}

impl EditorSession {
    pub fn new(level: Level, motion: MotionConfig) -> Self {
        let preview = PreviewController::for_level(&level, motion);
        Self {
            level,
            level_id: String::from("e1m4"),
            brush: TileKind::StoneWallA,
            placing: None,
            link_mode: false,
            pending_switch: None,
            preview,
            last_events: Vec::new(),
        }
    }

    /// Events produced by the most recent operation.
    pub fn last_events(&self) -> &[LevelEvent] {
        &self.last_events
    }

    fn settle<T>(&mut self, result: T) -> T {
        self.last_events = self.level.drain_events();
        for event in &self.last_events {
            tracing::debug!(?event, "level changed");
        }
        result
    }

    pub fn level(&self) -> &Level {
        &self.level
    }

    pub fn into_level(self) -> Level {
        self.level
    }

    pub fn level_id(&self) -> &str {
        &self.level_id
    }

    pub fn set_level_id(&mut self, id: impl Into<String>) {
        self.level_id = id.into();
    }

    pub fn preview(&self) -> &PreviewController {
        &self.preview
    }

    pub fn preview_mut(&mut self) -> &mut PreviewController {
        &mut self.preview
    }

    /// Advance the preview camera by one tick against the current grid.
    pub fn tick_preview(&mut self, intents: Intents) -> PreviewState {
        self.preview.tick(self.level.grid(), intents)
    }

    /// Replace the level wholesale (a load). Tools and link state reset.
    pub fn load(&mut self, level: Level) {
        self.level = level;
        self.placing = None;
        self.pending_switch = None;
        self.preview.reset(&self.level);
        tracing::info!(
            width = self.level.width(),
            height = self.level.height(),
            "level loaded into session"
        );
        self.settle(());
    }

    pub fn brush(&self) -> TileKind {
        self.brush
    }

    /// Pick a tile to paint with. Cancels any placement tool.
    pub fn select_brush(&mut self, tile: TileKind) {
        self.brush = tile;
        self.placing = None;
    }

    pub fn placing(&self) -> Option<Placement> {
        self.placing
    }

    pub fn start_placing(&mut self, placement: Placement) {
        self.placing = Some(placement);
    }

    pub fn cancel_placing(&mut self) {
        self.placing = None;
    }

    pub fn link_mode(&self) -> bool {
        self.link_mode
    }

    pub fn pending_switch(&self) -> Option<usize> {
        self.pending_switch
    }

    /// Flip link mode, returning the new state. Leaving it drops any
    /// pending switch.
    pub fn toggle_link_mode(&mut self) -> bool {
        self.set_link_mode(!self.link_mode);
        self.link_mode
    }

    pub fn set_link_mode(&mut self, on: bool) {
        self.link_mode = on;
        if !on {
            self.pending_switch = None;
        }
    }

    /// Handle a click on grid cell `(x, y)`.
    pub fn click(&mut self, x: u32, y: u32) -> Result<ClickOutcome, EditError> {
        let outcome = self.apply_click(x, y);
        self.settle(outcome)
    }

    fn apply_click(&mut self, x: u32, y: u32) -> Result<ClickOutcome, EditError> {
        self.level.grid().get(x, y)?;
        let pos = TilePos::new(x, y);
        if self.link_mode {
            return Ok(self.link_click(pos));
        }
        match self.placing {
            Some(Placement::Spawn(slot)) => {
                let spawn = self.level.place_spawn(slot, pos)?;
                self.placing = None;
                Ok(ClickOutcome::SpawnPlaced { slot, spawn })
            }
            Some(Placement::Enemy(kind)) => {
                // A refused placement keeps the tool active.
                let index = self.level.add_enemy(kind, pos)?;
                self.placing = None;
                Ok(ClickOutcome::EnemyPlaced { index })
            }
            Some(Placement::Pickup(kind)) => {
                let index = self.level.add_pickup(kind, pos)?;
                self.placing = None;
                Ok(ClickOutcome::PickupPlaced { index })
            }
            None => {
                let edit = self.paint_cell(x, y, self.brush)?;
                Ok(ClickOutcome::Painted { pos, edit })
            }
        }
    }

    fn link_click(&mut self, pos: TilePos) -> ClickOutcome {
        let grid = self.level.grid();
        let switch_index = grid.scan(TileKind::is_switch).position(|(p, _)| p == pos);
        let door_index = grid.scan(TileKind::is_door).position(|(p, _)| p == pos);

        match (self.pending_switch, switch_index, door_index) {
            (_, Some(switch_index), _) => {
                self.pending_switch = Some(switch_index);
                tracing::debug!(switch_index, "switch selected for linking");
                ClickOutcome::SwitchSelected { switch_index }
            }
            (None, None, _) => ClickOutcome::Ignored,
            (Some(pending), None, Some(door_index)) => {
                self.level.set_link(pending, SwitchLink::Door(door_index));
                self.pending_switch = None;
                tracing::info!(switch_index = pending, door_index, "switch linked to door");
                ClickOutcome::Linked {
                    switch_index: pending,
                    door_index,
                }
            }
            (Some(_), None, None) => {
                self.pending_switch = None;
                ClickOutcome::LinkCancelled
            }
        }
    }

    /// Link the pending switch to the level exit.
    pub fn set_exit(&mut self) -> Result<usize, EditError> {
        let pending = self.pending_switch.take().ok_or(EditError::NoPendingSwitch)?;
        self.level.set_link(pending, SwitchLink::Exit);
        tracing::info!(switch_index = pending, "switch linked to exit");
        self.settle(Ok(pending))
    }

    /// Paint one cell directly. Switch scan indices may shift, so any pending
    /// link selection is dropped.
    pub fn paint(&mut self, x: u32, y: u32, tile: TileKind) -> Result<TileEdit, EditError> {
        let edit = self.paint_cell(x, y, tile);
        self.settle(edit)
    }

    fn paint_cell(&mut self, x: u32, y: u32, tile: TileKind) -> Result<TileEdit, EditError> {
        let edit = self.level.set_tile(x, y, tile)?;
        self.pending_switch = None;
        Ok(edit)
    }

    /// Resize the level, returning how many entities fell outside it.
    pub fn resize(&mut self, width: u32, height: u32) -> usize {
        let dropped = self.level.resize(width, height);
        self.pending_switch = None;
        self.preview.reset(&self.level);
        self.settle(dropped)
    }

    pub fn remove_enemy(&mut self, index: usize) -> Result<Enemy, EditError> {
        let removed = self.level.remove_enemy(index).ok_or(EditError::NoSuchEnemy(index));
        self.settle(removed)
    }

    pub fn remove_pickup(&mut self, index: usize) -> Result<Pickup, EditError> {
        let removed = self.level.remove_pickup(index).ok_or(EditError::NoSuchPickup(index));
        self.settle(removed)
    }

    pub fn clear_spawn(&mut self, slot: SpawnSlot) -> Result<Spawn, EditError> {
        let removed = self.level.clear_spawn(slot).ok_or(EditError::NoSuchSpawn(slot));
        self.settle(removed)
    }

    pub fn set_enemy_angle(&mut self, index: usize, angle: Angle) -> Result<(), EditError> {
        let turned = self.level.set_enemy_angle(index, angle);
        self.settle(if turned { Ok(()) } else { Err(EditError::NoSuchEnemy(index)) })
    }

    pub fn set_spawn_angle(&mut self, slot: SpawnSlot, angle: Angle) -> Result<(), EditError> {
        let turned = self.level.set_spawn_angle(slot, angle);
        self.settle(if turned { Ok(()) } else { Err(EditError::NoSuchSpawn(slot)) })
    }

    pub fn set_door_orientation(
        &mut self,
        pos: TilePos,
        orientation: DoorOrientation,
    ) -> Result<(), EditError> {
        let tile = self.level.grid().get_at(pos)?;
        if !tile.is_door() {
            return Err(EditError::NotADoor(pos));
        }
        self.level.set_door_orientation(pos, orientation);
        self.settle(Ok(()))
    }
}
