use crate::config::MotionConfig;
use glam::Vec2;
use raylevel_input::Intents;
use raylevel_kernel::{Level, TileGrid};
use raylevel_render::PreviewCamera;

/// Whether a preview tick changed anything.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewState {
    Idle,
    Moving,
}

/// Walks the preview camera through the grid.
///
/// Movement is collision-checked against the tile the target point lands in.
/// When the full step is blocked the camera tries to slide along one axis,
/// preferring the X axis.
#[derive(Debug, Clone)]
pub struct PreviewController {
    camera: PreviewCamera,
    motion: MotionConfig,
}

impl PreviewController {
    pub fn new(camera: PreviewCamera, motion: MotionConfig) -> Self {
        Self { camera, motion }
    }

    /// Camera at spawn 1 (or the grid centre).
    pub fn for_level(level: &Level, motion: MotionConfig) -> Self {
        Self::new(PreviewCamera::for_level(level), motion)
    }

    pub fn camera(&self) -> PreviewCamera {
        self.camera
    }

    pub fn motion(&self) -> MotionConfig {
        self.motion
    }

    /// Put the camera back at the level's spawn.
    pub fn reset(&mut self, level: &Level) {
        self.camera = PreviewCamera::for_level(level);
        tracing::debug!(x = self.camera.position.x, y = self.camera.position.y, "preview camera reset");
    }

    /// Apply one tick of held intents.
    pub fn tick(&mut self, grid: &TileGrid, intents: Intents) -> PreviewState {
        if intents.is_idle() {
            return PreviewState::Idle;
        }
        let _span = tracing::info_span!("preview_tick").entered();

        let old = self.camera.position;
        // Movement uses the facing from before this tick's turn.
        let step = self.camera.forward() * self.motion.move_step;
        let mut target = old;
        if intents.forward {
            target += step;
        }
        if intents.back {
            target -= step;
        }

        let mut angle = self.camera.angle;
        if intents.turn_left {
            angle = angle.rotated(-self.motion.turn_step);
        }
        if intents.turn_right {
            angle = angle.rotated(self.motion.turn_step);
        }

        let position = if !blocked(grid, target) {
            target
        } else if !blocked(grid, Vec2::new(target.x, old.y)) {
            Vec2::new(target.x, old.y)
        } else if !blocked(grid, Vec2::new(old.x, target.y)) {
            Vec2::new(old.x, target.y)
        } else {
            old
        };

        self.camera = PreviewCamera::new(position, angle);
        PreviewState::Moving
    }

    /// Apply a sequence of ticks, returning how many of them moved the camera.
    pub fn run(&mut self, grid: &TileGrid, ticks: impl IntoIterator<Item = Intents>) -> usize {
        ticks
            .into_iter()
            .filter(|intents| self.tick(grid, *intents) == PreviewState::Moving)
            .count()
    }
}

fn blocked(grid: &TileGrid, point: Vec2) -> bool {
    grid.tile_at_point(point).is_none_or(|tile| tile.blocks_preview())
}

#[cfg(test)]
mod tests {
    use super::*;
    use raylevel_common::{Angle, TileKind};

    fn forward() -> Intents {
        Intents {
            forward: true,
            ..Intents::default()
        }
    }

    fn controller(x: f32, y: f32, angle: Angle) -> PreviewController {
        PreviewController::new(PreviewCamera::new(Vec2::new(x, y), angle), MotionConfig::default())
    }

    fn close(a: Vec2, b: Vec2) -> bool {
        (a - b).length() < 1e-4
    }

    #[test]
    fn idle_tick_is_a_no_op() {
        let level = Level::new(8, 8);
        let mut ctl = controller(2.5, 2.5, Angle::EAST);
        assert_eq!(ctl.tick(level.grid(), Intents::default()), PreviewState::Idle);
        assert_eq!(ctl.camera().position, Vec2::new(2.5, 2.5));
    }

    #[test]
    fn forward_moves_along_facing() {
        let level = Level::new(8, 8);
        let mut ctl = controller(2.5, 2.5, Angle::NORTH);
        assert_eq!(ctl.tick(level.grid(), forward()), PreviewState::Moving);
        assert!(close(ctl.camera().position, Vec2::new(2.5, 2.42)));

        let mut ctl = controller(2.5, 2.5, Angle::EAST);
        ctl.tick(level.grid(), forward());
        assert!(close(ctl.camera().position, Vec2::new(2.58, 2.5)));
    }

    #[test]
    fn forward_and_back_cancel() {
        let level = Level::new(8, 8);
        let mut ctl = controller(2.5, 2.5, Angle::new(100));
        let both = Intents {
            forward: true,
            back: true,
            ..Intents::default()
        };
        assert_eq!(ctl.tick(level.grid(), both), PreviewState::Moving);
        assert!(close(ctl.camera().position, Vec2::new(2.5, 2.5)));
        assert_eq!(ctl.camera().angle, Angle::new(100));
    }

    #[test]
    fn turning_wraps() {
        let level = Level::new(8, 8);
        let mut ctl = controller(2.5, 2.5, Angle::NORTH);
        let left = Intents {
            turn_left: true,
            ..Intents::default()
        };
        ctl.tick(level.grid(), left);
        assert_eq!(ctl.camera().angle.units(), 1020);

        let right = Intents {
            turn_right: true,
            ..Intents::default()
        };
        ctl.tick(level.grid(), right);
        ctl.tick(level.grid(), right);
        assert_eq!(ctl.camera().angle.units(), 4);
    }

    #[test]
    fn movement_uses_facing_before_turn() {
        let level = Level::new(8, 8);
        let mut ctl = controller(2.5, 2.5, Angle::NORTH);
        let walk_and_turn = Intents {
            forward: true,
            turn_right: true,
            ..Intents::default()
        };
        ctl.tick(level.grid(), walk_and_turn);
        assert!(close(ctl.camera().position, Vec2::new(2.5, 2.42)));
        assert_eq!(ctl.camera().angle.units(), 4);
    }

    #[test]
    fn slides_along_x_when_y_is_walled() {
        // Heading north-east into the top border.
        let level = Level::new(6, 6);
        let mut ctl = controller(1.5, 1.05, Angle::new(128));
        ctl.tick(level.grid(), forward());
        let pos = ctl.camera().position;
        assert!(pos.x > 1.55);
        assert!((pos.y - 1.05).abs() < 1e-6);
    }

    #[test]
    fn slides_along_y_when_x_is_walled() {
        // Heading north-east into the right border.
        let level = Level::new(6, 6);
        let mut ctl = controller(4.95, 2.5, Angle::new(128));
        ctl.tick(level.grid(), forward());
        let pos = ctl.camera().position;
        assert!((pos.x - 4.95).abs() < 1e-6);
        assert!(pos.y < 2.45);
    }

    #[test]
    fn prefers_x_slide_when_both_axes_are_free() {
        // Diagonal step into a pillar corner; each single-axis move is clear.
        let mut level = Level::new(6, 6);
        level.set_tile(3, 1, TileKind::TechWall).unwrap();
        let mut ctl = controller(2.97, 2.03, Angle::new(128));
        ctl.tick(level.grid(), forward());
        let pos = ctl.camera().position;
        assert!(pos.x > 3.0);
        assert!((pos.y - 2.03).abs() < 1e-6);
    }

    #[test]
    fn stays_put_in_a_corner_but_still_turns() {
        let level = Level::new(6, 6);
        let mut ctl = controller(4.95, 1.05, Angle::new(128));
        let walk_and_turn = Intents {
            forward: true,
            turn_left: true,
            ..Intents::default()
        };
        ctl.tick(level.grid(), walk_and_turn);
        assert_eq!(ctl.camera().position, Vec2::new(4.95, 1.05));
        assert_eq!(ctl.camera().angle.units(), 124);
    }

    #[test]
    fn doors_are_passable() {
        let mut level = Level::new(6, 6);
        level.set_tile(2, 2, TileKind::Door).unwrap();
        let mut ctl = controller(2.5, 3.05, Angle::NORTH);
        ctl.tick(level.grid(), forward());
        assert_eq!(ctl.camera().cell(), Some(raylevel_common::TilePos::new(2, 2)));
    }

    #[test]
    fn leaving_the_grid_is_blocked() {
        // A door on the border lets the camera reach the edge but not past it.
        let mut level = Level::new(6, 6);
        level.set_tile(2, 0, TileKind::Door).unwrap();
        let mut ctl = controller(2.5, 0.05, Angle::NORTH);
        ctl.tick(level.grid(), forward());
        let pos = ctl.camera().position;
        assert!(pos.y >= 0.0);
        assert!((pos.y - 0.05).abs() < 1e-6);
    }

    #[test]
    fn run_counts_moving_ticks() {
        let level = Level::new(8, 8);
        let mut ctl = controller(2.5, 5.5, Angle::NORTH);
        let moved = ctl.run(level.grid(), [forward(), Intents::default(), forward()]);
        assert_eq!(moved, 2);
        assert!(close(ctl.camera().position, Vec2::new(2.5, 5.34)));
    }

    #[test]
    fn reset_returns_to_spawn() {
        let mut level = Level::new(8, 8);
        level
            .place_spawn(raylevel_kernel::SpawnSlot::One, raylevel_common::TilePos::new(3, 3))
            .unwrap();
        let mut ctl = controller(6.5, 6.5, Angle::EAST);
        ctl.reset(&level);
        assert_eq!(ctl.camera().position, Vec2::new(3.5, 3.5));
        assert_eq!(ctl.camera().angle, Angle::SOUTH);
    }
}
