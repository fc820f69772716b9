use glam::Vec2;
use raylevel_common::{Angle, TilePos};
use raylevel_kernel::{Level, SpawnSlot};

/// First-person preview camera: a continuous position in tile units and a
/// facing in angle units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewCamera {
    pub position: Vec2,
    pub angle: Angle,
}

impl Default for PreviewCamera {
    fn default() -> Self {
        Self {
            position: Vec2::ZERO,
            angle: Angle::NORTH,
        }
    }
}

impl PreviewCamera {
    pub fn new(position: Vec2, angle: Angle) -> Self {
        Self { position, angle }
    }

    /// Spawn 1's tile centre and facing, or the middle of the grid facing
    /// north when there is no spawn 1.
    pub fn for_level(level: &Level) -> Self {
        match level.entities().spawn(SpawnSlot::One) {
            Some(spawn) => Self::new(spawn.pos.center(), spawn.angle),
            None => Self::new(
                Vec2::new(level.width() as f32 / 2.0, level.height() as f32 / 2.0),
                Angle::NORTH,
            ),
        }
    }

    /// Unit vector the camera is facing.
    pub fn forward(&self) -> Vec2 {
        self.angle.direction()
    }

    /// The tile the camera stands in, if its coordinates are non-negative.
    pub fn cell(&self) -> Option<TilePos> {
        let cell = self.position.floor();
        (cell.x >= 0.0 && cell.y >= 0.0).then(|| TilePos::new(cell.x as u32, cell.y as u32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resets_to_spawn_one() {
        let mut level = Level::new(10, 8);
        level.place_spawn(SpawnSlot::One, TilePos::new(3, 4)).unwrap();
        let cam = PreviewCamera::for_level(&level);
        assert_eq!(cam.position, Vec2::new(3.5, 4.5));
        assert_eq!(cam.angle, Angle::SOUTH);
        assert_eq!(cam.cell(), Some(TilePos::new(3, 4)));
    }

    #[test]
    fn falls_back_to_grid_centre() {
        let level = Level::new(10, 8);
        let cam = PreviewCamera::for_level(&level);
        assert_eq!(cam.position, Vec2::new(5.0, 4.0));
        assert_eq!(cam.angle, Angle::NORTH);
    }

    #[test]
    fn forward_points_north_at_zero() {
        let cam = PreviewCamera::default();
        let f = cam.forward();
        assert!(f.x.abs() < 1e-6);
        assert!((f.y + 1.0).abs() < 1e-6);
        assert_eq!(PreviewCamera::new(Vec2::new(-0.5, 1.0), Angle::NORTH).cell(), None);
    }
}
