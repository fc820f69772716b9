//! Column raycaster over the tile grid.

use crate::camera::PreviewCamera;
use crate::config::RenderConfig;
use glam::Vec2;
use raylevel_common::{TileKind, TilePos};
use raylevel_kernel::TileGrid;

/// Where a ray stopped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallHit {
    pub tile: TileKind,
    pub cell: TilePos,
    pub point: Vec2,
    /// Distance marched from the camera, a multiple of the ray step.
    pub distance: f32,
    /// Horizontal texture coordinate in `0..1` along the face that was hit.
    pub u: f32,
}

/// One screen column of the wall pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WallColumn {
    pub column: u32,
    pub hit: Option<WallHit>,
    /// Top edge of the wall slice in pixels (may be negative).
    pub top: f32,
    pub height: f32,
    /// Brightness in `0..=1`.
    pub shade: f32,
}

/// Texture coordinate on the face nearest to `frac` (the hit point's offset
/// inside its cell): a hit near a vertical edge reads along `y`, otherwise
/// along `x`.
fn face_u(frac: Vec2) -> f32 {
    let min = frac.x.min(1.0 - frac.x).min(frac.y).min(1.0 - frac.y);
    if min == frac.x || min == 1.0 - frac.x {
        frac.y
    } else {
        frac.x
    }
}

/// Texel column for `u` on a texture `width` texels wide.
pub fn texture_column(u: f32, width: u32) -> u32 {
    if width == 0 {
        return 0;
    }
    ((u * width as f32).floor().max(0.0) as u32) % width
}

/// Fixed-step march from `origin` along `dir`. The cell under the current
/// point is tested before advancing, so a camera standing inside a wall hits
/// at distance zero. Leaving the grid is a miss.
pub fn march(grid: &TileGrid, origin: Vec2, dir: Vec2, step: f32, max_steps: u32) -> Option<WallHit> {
    for i in 0..max_steps {
        let distance = i as f32 * step;
        let point = origin + dir * distance;
        let cell = point.floor();
        if cell.x < 0.0 || cell.y < 0.0 {
            return None;
        }
        let pos = TilePos::new(cell.x as u32, cell.y as u32);
        let tile = grid.get_at(pos).ok()?;
        if tile.blocks_preview() {
            return Some(WallHit {
                tile,
                cell: pos,
                point,
                distance,
                u: face_u(point - cell),
            });
        }
    }
    None
}

/// Casts one ray per screen column and projects the wall slices.
#[derive(Debug, Clone, Default)]
pub struct RaycastRenderer {
    config: RenderConfig,
}

impl RaycastRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Screen-convention angle of the ray for `column`. Column 0 looks half a
    /// field of view to the left of the camera.
    pub fn ray_angle(&self, camera: &PreviewCamera, column: u32, width: u32) -> f32 {
        let t = column as f32 / width as f32 - 0.5;
        camera.angle.screen_radians() + t * self.config.fov()
    }

    pub fn cast_column(
        &self,
        grid: &TileGrid,
        camera: &PreviewCamera,
        column: u32,
        width: u32,
        height: u32,
    ) -> WallColumn {
        let angle = self.ray_angle(camera, column, width);
        let dir = Vec2::new(angle.cos(), angle.sin());
        let hit = march(
            grid,
            camera.position,
            dir,
            self.config.ray_step,
            self.config.max_steps,
        );
        let Some(hit) = hit else {
            return WallColumn {
                column,
                hit: None,
                top: 0.0,
                height: 0.0,
                shade: 0.0,
            };
        };
        let h = height as f32;
        let wall = (h * self.config.wall_height_cap)
            .min(h / (hit.distance + self.config.distance_epsilon));
        WallColumn {
            column,
            hit: Some(hit),
            top: (h - wall) / 2.0,
            height: wall,
            shade: (1.0 / (hit.distance * self.config.shade_factor)).min(1.0),
        }
    }

    /// The wall pass for a whole frame, left to right.
    pub fn cast_columns(
        &self,
        grid: &TileGrid,
        camera: &PreviewCamera,
        width: u32,
        height: u32,
    ) -> Vec<WallColumn> {
        let _span = tracing::info_span!("raycast_frame", width, height).entered();
        let columns: Vec<WallColumn> = (0..width)
            .map(|column| self.cast_column(grid, camera, column, width, height))
            .collect();
        tracing::debug!(
            hits = columns.iter().filter(|c| c.hit.is_some()).count(),
            "wall pass done"
        );
        columns
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use raylevel_common::Angle;

    const EPS: f32 = 1e-3;

    fn camera(x: f32, y: f32, angle: i32) -> PreviewCamera {
        PreviewCamera::new(Vec2::new(x, y), Angle::new(angle))
    }

    #[test]
    fn straight_ray_hits_border_at_expected_distance() {
        let grid = TileGrid::new(4, 4);
        let rc = RaycastRenderer::default();
        let col = rc.cast_column(&grid, &camera(1.5, 1.99, 0), 160, 320, 200);
        let hit = col.hit.unwrap();
        assert_eq!(hit.tile, TileKind::StoneWallA);
        assert_eq!(hit.cell, TilePos::new(1, 0));
        assert!((hit.distance - 1.0).abs() < EPS, "distance {}", hit.distance);
        assert!((hit.u - 0.5).abs() < EPS);
        assert!((col.height - 200.0 / 1.01).abs() < 0.1);
        assert!((col.top - (200.0 - col.height) / 2.0).abs() < EPS);
        assert_eq!(col.shade, 1.0);
    }

    #[test]
    fn reported_distance_brackets_true_distance() {
        let mut grid = TileGrid::new(12, 5);
        grid.set(9, 2, TileKind::TechWall).unwrap();
        // Facing east from x = 2.37: the wall face is 6.63 tiles away.
        let rc = RaycastRenderer::default();
        let col = rc.cast_column(&grid, &camera(2.37, 2.5, 256), 160, 320, 200);
        let hit = col.hit.unwrap();
        assert_eq!(hit.tile, TileKind::TechWall);
        assert!(hit.distance >= 6.63 - EPS && hit.distance <= 6.65 + EPS);
        assert!(col.shade < 1.0);
        assert!((col.shade - 1.0 / (hit.distance * 0.3)).abs() < 1e-4);
    }

    #[test]
    fn doors_and_switches_are_transparent() {
        let mut grid = TileGrid::new(10, 3);
        grid.set(3, 1, TileKind::Door).unwrap();
        grid.set(4, 1, TileKind::Switch).unwrap();
        grid.set(5, 1, TileKind::KeyBlue).unwrap();
        let hit = march(&grid, Vec2::new(1.5, 1.5), Vec2::X, 0.02, 400).unwrap();
        assert_eq!(hit.cell, TilePos::new(9, 1));
    }

    #[test]
    fn camera_inside_wall_hits_immediately() {
        let grid = TileGrid::new(6, 6);
        let rc = RaycastRenderer::default();
        let col = rc.cast_column(&grid, &camera(0.5, 0.5, 300), 10, 320, 200);
        let hit = col.hit.unwrap();
        assert_eq!(hit.distance, 0.0);
        assert!((col.height - 240.0).abs() < EPS);
        assert_eq!(col.shade, 1.0);
    }

    #[test]
    fn leaving_the_grid_is_a_miss() {
        let grid = TileGrid::new(6, 6);
        assert!(march(&grid, Vec2::new(-1.0, 2.0), Vec2::NEG_X, 0.02, 400).is_none());
        // Long empty corridor: the step cap runs out first.
        let open = TileGrid::new(40, 3);
        assert!(march(&open, Vec2::new(1.5, 1.5), Vec2::X, 0.02, 400).is_none());
    }

    #[test]
    fn face_coordinate_follows_the_nearest_edge() {
        assert!((face_u(Vec2::new(0.01, 0.3)) - 0.3).abs() < EPS);
        assert!((face_u(Vec2::new(0.99, 0.7)) - 0.7).abs() < EPS);
        assert!((face_u(Vec2::new(0.4, 0.02)) - 0.4).abs() < EPS);
        assert_eq!(texture_column(0.999, 64), 63);
        assert_eq!(texture_column(1.0, 64), 0);
        assert_eq!(texture_column(0.5, 0), 0);
    }

    #[test]
    fn one_column_per_pixel() {
        let grid = TileGrid::new(8, 8);
        let rc = RaycastRenderer::default();
        let cols = rc.cast_columns(&grid, &camera(4.0, 4.0, 0), 64, 40);
        assert_eq!(cols.len(), 64);
        assert!(cols.iter().all(|c| c.hit.is_some()));
        assert!(cols.iter().enumerate().all(|(i, c)| c.column == i as u32));
    }
}
