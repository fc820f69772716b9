//! Billboard sprites for enemies, pickups and spawn markers.

use crate::camera::PreviewCamera;
use crate::config::RenderConfig;
use glam::Vec2;
use raylevel_common::{Angle, EnemyKind, PickupKind};
use raylevel_kernel::{Level, SpawnSlot, TileGrid};
use std::f32::consts::{PI, TAU};

/// Which enemy image to use per view segment, and whether to mirror it.
const ENEMY_IMAGE: [u8; 8] = [0, 1, 2, 3, 4, 3, 2, 1];
const ENEMY_MIRRORED: [bool; 8] = [false, false, false, false, false, true, true, true];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Enemy { index: usize, kind: EnemyKind },
    Pickup { index: usize, kind: PickupKind },
    Spawn(SpawnSlot),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpriteCandidate {
    pub kind: SpriteKind,
    /// Tile centre in world units.
    pub position: Vec2,
    /// Facing, used for enemies only.
    pub facing: Angle,
}

/// Directional view of an enemy from the camera.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EnemyView {
    /// One of eight 45-degree segments around the enemy.
    pub segment: u8,
    /// Index of the image in the enemy sheet (0 = front, 4 = back).
    pub image: u8,
    pub mirrored: bool,
}

/// A sprite that survived culling, with its screen placement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VisibleSprite {
    pub kind: SpriteKind,
    pub position: Vec2,
    pub distance: f32,
    /// Signed angle from the view direction, within half a field of view.
    pub angle_offset: f32,
    /// Distance along the view direction, used for ordering and size.
    pub depth: f32,
    pub screen_x: f32,
    /// Square size of the sprite box in pixels.
    pub size: f32,
    pub top: f32,
    pub enemy_view: Option<EnemyView>,
}

impl VisibleSprite {
    pub fn left(&self) -> f32 {
        self.screen_x - self.size / 2.0
    }
}

/// Angle from north, clockwise, of the vector `d` (y grows south).
fn bearing(d: Vec2) -> f32 {
    d.x.atan2(-d.y)
}

/// Wrap into `(-PI, PI]`.
fn wrap_angle(a: f32) -> f32 {
    PI - (PI - a).rem_euclid(TAU)
}

/// Which side of the enemy the camera sees, adjusted for the enemy's facing.
pub fn enemy_view(enemy: Vec2, facing: Angle, camera: Vec2) -> EnemyView {
    let mut angle = bearing(enemy - camera) + PI;
    if angle < 0.0 {
        angle += TAU;
    }
    let seen = ((angle / TAU * 8.0).floor() as i32).rem_euclid(8);
    let segment = (seen + i32::from(facing.octant())).rem_euclid(8) as usize;
    EnemyView {
        segment: segment as u8,
        image: ENEMY_IMAGE[segment],
        mirrored: ENEMY_MIRRORED[segment],
    }
}

/// Fixed-step walk from `from` to `to`. Advances before each test, so the
/// starting cell never blocks. Leaving the grid or entering a blocking tile
/// breaks the line.
pub fn line_of_sight(grid: &TileGrid, from: Vec2, to: Vec2, step: f32, min_distance: f32) -> bool {
    let delta = to - from;
    let distance = delta.length();
    if distance < min_distance {
        return true;
    }
    let dir = delta / distance;
    let steps = (distance / step).ceil() as u32;
    (1..=steps).all(|i| {
        grid.tile_at_point(from + dir * (i as f32 * step))
            .is_some_and(|tile| !tile.blocks_preview())
    })
}

/// Every entity that could appear as a sprite. Spawn 1 is left out while
/// the camera stands in its tile.
pub fn candidates(level: &Level, camera: &PreviewCamera) -> Vec<SpriteCandidate> {
    let entities = level.entities();
    let mut out = Vec::with_capacity(entities.len());
    out.extend(entities.enemies().iter().enumerate().map(|(index, e)| SpriteCandidate {
        kind: SpriteKind::Enemy {
            index,
            kind: e.kind,
        },
        position: e.pos.center(),
        facing: e.angle,
    }));
    out.extend(entities.pickups().iter().enumerate().map(|(index, p)| SpriteCandidate {
        kind: SpriteKind::Pickup {
            index,
            kind: p.kind,
        },
        position: p.pos.center(),
        facing: Angle::NORTH,
    }));
    if let Some(spawn) = entities
        .spawn(SpawnSlot::One)
        .filter(|s| camera.cell() != Some(s.pos))
    {
        out.push(SpriteCandidate {
            kind: SpriteKind::Spawn(SpawnSlot::One),
            position: spawn.pos.center(),
            facing: spawn.angle,
        });
    }
    if let Some(spawn) = entities.spawn(SpawnSlot::Two) {
        out.push(SpriteCandidate {
            kind: SpriteKind::Spawn(SpawnSlot::Two),
            position: spawn.pos.center(),
            facing: spawn.angle,
        });
    }
    out
}

/// Culls, occludes, orders and sizes sprites for one frame.
#[derive(Debug, Clone, Default)]
pub struct SpriteCompositor {
    config: RenderConfig,
}

impl SpriteCompositor {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }

    /// Screen placement of one candidate, or `None` if it is too close, out
    /// of the field of view or entirely off screen.
    pub fn project(
        &self,
        candidate: &SpriteCandidate,
        camera: &PreviewCamera,
        width: u32,
        height: u32,
    ) -> Option<VisibleSprite> {
        let cfg = &self.config;
        let delta = candidate.position - camera.position;
        let distance = delta.length();
        if distance < cfg.min_sprite_distance {
            return None;
        }
        let half_fov = cfg.half_fov();
        let angle_offset = wrap_angle(bearing(delta) - camera.angle.radians());
        if angle_offset.abs() > half_fov {
            return None;
        }
        let depth = distance * angle_offset.cos();
        let (w, h) = (width as f32, height as f32);
        let screen_x = (w / 2.0) * (1.0 + angle_offset.tan() / half_fov.tan());
        let size = (cfg.sprite_world_size * cfg.projection(width) / depth)
            .min(h * cfg.max_sprite_fraction)
            .max(cfg.min_sprite_px);
        let left = screen_x - size / 2.0;
        if left + size < 0.0 || left > w {
            return None;
        }
        let enemy_view = matches!(candidate.kind, SpriteKind::Enemy { .. })
            .then(|| enemy_view(candidate.position, candidate.facing, camera.position));
        Some(VisibleSprite {
            kind: candidate.kind,
            position: candidate.position,
            distance,
            angle_offset,
            depth,
            screen_x,
            size,
            top: (h - size) / 2.0,
            enemy_view,
        })
    }

    /// Visible sprites in painter's order (farthest first).
    pub fn compose(
        &self,
        level: &Level,
        camera: &PreviewCamera,
        width: u32,
        height: u32,
    ) -> Vec<VisibleSprite> {
        let _span = tracing::info_span!("sprite_compose", width, height).entered();
        let all = candidates(level, camera);
        let mut visible: Vec<VisibleSprite> = all
            .iter()
            .filter_map(|c| self.project(c, camera, width, height))
            .filter(|s| {
                line_of_sight(
                    level.grid(),
                    camera.position,
                    s.position,
                    self.config.ray_step,
                    self.config.min_sprite_distance,
                )
            })
            .collect();
        visible.sort_by(|a, b| b.depth.total_cmp(&a.depth));
        tracing::debug!(
            candidates = all.len(),
            visible = visible.len(),
            "sprites composed"
        );
        visible
    }
}
