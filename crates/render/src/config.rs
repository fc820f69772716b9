use crate::palette::{self, Rgba};
use serde::{Deserialize, Serialize};

/// Tunables for the raycast preview. Every field has a default, so a partial
/// config file only overrides what it names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Horizontal field of view.
    pub fov_degrees: f32,
    /// Distance advanced per ray-march step, in tiles.
    pub ray_step: f32,
    /// Hard cap on steps per primary ray.
    pub max_steps: u32,
    /// Wall columns never exceed this multiple of the frame height.
    pub wall_height_cap: f32,
    /// Added to the hit distance before projecting a wall column.
    pub distance_epsilon: f32,
    /// Brightness falls off as `1 / (distance * shade_factor)`.
    pub shade_factor: f32,
    /// World size of a sprite, in tiles.
    pub sprite_world_size: f32,
    pub min_sprite_px: f32,
    /// Sprites never exceed this fraction of the frame height.
    pub max_sprite_fraction: f32,
    /// Sprites closer than this to the camera are skipped.
    pub min_sprite_distance: f32,
    pub ceiling: Rgba,
    pub floor: Rgba,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 60.0,
            ray_step: 0.02,
            max_steps: 400,
            wall_height_cap: 1.2,
            distance_epsilon: 0.01,
            shade_factor: 0.3,
            sprite_world_size: 0.8,
            min_sprite_px: 8.0,
            max_sprite_fraction: 0.9,
            min_sprite_distance: 0.05,
            ceiling: palette::CEILING,
            floor: palette::FLOOR,
        }
    }
}

impl RenderConfig {
    pub fn fov(&self) -> f32 {
        self.fov_degrees.to_radians()
    }

    pub fn half_fov(&self) -> f32 {
        self.fov() / 2.0
    }

    /// Projection-plane distance for a frame `width` pixels wide.
    pub fn projection(&self, width: u32) -> f32 {
        (width as f32 / 2.0) / self.half_fov().tan()
    }
}
