//! Raycast preview rendering.
//!
//! # Invariants
//! - Renderers read the level and never mutate it.
//! - A frame is a bounded computation: one capped ray per column and one
//!   occlusion walk per sprite candidate.
//! - Leaving the grid is a miss, never an error.

pub mod camera;
pub mod config;
pub mod frame;
pub mod palette;
pub mod raycast;
mod renderer;
pub mod sprites;
pub mod texture;

pub use camera::PreviewCamera;
pub use config::RenderConfig;
pub use frame::Framebuffer;
pub use palette::Rgba;
pub use raycast::{RaycastRenderer, WallColumn, WallHit};
pub use renderer::{AsciiRenderer, PreviewScene, RenderView, Renderer, SoftwareRenderer};
pub use sprites::{EnemyView, SpriteCompositor, SpriteKind, VisibleSprite};
pub use texture::{Texture, TextureError, TextureSet};
