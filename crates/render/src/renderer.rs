use crate::camera::PreviewCamera;
use crate::config::RenderConfig;
use crate::frame::{Framebuffer, span};
use crate::palette::{self, SPAWN_MARKER};
use crate::raycast::{RaycastRenderer, WallColumn, texture_column};
use crate::sprites::{SpriteCompositor, SpriteKind, VisibleSprite};
use crate::texture::TextureSet;
use raylevel_kernel::{Level, SpawnSlot};

/// Width of the flat bar drawn for a sprite with no texture.
const FLAT_SPRITE_WIDTH: f32 = 8.0;

/// Camera and output size for one frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub camera: PreviewCamera,
    pub width: u32,
    pub height: u32,
}

impl RenderView {
    pub fn new(camera: PreviewCamera, width: u32, height: u32) -> Self {
        Self {
            camera,
            width,
            height,
        }
    }
}

/// Everything a frame shows, before rasterisation.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewScene {
    pub columns: Vec<WallColumn>,
    /// Farthest first.
    pub sprites: Vec<VisibleSprite>,
}

impl PreviewScene {
    pub fn build(config: &RenderConfig, level: &Level, view: &RenderView) -> Self {
        let walls = RaycastRenderer::new(config.clone());
        let sprites = SpriteCompositor::new(config.clone());
        Self {
            columns: walls.cast_columns(level.grid(), &view.camera, view.width, view.height),
            sprites: sprites.compose(level, &view.camera, view.width, view.height),
        }
    }
}

/// Renderer-agnostic interface.
///
/// A renderer reads the level and a view and produces output. It never
/// mutates the level.
pub trait Renderer {
    type Output;

    fn render(&self, level: &Level, view: &RenderView) -> Self::Output;
}

/// Rasterises the preview into an RGBA framebuffer, using textures where
/// present and flat colours otherwise.
#[derive(Debug, Clone, Default)]
pub struct SoftwareRenderer {
    config: RenderConfig,
    textures: TextureSet,
}

impl SoftwareRenderer {
    pub fn new(config: RenderConfig, textures: TextureSet) -> Self {
        Self { config, textures }
    }

    fn draw_walls(&self, fb: &mut Framebuffer, columns: &[WallColumn]) {
        for col in columns {
            let Some(hit) = col.hit else { continue };
            match self.textures.wall(hit.tile) {
                Some(tex) => fb.draw_texture_column(
                    tex,
                    texture_column(hit.u, tex.width()),
                    col.column,
                    col.top,
                    col.height,
                    col.shade,
                ),
                None => fb.fill_rect(
                    col.column as f32,
                    col.top,
                    1.0,
                    col.height,
                    palette::wall_color(hit.tile),
                    col.shade,
                ),
            }
        }
    }

    fn draw_sprite(&self, fb: &mut Framebuffer, sprite: &VisibleSprite) {
        let (texture, mirrored, color) = match sprite.kind {
            SpriteKind::Enemy { kind, .. } => {
                let (image, mirrored) = sprite
                    .enemy_view
                    .map_or((0, false), |v| (v.image, v.mirrored));
                (
                    self.textures.enemy(image),
                    mirrored,
                    palette::enemy_color(kind),
                )
            }
            SpriteKind::Pickup { kind, .. } => {
                (self.textures.pickup.as_ref(), false, palette::pickup_color(kind))
            }
            SpriteKind::Spawn(_) => (self.textures.spawn.as_ref(), false, SPAWN_MARKER),
        };
        match texture {
            Some(tex) => {
                let w = tex.aspect() * sprite.size;
                fb.draw_texture(
                    tex,
                    sprite.screen_x - w / 2.0,
                    sprite.top,
                    w,
                    sprite.size,
                    mirrored,
                );
            }
            None => fb.fill_rect(
                sprite.screen_x - FLAT_SPRITE_WIDTH / 2.0,
                sprite.top,
                FLAT_SPRITE_WIDTH,
                sprite.size,
                color,
                1.0,
            ),
        }
    }

    fn draw_weapon(&self, fb: &mut Framebuffer) {
        let Some(tex) = &self.textures.weapon else {
            return;
        };
        let (w, h) = (fb.width() as f32, fb.height() as f32);
        let scale = (w / tex.width() as f32).min(h * 0.4 / tex.height() as f32);
        let (tw, th) = (tex.width() as f32 * scale, tex.height() as f32 * scale);
        fb.draw_texture(tex, (w - tw) / 2.0, h - th, tw, th, false);
    }
}

impl Renderer for SoftwareRenderer {
    type Output = Framebuffer;

    fn render(&self, level: &Level, view: &RenderView) -> Framebuffer {
        let scene = PreviewScene::build(&self.config, level, view);
        let mut fb = Framebuffer::new(view.width, view.height, self.config.floor);
        let half = view.height as f32 / 2.0;
        fb.fill_rect(0.0, 0.0, view.width as f32, half, self.config.ceiling, 1.0);
        self.draw_walls(&mut fb, &scene.columns);
        for sprite in &scene.sprites {
            self.draw_sprite(&mut fb, sprite);
        }
        self.draw_weapon(&mut fb);
        fb
    }
}

/// Renders the same scene as text, one character per column and row.
///
/// Ceiling is blank, floor is `.`, walls shade from `#` (near) to `-` (far),
/// enemies show their initial, pickups `*` and spawns their number.
#[derive(Debug, Clone, Default)]
pub struct AsciiRenderer {
    config: RenderConfig,
}

impl AsciiRenderer {
    pub fn new(config: RenderConfig) -> Self {
        Self { config }
    }
}

fn wall_glyph(shade: f32) -> u8 {
    match shade {
        s if s >= 1.0 => b'#',
        s if s >= 0.6 => b'%',
        s if s >= 0.35 => b'+',
        _ => b'-',
    }
}

fn sprite_glyph(kind: SpriteKind) -> u8 {
    match kind {
        SpriteKind::Enemy { kind, .. } => kind.name().as_bytes()[0],
        SpriteKind::Pickup { .. } => b'*',
        SpriteKind::Spawn(SpawnSlot::One) => b'1',
        SpriteKind::Spawn(SpawnSlot::Two) => b'2',
    }
}

impl Renderer for AsciiRenderer {
    type Output = String;

    fn render(&self, level: &Level, view: &RenderView) -> String {
        let scene = PreviewScene::build(&self.config, level, view);
        let (w, h) = (view.width as usize, view.height as usize);
        let mut rows: Vec<Vec<u8>> = (0..h)
            .map(|y| vec![if y < h / 2 { b' ' } else { b'.' }; w])
            .collect();
        for col in &scene.columns {
            if col.hit.is_none() {
                continue;
            }
            let glyph = wall_glyph(col.shade);
            for y in span(col.top, col.height, view.height) {
                rows[y as usize][col.column as usize] = glyph;
            }
        }
        for sprite in &scene.sprites {
            let glyph = sprite_glyph(sprite.kind);
            for y in span(sprite.top, sprite.size, view.height) {
                for x in span(sprite.left(), sprite.size, view.width) {
                    rows[y as usize][x as usize] = glyph;
                }
            }
        }
        let mut out = String::with_capacity((w + 1) * h);
        for row in rows {
            out.extend(row.into_iter().map(char::from));
            out.push('\n');
        }
        out
    }
}
