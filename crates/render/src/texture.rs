//! Optional image assets for walls and sprites.

use crate::palette::Rgba;
use raylevel_common::TileKind;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum TextureError {
    #[error("texture directory {0} does not exist")]
    MissingDir(PathBuf),
    #[error("failed to load {path}: {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("texture {0} has no pixels")]
    Empty(PathBuf),
}

/// An RGBA image kept in memory for nearest-neighbour sampling.
#[derive(Debug, Clone, PartialEq)]
pub struct Texture {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Texture {
    /// `None` unless `pixels` holds exactly `width * height` entries and the
    /// image is not empty.
    pub fn from_pixels(width: u32, height: u32, pixels: Vec<Rgba>) -> Option<Self> {
        (width > 0 && height > 0 && pixels.len() == width as usize * height as usize).then_some(
            Self {
                width,
                height,
                pixels,
            },
        )
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, TextureError> {
        let path = path.as_ref();
        let img = image::open(path).map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })?;
        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();
        let pixels = rgba.pixels().map(|p| Rgba(p.0)).collect();
        Self::from_pixels(width, height, pixels).ok_or_else(|| TextureError::Empty(path.to_path_buf()))
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Width over height.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn texel(&self, x: u32, y: u32) -> Rgba {
        let x = x.min(self.width - 1);
        let y = y.min(self.height - 1);
        self.pixels[(y * self.width + x) as usize]
    }

    /// Nearest texel at normalised coordinates.
    pub fn sample(&self, u: f32, v: f32) -> Rgba {
        let x = (u * self.width as f32).floor().max(0.0) as u32;
        let y = (v * self.height as f32).floor().max(0.0) as u32;
        self.texel(x, y)
    }
}

/// Textures found in an asset directory. Anything missing falls back to flat
/// colours.
///
/// ```text
/// wall_1.png .. wall_11.png   - wall texture per tile id
/// enemy_0.png .. enemy_4.png  - enemy views, front (0) to back (4)
/// pickup.png                  - shared pickup sprite
/// spawn.png                   - spawn marker sprite
/// weapon.png                  - first-person weapon overlay
/// ```
#[derive(Debug, Clone, Default)]
pub struct TextureSet {
    walls: Vec<Option<Texture>>,
    enemies: [Option<Texture>; 5],
    pub pickup: Option<Texture>,
    pub spawn: Option<Texture>,
    pub weapon: Option<Texture>,
}

fn load_optional(dir: &Path, name: &str) -> Result<Option<Texture>, TextureError> {
    let path = dir.join(name);
    if !path.is_file() {
        return Ok(None);
    }
    let texture = Texture::from_file(&path)?;
    tracing::debug!(path = %path.display(), width = texture.width(), height = texture.height(), "texture loaded");
    Ok(Some(texture))
}

impl TextureSet {
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, TextureError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(TextureError::MissingDir(dir.to_path_buf()));
        }
        let mut set = Self::default();
        for tile in TileKind::ALL {
            let texture = match tile {
                TileKind::Empty => None,
                _ => load_optional(dir, &format!("wall_{}.png", tile.id()))?,
            };
            set.walls.push(texture);
        }
        for (i, slot) in set.enemies.iter_mut().enumerate() {
            *slot = load_optional(dir, &format!("enemy_{i}.png"))?;
        }
        set.pickup = load_optional(dir, "pickup.png")?;
        set.spawn = load_optional(dir, "spawn.png")?;
        set.weapon = load_optional(dir, "weapon.png")?;
        tracing::info!(dir = %dir.display(), loaded = set.len(), "textures loaded");
        Ok(set)
    }

    pub fn set_wall(&mut self, tile: TileKind, texture: Texture) {
        let index = usize::from(tile.id());
        if self.walls.len() <= index {
            self.walls.resize(index + 1, None);
        }
        self.walls[index] = Some(texture);
    }

    pub fn wall(&self, tile: TileKind) -> Option<&Texture> {
        self.walls.get(usize::from(tile.id()))?.as_ref()
    }

    pub fn set_enemy(&mut self, image: u8, texture: Texture) {
        if let Some(slot) = self.enemies.get_mut(usize::from(image)) {
            *slot = Some(texture);
        }
    }

    pub fn enemy(&self, image: u8) -> Option<&Texture> {
        self.enemies.get(usize::from(image))?.as_ref()
    }

    /// Number of textures present.
    pub fn len(&self) -> usize {
        self.walls.iter().flatten().count()
            + self.enemies.iter().flatten().count()
            + [&self.pickup, &self.spawn, &self.weapon]
                .iter()
                .filter(|t| t.is_some())
                .count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checker() -> Texture {
        let a = Rgba::hex(0xff0000);
        let b = Rgba::hex(0x00ff00);
        Texture::from_pixels(2, 2, vec![a, b, b, a]).unwrap()
    }

    #[test]
    fn sampling_is_nearest_and_clamped() {
        let t = checker();
        assert_eq!(t.sample(0.1, 0.1), Rgba::hex(0xff0000));
        assert_eq!(t.sample(0.9, 0.1), Rgba::hex(0x00ff00));
        assert_eq!(t.sample(1.0, 1.0), Rgba::hex(0xff0000));
        assert!(Texture::from_pixels(2, 2, vec![Rgba::WHITE]).is_none());
        assert!(Texture::from_pixels(0, 0, Vec::new()).is_none());
    }

    #[test]
    fn load_dir_picks_up_present_files() {
        let tmp = tempfile::tempdir().unwrap();
        let img = image::RgbaImage::from_pixel(4, 8, image::Rgba([10, 20, 30, 255]));
        img.save(tmp.path().join("wall_3.png")).unwrap();
        img.save(tmp.path().join("enemy_2.png")).unwrap();
        img.save(tmp.path().join("pickup.png")).unwrap();

        let set = TextureSet::load_dir(tmp.path()).unwrap();
        assert_eq!(set.len(), 3);
        let wall = set.wall(TileKind::TechWall).unwrap();
        assert_eq!((wall.width(), wall.height()), (4, 8));
        assert_eq!(wall.texel(0, 0), Rgba([10, 20, 30, 255]));
        assert!(set.wall(TileKind::StoneWallA).is_none());
        assert!(set.enemy(2).is_some());
        assert!(set.enemy(0).is_none());
        assert!(set.spawn.is_none());
    }

    #[test]
    fn missing_dir_and_bad_file_fail() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(matches!(
            TextureSet::load_dir(tmp.path().join("absent")),
            Err(TextureError::MissingDir(_))
        ));
        std::fs::write(tmp.path().join("spawn.png"), b"not a png").unwrap();
        assert!(matches!(
            TextureSet::load_dir(tmp.path()),
            Err(TextureError::Decode { .. })
        ));
    }
}
