use raylevel_common::{TileKind, TilePos};
use serde::{Deserialize, Serialize};

/// A cell query outside the grid extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("cell ({x}, {y}) is outside the {width}x{height} grid")]
pub struct OutOfBounds {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

/// Row-major tile grid whose border cells are never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TileGrid {
    width: u32,
    height: u32,
    tiles: Vec<TileKind>,
}

impl TileGrid {
    /// Smallest accepted side length; anything smaller is clamped up.
    pub const MIN_SIDE: u32 = 1;

    /// An empty grid enclosed by the default border wall.
    pub fn new(width: u32, height: u32) -> Self {
        let width = width.max(Self::MIN_SIDE);
        let height = height.max(Self::MIN_SIDE);
        let mut grid = Self {
            width,
            height,
            tiles: vec![TileKind::Empty; width as usize * height as usize],
        };
        grid.seal_border();
        grid
    }

    /// Build a grid from row-major tiles. Returns `None` when the tile count
    /// does not match the dimensions. Empty border cells are sealed.
    pub fn from_tiles(width: u32, height: u32, tiles: Vec<TileKind>) -> Option<Self> {
        if width < Self::MIN_SIDE
            || height < Self::MIN_SIDE
            || tiles.len() != width as usize * height as usize
        {
            return None;
        }
        let mut grid = Self {
            width,
            height,
            tiles,
        };
        grid.seal_border();
        Some(grid)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Row-major view of every cell.
    pub fn tiles(&self) -> &[TileKind] {
        &self.tiles
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x < self.width && y < self.height
    }

    pub fn is_border(&self, x: u32, y: u32) -> bool {
        x == 0 || y == 0 || x == self.width - 1 || y == self.height - 1
    }

    fn index(&self, x: u32, y: u32) -> Result<usize, OutOfBounds> {
        if self.contains(x, y) {
            Ok(y as usize * self.width as usize + x as usize)
        } else {
            Err(OutOfBounds {
                x,
                y,
                width: self.width,
                height: self.height,
            })
        }
    }

    pub fn get(&self, x: u32, y: u32) -> Result<TileKind, OutOfBounds> {
        self.index(x, y).map(|i| self.tiles[i])
    }

    pub fn get_at(&self, pos: TilePos) -> Result<TileKind, OutOfBounds> {
        self.get(pos.x, pos.y)
    }

    /// Write a tile and return what was actually stored: an empty tile on
    /// the border is coerced to [`TileKind::BORDER`].
    pub fn set(&mut self, x: u32, y: u32, tile: TileKind) -> Result<TileKind, OutOfBounds> {
        let i = self.index(x, y)?;
        let stored = if tile == TileKind::Empty && self.is_border(x, y) {
            TileKind::BORDER
        } else {
            tile
        };
        self.tiles[i] = stored;
        Ok(stored)
    }

    /// Tile containing a continuous tile-space point, or `None` outside the
    /// grid. This is the query shared by the preview raycaster and the
    /// preview movement controller.
    pub fn tile_at_point(&self, point: glam::Vec2) -> Option<TileKind> {
        let (gx, gy) = (point.x.floor(), point.y.floor());
        if gx < 0.0 || gy < 0.0 || gx >= self.width as f32 || gy >= self.height as f32 {
            return None;
        }
        Some(self.tiles[gy as usize * self.width as usize + gx as usize])
    }

    /// Copy the overlapping top-left rectangle into a grid of the new size.
    /// Cells outside the old bounds start empty, then the border is sealed.
    pub fn resize(&mut self, width: u32, height: u32) {
        let width = width.max(Self::MIN_SIDE);
        let height = height.max(Self::MIN_SIDE);
        let mut next = vec![TileKind::Empty; width as usize * height as usize];
        let copy_w = width.min(self.width) as usize;
        let copy_h = height.min(self.height) as usize;
        for y in 0..copy_h {
            let src = y * self.width as usize;
            let dst = y * width as usize;
            next[dst..dst + copy_w].copy_from_slice(&self.tiles[src..src + copy_w]);
        }
        self.width = width;
        self.height = height;
        self.tiles = next;
        self.seal_border();
    }

    /// Positions of every cell matching `pred`, in scan order (row-major,
    /// `y` outer, `x` inner).
    pub fn scan<'a>(
        &'a self,
        pred: impl Fn(TileKind) -> bool + 'a,
    ) -> impl Iterator<Item = (TilePos, TileKind)> + 'a {
        let width = self.width;
        self.tiles
            .iter()
            .enumerate()
            .filter(move |(_, t)| pred(**t))
            .map(move |(i, t)| {
                let i = i as u32;
                (TilePos::new(i % width, i / width), *t)
            })
    }

    fn seal_border(&mut self) {
        let (w, h) = (self.width, self.height);
        for x in 0..w {
            self.seal(x, 0);
            self.seal(x, h - 1);
        }
        for y in 0..h {
            self.seal(0, y);
            self.seal(w - 1, y);
        }
    }

    fn seal(&mut self, x: u32, y: u32) {
        let i = y as usize * self.width as usize + x as usize;
        if self.tiles[i] == TileKind::Empty {
            self.tiles[i] = TileKind::BORDER;
        }
    }
}
