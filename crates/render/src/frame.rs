use crate::palette::Rgba;
use crate::texture::Texture;
use std::ops::Range;
use std::path::Path;

/// Pixels whose centres fall inside `start..start + len`, clipped to
/// `0..limit`.
pub(crate) fn span(start: f32, len: f32, limit: u32) -> Range<u32> {
    let hi = (start + len - 0.5).ceil().clamp(0.0, limit as f32);
    let lo = (start - 0.5).ceil().clamp(0.0, hi);
    lo as u32..hi as u32
}

/// An RGBA8 software framebuffer.
#[derive(Debug, Clone, PartialEq)]
pub struct Framebuffer {
    width: u32,
    height: u32,
    pixels: Vec<Rgba>,
}

impl Framebuffer {
    pub fn new(width: u32, height: u32, fill: Rgba) -> Self {
        Self {
            width,
            height,
            pixels: vec![fill; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Rgba] {
        &self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba> {
        (x < self.width && y < self.height).then(|| self.pixels[(y * self.width + x) as usize])
    }

    fn blend(&mut self, x: u32, y: u32, color: Rgba, opacity: f32) {
        let i = (y * self.width + x) as usize;
        self.pixels[i] = color.over(self.pixels[i], opacity);
    }

    /// Fill a rectangle given in pixel coordinates, clipped to the frame.
    pub fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Rgba, opacity: f32) {
        for py in span(y, h, self.height) {
            for px in span(x, w, self.width) {
                self.blend(px, py, color, opacity);
            }
        }
    }

    /// Stretch one texel column of `texture` over screen column `column`
    /// from `top` for `height` pixels.
    pub fn draw_texture_column(
        &mut self,
        texture: &Texture,
        src_x: u32,
        column: u32,
        top: f32,
        height: f32,
        opacity: f32,
    ) {
        if column >= self.width || height <= 0.0 {
            return;
        }
        for py in span(top, height, self.height) {
            let v = (py as f32 + 0.5 - top) / height;
            let ty = (v * texture.height() as f32).floor().max(0.0) as u32;
            self.blend(column, py, texture.texel(src_x, ty), opacity);
        }
    }

    /// Draw `texture` scaled into the given rectangle, optionally mirrored
    /// left to right. Texel alpha is respected.
    pub fn draw_texture(&mut self, texture: &Texture, x: f32, y: f32, w: f32, h: f32, mirrored: bool) {
        if w <= 0.0 || h <= 0.0 {
            return;
        }
        for py in span(y, h, self.height) {
            let v = (py as f32 + 0.5 - y) / h;
            for px in span(x, w, self.width) {
                let mut u = (px as f32 + 0.5 - x) / w;
                if mirrored {
                    u = 1.0 - u;
                }
                self.blend(px, py, texture.sample(u, v), 1.0);
            }
        }
    }

    pub fn to_image(&self) -> image::RgbaImage {
        let raw = self.pixels.iter().flat_map(|p| p.0).collect();
        // The buffer length always matches the dimensions.
        image::RgbaImage::from_raw(self.width, self.height, raw)
            .unwrap_or_else(|| image::RgbaImage::new(self.width, self.height))
    }

    pub fn save_png(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        self.to_image()
            .save_with_format(path, image::ImageFormat::Png)
    }
}
