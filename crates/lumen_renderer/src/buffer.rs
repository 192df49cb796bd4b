//! Progressive RGBA image buffer.

use std::path::Path;

use lumen_math::{Color, Vec4};

/// Pixels produced so far by the progressive renderer.
///
/// Alpha 0 marks a pixel that has not been traced yet, alpha 1 a final one.
/// Row 0 is the bottom of the picture.
#[derive(Debug, Clone)]
pub struct ProgressiveImage {
    width: u32,
    height: u32,
    pixels: Vec<Vec4>,
}

impl ProgressiveImage {
    /// Create a buffer with every pixel transparent.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![Vec4::ZERO; (width * height) as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[Vec4] {
        &self.pixels
    }

    /// Get the pixel at (x, y).
    pub fn get(&self, x: u32, y: u32) -> Vec4 {
        self.pixels[(y * self.width + x) as usize]
    }

    /// Store a finished pixel.
    pub fn set(&mut self, x: u32, y: u32, colour: Color) {
        self.pixels[(y * self.width + x) as usize] = colour.extend(1.0);
    }

    pub fn is_rendered(&self, x: u32, y: u32) -> bool {
        self.get(x, y).w > 0.0
    }

    pub fn rendered_count(&self) -> usize {
        self.pixels.iter().filter(|p| p.w > 0.0).count()
    }

    /// Convert to an 8-bit image with the top row first.
    pub fn to_rgba8(&self) -> image::RgbaImage {
        image::RgbaImage::from_fn(self.width, self.height, |x, row| {
            let p = self.get(x, self.height - 1 - row);
            image::Rgba([
                to_u8(p.x),
                to_u8(p.y),
                to_u8(p.z),
                to_u8(p.w),
            ])
        })
    }

    /// Save as PNG (or any format `image` infers from the extension).
    pub fn save(&self, path: impl AsRef<Path>) -> image::ImageResult<()> {
        let path = path.as_ref();
        self.to_rgba8().save(path)?;
        log::info!("Saved {}x{} image to {}", self.width, self.height, path.display());
        Ok(())
    }
}

#[inline]
fn to_u8(value: f32) -> u8 {
    (255.0 * value.clamp(0.0, 1.0)).round() as u8
}
