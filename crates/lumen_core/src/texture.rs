//! Texture loading and caching for materials.
//!
//! Textures are stored as linear RGBA floats so the tracer can read both the
//! colour (which modulates kd) and the alpha (which feeds surface opacity).

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_math::{Color, Vec2};
use thiserror::Error;

/// Errors that can occur during texture loading.
#[derive(Error, Debug)]
pub enum TextureError {
    #[error("failed to load texture {path}: {source}")]
    Load {
        path: String,
        #[source]
        source: image::ImageError,
    },

    #[error("texture {0} has no pixels")]
    Empty(String),
}

pub type TextureResult<T> = Result<T, TextureError>;

/// A loaded texture with pixel data.
#[derive(Clone, Debug)]
pub struct Texture {
    pub width: u32,
    pub height: u32,

    /// Pixel data in RGBA format (linear, 0-1 range), row-major, first row on top
    pub pixels: Vec<[f32; 4]>,

    /// Original file path (for debugging)
    pub path: String,
}

impl Texture {
    /// Create a new texture from pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<[f32; 4]>, path: impl Into<String>) -> Self {
        Self {
            width,
            height,
            pixels,
            path: path.into(),
        }
    }

    /// Create a solid colour texture (1x1).
    pub fn solid(color: Color, alpha: f32) -> Self {
        Self::new(1, 1, vec![[color.x, color.y, color.z, alpha]], "<solid>")
    }

    /// Sample colour and alpha at texture coordinates (nearest texel).
    ///
    /// Coordinates wrap, with (0, 0) at the bottom-left of the image.
    pub fn sample(&self, uv: Vec2) -> (Color, f32) {
        let u = uv.x.rem_euclid(1.0);
        let v = uv.y.rem_euclid(1.0);

        let x = ((u * self.width as f32) as u32).min(self.width.saturating_sub(1));
        let y = (((1.0 - v) * self.height as f32) as u32).min(self.height.saturating_sub(1));

        let [r, g, b, a] = self.get_pixel(x, y);
        (Color::new(r, g, b), a)
    }

    fn get_pixel(&self, x: u32, y: u32) -> [f32; 4] {
        let idx = (y * self.width + x) as usize;
        self.pixels
            .get(idx)
            .copied()
            .unwrap_or([1.0, 1.0, 1.0, 1.0])
    }

    /// Get total size in bytes (approximate).
    pub fn size_bytes(&self) -> usize {
        self.pixels.len() * std::mem::size_of::<[f32; 4]>()
    }
}

/// Cache for loaded textures, keyed by the path as written in the scene.
pub struct TextureCache {
    textures: HashMap<String, Arc<Texture>>,
    base_dir: Option<PathBuf>,
}

impl TextureCache {
    /// Create a texture cache with a base directory for relative paths.
    pub fn with_base_dir(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            textures: HashMap::new(),
            base_dir: Some(base_dir.into()),
        }
    }

    /// Load a texture from file, using cache if available.
    pub fn load(&mut self, path: &str) -> TextureResult<Arc<Texture>> {
        if let Some(texture) = self.textures.get(path) {
            return Ok(texture.clone());
        }

        let full_path = self.resolve_path(path);
        let texture = Arc::new(load_texture_file(&full_path)?);
        self.textures.insert(path.to_string(), texture.clone());

        log::debug!(
            "Loaded texture: {} ({}x{}, {:.1} KB)",
            path,
            texture.width,
            texture.height,
            texture.size_bytes() as f32 / 1024.0
        );

        Ok(texture)
    }

    pub fn len(&self) -> usize {
        self.textures.len()
    }

    pub fn is_empty(&self) -> bool {
        self.textures.is_empty()
    }

    fn resolve_path(&self, path: &str) -> PathBuf {
        let path = Path::new(path);

        match &self.base_dir {
            Some(base) if path.is_relative() => base.join(path),
            _ => path.to_path_buf(),
        }
    }
}

fn load_texture_file(path: &Path) -> TextureResult<Texture> {
    let display = path.to_string_lossy().to_string();
    let img = image::open(path).map_err(|source| TextureError::Load {
        path: display.clone(),
        source,
    })?;

    let rgba = img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(TextureError::Empty(display));
    }

    let pixels: Vec<[f32; 4]> = rgba
        .pixels()
        .map(|p| {
            [
                srgb_to_linear(p[0]),
                srgb_to_linear(p[1]),
                srgb_to_linear(p[2]),
                p[3] as f32 / 255.0, // Alpha is linear
            ]
        })
        .collect();

    Ok(Texture::new(width, height, pixels, display))
}

/// Convert sRGB byte value to linear float.
fn srgb_to_linear(value: u8) -> f32 {
    let v = value as f32 / 255.0;
    if v <= 0.04045 {
        v / 12.92
    } else {
        ((v + 0.055) / 1.055).powf(2.4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_solid_texture() {
        let tex = Texture::solid(Color::new(1.0, 0.5, 0.0), 0.25);

        let (colour, alpha) = tex.sample(Vec2::new(0.3, 0.9));
        assert_eq!(colour, Color::new(1.0, 0.5, 0.0));
        assert_eq!(alpha, 0.25);
    }

    #[test]
    fn test_sample_orientation() {
        // 1x2 image: top texel red, bottom texel blue
        let tex = Texture::new(
            1,
            2,
            vec![[1.0, 0.0, 0.0, 1.0], [0.0, 0.0, 1.0, 0.5]],
            "test",
        );

        let (top, _) = tex.sample(Vec2::new(0.5, 0.9));
        let (bottom, alpha) = tex.sample(Vec2::new(0.5, 0.1));
        assert_eq!(top, Color::X);
        assert_eq!(bottom, Color::Z);
        assert_eq!(alpha, 0.5);

        // Coordinates wrap
        let (wrapped, _) = tex.sample(Vec2::new(1.5, 1.9));
        assert_eq!(wrapped, Color::X);
    }

    #[test]
    fn test_cache_missing_file() {
        let mut cache = TextureCache::with_base_dir("/nonexistent-lumen-dir");
        assert!(matches!(
            cache.load("missing.png"),
            Err(TextureError::Load { .. })
        ));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_cache_loads_png_once() {
        let dir = std::env::temp_dir().join(format!("lumen-texture-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        image::RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 51]))
            .save(dir.join("decal.png"))
            .unwrap();

        let mut cache = TextureCache::with_base_dir(&dir);
        let first = cache.load("decal.png").unwrap();
        let second = cache.load("decal.png").unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!((first.width, first.height), (2, 2));

        let (colour, alpha) = first.sample(Vec2::new(0.25, 0.75));
        assert!((colour - Color::X).length() < 1e-6);
        assert!((alpha - 0.2).abs() < 1e-6);

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_srgb_to_linear() {
        assert!((srgb_to_linear(0) - 0.0).abs() < 0.001);
        assert!((srgb_to_linear(255) - 1.0).abs() < 0.001);

        let mid = srgb_to_linear(128);
        assert!(mid < 0.5);
        assert!(mid > 0.1);
    }
}
