//! Surface reflectance description consumed by the shading code.

use std::sync::Arc;

use lumen_math::{Color, Vec2};

use crate::texture::Texture;

/// Phong-style material.
///
/// Shared by reference (`Arc`) between every object or mesh face that uses
/// it, and never mutated while a frame is being traced.
#[derive(Clone, Debug)]
pub struct Material {
    /// Material name (as referenced from the scene description)
    pub name: String,

    /// Ambient reflectance
    pub ka: Color,

    /// Diffuse reflectance
    pub kd: Color,

    /// Specular reflectance
    pub ks: Color,

    /// Emitted radiance
    pub ie: Color,

    /// Phong shininess exponent
    pub shininess: f32,

    /// Opacity (0=fully transparent, 1=opaque)
    pub alpha: f32,

    /// Optional texture; its colour modulates kd and its alpha modulates opacity
    pub texture: Option<Arc<Texture>>,
}

impl Material {
    /// Black, non-reflective, opaque material.
    pub const BLACK: Material = Material {
        name: String::new(),
        ka: Color::ZERO,
        kd: Color::ZERO,
        ks: Color::ZERO,
        ie: Color::ZERO,
        shininess: 1.0,
        alpha: 1.0,
        texture: None,
    };

    /// Create a plain diffuse material.
    pub fn new(name: impl Into<String>, kd: Color) -> Self {
        Self {
            name: name.into(),
            kd,
            ..Default::default()
        }
    }

    pub fn with_ambient(mut self, ka: Color) -> Self {
        self.ka = ka;
        self
    }

    pub fn with_specular(mut self, ks: Color, shininess: f32) -> Self {
        self.ks = ks;
        self.shininess = shininess;
        self
    }

    pub fn with_emission(mut self, ie: Color) -> Self {
        self.ie = ie;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha.clamp(0.0, 1.0);
        self
    }

    pub fn with_texture(mut self, texture: Arc<Texture>) -> Self {
        self.texture = Some(texture);
        self
    }

    /// Colour and alpha of the texture at `uv`, or white/opaque without one.
    pub fn texture_colour(&self, uv: Vec2) -> (Color, f32) {
        match &self.texture {
            Some(texture) => texture.sample(uv),
            None => (Color::ONE, 1.0),
        }
    }
}

impl Default for Material {
    fn default() -> Self {
        Self {
            kd: Color::splat(0.5),
            ..Self::BLACK
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builder() {
        let m = Material::new("red", Color::new(1.0, 0.0, 0.0))
            .with_specular(Color::splat(0.3), 20.0)
            .with_alpha(1.5);

        assert_eq!(m.name, "red");
        assert_eq!(m.ks, Color::splat(0.3));
        assert_eq!(m.shininess, 20.0);
        assert_eq!(m.alpha, 1.0);
        assert_eq!(m.ie, Color::ZERO);
    }

    #[test]
    fn test_texture_colour() {
        let plain = Material::default();
        assert_eq!(plain.texture_colour(Vec2::new(0.2, 0.2)), (Color::ONE, 1.0));

        let textured = Material::default()
            .with_texture(Arc::new(Texture::solid(Color::new(0.0, 1.0, 0.0), 0.4)));
        assert_eq!(
            textured.texture_colour(Vec2::ZERO),
            (Color::new(0.0, 1.0, 0.0), 0.4)
        );
    }
}
