//! Ray tracer settings.
//!
//! Every field has a default, so a scene file only needs to mention the
//! knobs it wants to change.

use lumen_math::Color;
use serde::Deserialize;

/// Refractive indices used by the refraction solver.
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct RefractiveIndices {
    /// Index of the medium outside closed surfaces (air)
    pub outside: f32,
    /// Index of the medium inside closed surfaces (glass)
    pub inside: f32,
}

impl RefractiveIndices {
    pub const AIR_GLASS: RefractiveIndices = RefractiveIndices {
        outside: 1.008,
        inside: 1.510,
    };
}

impl Default for RefractiveIndices {
    fn default() -> Self {
        Self::AIR_GLASS
    }
}

/// Render configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct RenderConfig {
    /// Maximum recursion depth (primary rays are depth 1)
    pub max_depth: u32,
    /// Sub-pixel samples per axis; a pixel fires `pixel_samples²` rays
    pub pixel_samples: u32,
    /// Perturb each sub-pixel sample randomly inside its grid cell
    pub jitter: bool,
    /// RNG seed used at every restart
    pub seed: u64,
    /// Scene ambient illumination (Ia)
    pub ambient: Color,
    /// Colour returned by primary rays that miss everything
    pub background: Color,
    /// Let texture alpha contribute to surface opacity
    pub use_texture_transparency: bool,
    pub refraction: RefractiveIndices,
    /// Window pixels per traced pixel along each axis (power of two)
    pub pixel_scale: u32,
    /// Minimum time between progressive redisplays
    pub display_interval_secs: f32,
    /// Pixel whose rays are recorded and logged
    pub debug_pixel: Option<[u32; 2]>,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            max_depth: 4,
            pixel_samples: 1,
            jitter: false,
            seed: 754_376_105,
            ambient: Color::splat(0.1),
            background: Color::ZERO,
            use_texture_transparency: true,
            refraction: RefractiveIndices::default(),
            pixel_scale: 1,
            display_interval_secs: 0.5,
            debug_pixel: None,
        }
    }
}

impl RenderConfig {
    /// Number of rays fired through one pixel.
    pub fn samples_per_pixel(&self) -> u32 {
        self.pixel_samples * self.pixel_samples
    }

    /// Clamp values that would make the renderer misbehave.
    pub fn sanitized(mut self) -> Self {
        self.pixel_samples = self.pixel_samples.max(1);
        self.pixel_scale = self.pixel_scale.max(1).next_power_of_two();
        self.display_interval_secs = self.display_interval_secs.max(0.0);
        self
    }

    /// One-line summary for on-screen display.
    pub fn status_message(&self) -> String {
        format!(
            "{n}x{n} pixel rays, max depth {d}{j}",
            n = self.pixel_samples,
            d = self.max_depth,
            j = if self.jitter { ", jitter" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: RenderConfig =
            serde_json::from_str(r#"{ "max_depth": 2, "jitter": true }"#).unwrap();

        assert_eq!(config.max_depth, 2);
        assert!(config.jitter);
        assert_eq!(config.pixel_samples, 1);
        assert_eq!(config.refraction, RefractiveIndices::AIR_GLASS);
        assert_eq!(config.seed, 754_376_105);
    }

    #[test]
    fn test_sanitized() {
        let config = RenderConfig {
            pixel_samples: 0,
            pixel_scale: 3,
            ..Default::default()
        }
        .sanitized();

        assert_eq!(config.pixel_samples, 1);
        assert_eq!(config.pixel_scale, 4);
    }

    #[test]
    fn test_status_message() {
        let mut config = RenderConfig {
            pixel_samples: 3,
            ..Default::default()
        };
        assert_eq!(config.status_message(), "3x3 pixel rays, max depth 4");

        config.jitter = true;
        assert_eq!(config.status_message(), "3x3 pixel rays, max depth 4, jitter");
    }
}
