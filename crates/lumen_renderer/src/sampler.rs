//! Pixel sampling through the image plane.

use lumen_core::Eye;
use lumen_math::{Color, Vec3};
use rand::{Rng, RngCore};

use crate::scene::Scene;
use crate::tracer::{RaySegment, TraceContext};
use crate::Ray;

/// Image plane one unit in front of the eye.
///
/// Pixel `(x, y)` is centred on `ll_corner + x * right + y * up`, so pixel
/// `(0, 0)` is the lower-left pixel and `y` grows upwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImagePlane {
    pub eye: Vec3,
    pub ll_corner: Vec3,
    /// Offset between horizontally adjacent pixels
    pub right: Vec3,
    /// Offset between vertically adjacent pixels
    pub up: Vec3,
}

impl ImagePlane {
    pub fn new(eye: &Eye, width: u32, height: u32) -> Self {
        let forward = eye.forward();
        let right_dir = forward.cross(eye.up).normalize_or_zero();
        let up_dir = right_dir.cross(forward).normalize_or_zero();

        let extent = 2.0 * (eye.fovy.to_radians() / 2.0).tan();
        let aspect = width.max(1) as f32 / height.max(1) as f32;

        let up = extent * up_dir;
        let right = extent * aspect * right_dir;
        let ll_corner = forward - 0.5 * up - 0.5 * right;

        Self {
            eye: eye.position,
            ll_corner,
            right: right / (width.max(2) - 1) as f32,
            up: up / (height.max(2) - 1) as f32,
        }
    }

    /// Unit direction from the eye through image position `(x, y)`.
    pub fn direction(&self, x: f32, y: f32) -> Vec3 {
        (self.ll_corner + x * self.right + y * self.up).normalize()
    }
}

/// Result of tracing one pixel with full recording.
#[derive(Debug, Clone)]
pub struct PixelInspection {
    /// Sum over all sub-pixel samples
    pub colour: Color,
    pub rays: u64,
    pub shadow_rays: u64,
    pub deepest: u32,
    pub segments: Vec<RaySegment>,
}

impl Scene {
    /// Sum of the colours seen through the sub-pixels of `(x, y)`.
    ///
    /// `pixel_samples²` rays are fired on a regular grid, or with each sample
    /// placed randomly inside its grid cell when jitter is on. The result is
    /// not averaged: divide by [`RenderConfig::samples_per_pixel`] to
    /// normalise.
    ///
    /// [`RenderConfig::samples_per_pixel`]: lumen_core::RenderConfig::samples_per_pixel
    pub fn pixel_colour(&self, x: u32, y: u32, plane: &ImagePlane, rng: &mut dyn RngCore) -> Color {
        if self.config().debug_pixel == Some([x, y]) {
            return self.inspect_pixel(x, y, plane, rng).colour;
        }
        self.sample_pixel(&mut TraceContext::new(), x, y, plane, rng)
    }

    /// Trace a pixel while recording statistics and every ray segment.
    pub fn inspect_pixel(
        &self,
        x: u32,
        y: u32,
        plane: &ImagePlane,
        rng: &mut dyn RngCore,
    ) -> PixelInspection {
        log::debug!("---- start debugging at pixel ({}, {}) ----", x, y);

        let mut ctx = TraceContext::recording();
        let colour = self.sample_pixel(&mut ctx, x, y, plane, rng);

        log::debug!(
            "---- stop debugging: colour {}, {} rays, {} shadow rays ----",
            colour,
            ctx.rays,
            ctx.shadow_rays
        );

        PixelInspection {
            colour,
            rays: ctx.rays,
            shadow_rays: ctx.shadow_rays,
            deepest: ctx.deepest,
            segments: ctx.take_segments(),
        }
    }

    fn sample_pixel(
        &self,
        ctx: &mut TraceContext,
        x: u32,
        y: u32,
        plane: &ImagePlane,
        rng: &mut dyn RngCore,
    ) -> Color {
        let config = self.config();
        let n = config.pixel_samples.max(1);
        let cell = 1.0 / n as f32;

        let mut sum = Color::ZERO;
        for i in 0..n {
            for j in 0..n {
                let (dx, dy) = if config.jitter {
                    (rng.gen::<f32>(), rng.gen::<f32>())
                } else {
                    (0.5, 0.5)
                };

                let sub_x = x as f32 - 0.5 + (i as f32 + dx) * cell;
                let sub_y = y as f32 - 0.5 + (j as f32 + dy) * cell;

                let ray = Ray::new(plane.eye, plane.direction(sub_x, sub_y));
                sum += self.trace_with(ctx, &ray, 0, None);
            }
        }

        sum
    }
}
