//! Recursive Whitted-style ray tracer.
//!
//! A ray picks up emission and ambient light at the nearest surface, one
//! mirror bounce folded through the shading model, direct light from every
//! unshadowed point light and, for partially transparent surfaces, a
//! refracted contribution. Recursion stops at a fixed maximum depth.

use lumen_math::{Color, Vec3};

use crate::hittable::HitOrigin;
use crate::refraction::find_refraction_direction;
use crate::scene::Scene;
use crate::shading::{calc_iout, mirror};
use crate::Ray;

/// What a recorded ray segment represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SegmentKind {
    /// Eye-path ray that hit a surface
    Hit,
    /// Eye-path ray that left the scene
    Miss,
    /// Shadow ray stopped before reaching its light
    ShadowBlocked,
    /// Shadow ray that reached its light
    ShadowClear,
}

/// One traced ray, from its origin to where it ended.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RaySegment {
    pub start: Vec3,
    pub end: Vec3,
    pub kind: SegmentKind,
    /// Recursion depth of the eye-path ray (shadow rays use their parent's)
    pub depth: u32,
}

/// Per-call bookkeeping for [`Scene::trace_with`].
#[derive(Debug, Default)]
pub struct TraceContext {
    /// Eye-path rays traced (primary, mirror and refracted)
    pub rays: u64,
    /// Shadow rays cast towards lights
    pub shadow_rays: u64,
    /// Deepest recursion level that traced a ray
    pub deepest: u32,
    segments: Option<Vec<RaySegment>>,
}

impl TraceContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// A context that also records every ray segment.
    pub fn recording() -> Self {
        Self {
            segments: Some(Vec::new()),
            ..Self::default()
        }
    }

    pub fn is_recording(&self) -> bool {
        self.segments.is_some()
    }

    pub fn segments(&self) -> &[RaySegment] {
        self.segments.as_deref().unwrap_or(&[])
    }

    pub fn take_segments(&mut self) -> Vec<RaySegment> {
        self.segments.as_mut().map(std::mem::take).unwrap_or_default()
    }

    fn record(&mut self, segment: RaySegment) {
        if let Some(segments) = &mut self.segments {
            log::debug!(
                "{:indent$}{:?} {} -> {}",
                "",
                segment.kind,
                segment.start,
                segment.end,
                indent = 2 * segment.depth as usize
            );
            segments.push(segment);
        }
    }
}

impl Scene {
    /// Colour arriving back along `ray`.
    ///
    /// `depth` is the depth of the caller; primary rays pass 0. `origin` is
    /// the surface the ray leaves from, if any.
    pub fn trace(&self, ray: &Ray, depth: u32, origin: Option<HitOrigin>) -> Color {
        self.trace_with(&mut TraceContext::new(), ray, depth, origin)
    }

    /// [`Scene::trace`] with statistics and optional ray recording.
    pub fn trace_with(
        &self,
        ctx: &mut TraceContext,
        ray: &Ray,
        depth: u32,
        origin: Option<HitOrigin>,
    ) -> Color {
        let config = self.config();

        let depth = depth + 1;
        if depth > config.max_depth {
            return Color::ZERO;
        }

        ctx.rays += 1;
        ctx.deepest = ctx.deepest.max(depth);

        let hit = self.find_first_hit(ray, origin, f32::INFINITY);

        if ctx.is_recording() {
            let (end, kind) = match &hit {
                Some(hit) => (hit.rec.p, SegmentKind::Hit),
                None => (ray.at(2.0 * self.scene_scale()), SegmentKind::Miss),
            };
            ctx.record(RaySegment {
                start: ray.origin(),
                end,
                kind,
                depth,
            });
        }

        let Some(hit) = hit else {
            return if depth == 1 {
                config.background
            } else {
                Color::ZERO
            };
        };

        let here = Some(hit.origin());
        let rec = &hit.rec;
        let mat = rec.material;
        let n = rec.normal;
        let e = -ray.direction();

        let (texture_colour, texture_alpha) = self.objects()[hit.object].surface_colour(rec);
        let kd = texture_colour * mat.kd;

        let mut colour = mat.ie + mat.ka * config.ambient;

        // Mirror bounce, treated as one more light arriving along r
        let r = mirror(e, n);
        let incoming = self.trace_with(ctx, &Ray::new(rec.p, r), depth, here);
        colour += calc_iout(n, r, e, e, kd, mat.ks, mat.shininess, incoming);

        for light in self.lights() {
            let to_light = light.position - rec.p;
            if n.dot(to_light) <= 0.0 {
                continue;
            }

            let distance = to_light.length();
            let l = to_light / distance;

            let shadow_ray = Ray::new(rec.p, l);
            if self.light_visible(ctx, &shadow_ray, distance, light.position, here, depth) {
                colour += calc_iout(n, l, e, mirror(l, n), kd, mat.ks, mat.shininess, light.colour);
            }
        }

        let opacity = if config.use_texture_transparency {
            texture_alpha * mat.alpha
        } else {
            mat.alpha
        };

        if opacity < 1.0 {
            colour *= opacity;

            // No transmitted light under total internal reflection
            if let Some(dir) = find_refraction_direction(ray.direction(), n, config.refraction) {
                let transmitted = self.trace_with(ctx, &Ray::new(rec.p, dir), depth, here);
                colour += transmitted * (1.0 - opacity);
            }
        }

        colour
    }

    /// Shadow test: is nothing between the ray origin and a light `distance` away?
    fn light_visible(
        &self,
        ctx: &mut TraceContext,
        shadow_ray: &Ray,
        distance: f32,
        light_position: Vec3,
        origin: Option<HitOrigin>,
        depth: u32,
    ) -> bool {
        ctx.shadow_rays += 1;

        let blocker = self
            .find_first_hit(shadow_ray, origin, distance)
            .map(|hit| hit.rec.p);

        if ctx.is_recording() {
            let (end, kind) = match blocker {
                Some(p) => (p, SegmentKind::ShadowBlocked),
                None => (light_position, SegmentKind::ShadowClear),
            };
            ctx.record(RaySegment {
                start: shadow_ray.origin(),
                end,
                kind,
                depth,
            });
        }

        blocker.is_none()
    }
}
