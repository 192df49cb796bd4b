//! Hittable trait and HitRecord for ray-object intersection.

use lumen_core::Material;
use lumen_math::{Aabb, Color, Interval, Vec2, Vec3};

use crate::Ray;

/// Record of a ray-object intersection.
#[derive(Clone, Debug)]
pub struct HitRecord<'a> {
    /// Point of intersection
    pub p: Vec3,
    /// Outward-pointing unit surface normal (not flipped towards the ray)
    pub normal: Vec3,
    /// Texture coordinates
    pub uv: Vec2,
    /// Ray parameter where the intersection occurs
    pub t: f32,
    /// Material at the intersection point
    pub material: &'a Material,
    /// Part of the object that was hit (mesh face index, 0 for primitives)
    pub part: usize,
}

/// Material reported by an empty record.
static NO_MATERIAL: Material = Material::BLACK;

impl<'a> Default for HitRecord<'a> {
    fn default() -> Self {
        Self {
            p: Vec3::ZERO,
            normal: Vec3::ZERO,
            uv: Vec2::ZERO,
            t: f32::INFINITY,
            material: &NO_MATERIAL,
            part: 0,
        }
    }
}

/// The object (and part of it) that a secondary ray leaves from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HitOrigin {
    pub object: usize,
    pub part: usize,
}

/// Trait for scene objects that can be hit by rays.
pub trait Hittable: Send + Sync {
    /// Test if a ray hits this object strictly inside `ray_t`.
    ///
    /// `origin_part` is set when the ray leaves from this very object; that
    /// part must not be reported again. Returns true if hit, and fills in
    /// the hit record. The record is left untouched on a miss.
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        origin_part: Option<usize>,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
    ) -> bool;

    /// Texture colour and alpha at a hit on this object.
    fn surface_colour(&self, rec: &HitRecord) -> (Color, f32) {
        rec.material.texture_colour(rec.uv)
    }

    /// Convex objects can never be hit again by a ray leaving their surface,
    /// so the intersection resolver skips them as a whole.
    fn is_convex(&self) -> bool {
        true
    }

    /// Get the axis-aligned bounding box of this object.
    fn bounding_box(&self) -> Aabb;

    /// Short human readable description for logs.
    fn describe(&self) -> String;
}
