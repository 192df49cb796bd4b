//! Triangle primitive.
//!
//! Uses the Möller-Trumbore algorithm for ray-triangle intersection.

use std::sync::Arc;

use lumen_core::Material;
use lumen_math::{Aabb, Interval, Vec2, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::Ray;

/// A single triangle with its own material.
pub struct Triangle {
    /// Vertices
    verts: [Vec3; 3],
    /// Texture coordinates per vertex
    texcoords: [Vec2; 3],
    /// Pre-computed face normal (unit length, counter-clockwise winding)
    normal: Vec3,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Triangle {
    /// Create a new triangle from three vertices.
    pub fn new(verts: [Vec3; 3], material: Arc<Material>) -> Self {
        Self::with_texcoords(verts, [Vec2::ZERO, Vec2::X, Vec2::Y], material)
    }

    /// Create a textured triangle.
    pub fn with_texcoords(verts: [Vec3; 3], texcoords: [Vec2; 3], material: Arc<Material>) -> Self {
        let normal = face_normal(&verts);
        if normal == Vec3::ZERO {
            log::warn!("degenerate triangle {:?}", verts);
        }

        Self {
            verts,
            texcoords,
            normal,
            material,
            bbox: Aabb::from_point_cloud(verts),
        }
    }
}

/// Unit normal of a counter-clockwise triangle (zero if degenerate).
pub(crate) fn face_normal(verts: &[Vec3; 3]) -> Vec3 {
    (verts[1] - verts[0])
        .cross(verts[2] - verts[0])
        .normalize_or_zero()
}

/// Möller-Trumbore ray-triangle intersection.
///
/// Returns `(t, u, v)` where `u` and `v` are the barycentric weights of the
/// second and third vertex, if the hit lies strictly inside `ray_t`.
pub(crate) fn intersect_triangle(ray: &Ray, verts: &[Vec3; 3], ray_t: Interval) -> Option<(f32, f32, f32)> {
    let edge1 = verts[1] - verts[0];
    let edge2 = verts[2] - verts[0];

    let h = ray.direction().cross(edge2);
    let a = edge1.dot(h);

    // Ray is parallel to triangle
    if a.abs() < 1e-8 {
        return None;
    }

    let f = 1.0 / a;
    let s = ray.origin() - verts[0];
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * ray.direction().dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    ray_t.surrounds(t).then_some((t, u, v))
}

impl Hittable for Triangle {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        _origin_part: Option<usize>,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        let Some((t, u, v)) = intersect_triangle(ray, &self.verts, ray_t) else {
            return false;
        };

        rec.t = t;
        rec.p = ray.at(t);
        rec.normal = self.normal;
        rec.uv = (1.0 - u - v) * self.texcoords[0] + u * self.texcoords[1] + v * self.texcoords[2];
        rec.material = self.material.as_ref();
        rec.part = 0;

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn describe(&self) -> String {
        format!(
            "triangle {} {} {}",
            self.verts[0], self.verts[1], self.verts[2]
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_math::Color;

    fn test_triangle() -> Triangle {
        // Triangle in XY plane at z=-1, facing +Z
        Triangle::with_texcoords(
            [
                Vec3::new(-1.0, -1.0, -1.0),
                Vec3::new(1.0, -1.0, -1.0),
                Vec3::new(0.0, 1.0, -1.0),
            ],
            [Vec2::ZERO, Vec2::X, Vec2::Y],
            Arc::new(Material::new("grey", Color::splat(0.5))),
        )
    }

    #[test]
    fn test_triangle_hit() {
        let tri = test_triangle();
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, -1.0));
        let mut rec = HitRecord::default();

        assert!(tri.hit(&ray, None, Interval::FORWARD, &mut rec));
        assert!((rec.t - 1.0).abs() < 0.001);
        assert!((rec.normal - Vec3::Z).length() < 0.001);
        // Barycentric (0.25, 0.25, 0.5) at the origin's projection
        assert!((rec.uv - Vec2::new(0.25, 0.5)).length() < 0.001);
    }

    #[test]
    fn test_triangle_miss() {
        let tri = test_triangle();
        let mut rec = HitRecord::default();

        // Pointing away
        let ray = Ray::new(Vec3::ZERO, Vec3::new(0.0, 0.0, 1.0));
        assert!(!tri.hit(&ray, None, Interval::FORWARD, &mut rec));

        // Outside the edges
        let ray = Ray::new(Vec3::new(5.0, 0.0, 0.0), Vec3::new(0.0, 0.0, -1.0));
        assert!(!tri.hit(&ray, None, Interval::FORWARD, &mut rec));
    }

    #[test]
    fn test_face_normal_degenerate() {
        let verts = [Vec3::ZERO, Vec3::X, Vec3::new(2.0, 0.0, 0.0)];
        assert_eq!(face_normal(&verts), Vec3::ZERO);
    }
}
