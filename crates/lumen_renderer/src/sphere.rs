//! Sphere primitive.

use std::f32::consts::PI;
use std::sync::Arc;

use lumen_core::Material;
use lumen_math::{Aabb, Interval, Vec2, Vec3};

use crate::hittable::{HitRecord, Hittable};
use crate::Ray;

/// A sphere primitive.
pub struct Sphere {
    center: Vec3,
    radius: f32,
    material: Arc<Material>,
    bbox: Aabb,
}

impl Sphere {
    /// Create a new sphere.
    pub fn new(center: Vec3, radius: f32, material: Arc<Material>) -> Self {
        let radius = radius.max(0.0);
        let rvec = Vec3::splat(radius);
        let bbox = Aabb::from_points(center - rvec, center + rvec);

        Self {
            center,
            radius,
            material,
            bbox,
        }
    }

    /// Get the UV coordinates for a point on the unit sphere.
    fn get_sphere_uv(p: Vec3) -> Vec2 {
        // theta: angle down from +Y
        // phi: angle around Y axis from +X
        let theta = (-p.y).clamp(-1.0, 1.0).acos();
        let phi = (-p.z).atan2(p.x) + PI;

        Vec2::new(phi / (2.0 * PI), theta / PI)
    }
}

impl Hittable for Sphere {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        _origin_part: Option<usize>,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        let oc = self.center - ray.origin();
        let a = ray.direction().length_squared();
        let h = ray.direction().dot(oc);
        let c = oc.length_squared() - self.radius * self.radius;

        let discriminant = h * h - a * c;
        if discriminant < 0.0 {
            return false;
        }

        let sqrtd = discriminant.sqrt();

        // Find the nearest root in the acceptable range
        let mut root = (h - sqrtd) / a;
        if !ray_t.surrounds(root) {
            root = (h + sqrtd) / a;
            if !ray_t.surrounds(root) {
                return false;
            }
        }

        rec.t = root;
        rec.p = ray.at(root);
        rec.normal = (rec.p - self.center) / self.radius;
        rec.uv = Self::get_sphere_uv(rec.normal);
        rec.material = self.material.as_ref();
        rec.part = 0;

        true
    }

    fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    fn describe(&self) -> String {
        format!("sphere at {} radius {}", self.center, self.radius)
    }
}
