//! Mesh objects: many triangles sharing one scene object slot.
//!
//! Unlike spheres and single triangles a mesh is not convex, so a ray that
//! leaves one of its faces may hit another face of the same mesh. Only the
//! originating face is excluded.

use std::sync::Arc;

use lumen_core::Mesh;
use lumen_math::{Aabb, Interval, Vec2, Vec3};

use crate::bvh::FaceBvh;
use crate::hittable::{HitRecord, Hittable};
use crate::triangle::{face_normal, intersect_triangle};
use crate::Ray;

/// A triangle mesh with a BVH over its faces.
pub struct MeshObject {
    mesh: Arc<Mesh>,
    face_normals: Vec<Vec3>,
    bvh: FaceBvh,
}

impl MeshObject {
    pub fn new(mesh: Arc<Mesh>) -> Self {
        let mut face_normals = Vec::with_capacity(mesh.triangle_count());
        let mut face_bounds = Vec::with_capacity(mesh.triangle_count());

        for face in 0..mesh.triangle_count() {
            let verts = Self::face_vertices(&mesh, face);
            face_normals.push(face_normal(&verts));
            face_bounds.push(Aabb::from_point_cloud(verts));
        }

        let bvh = FaceBvh::new(&face_bounds);
        log::debug!(
            "Built BVH for {} ({} faces)",
            mesh.name,
            mesh.triangle_count()
        );

        Self {
            mesh,
            face_normals,
            bvh,
        }
    }

    fn face_vertices(mesh: &Mesh, face: usize) -> [Vec3; 3] {
        let [a, b, c] = mesh.face(face);
        [mesh.positions[a], mesh.positions[b], mesh.positions[c]]
    }

    /// Shading normal: interpolated vertex normals when the mesh has them.
    fn shading_normal(&self, face: usize, u: f32, v: f32) -> Vec3 {
        let face_normal = self.face_normals[face];
        let Some(normals) = &self.mesh.normals else {
            return face_normal;
        };

        let [a, b, c] = self.mesh.face(face);
        let n = (1.0 - u - v) * normals[a] + u * normals[b] + v * normals[c];
        let n = n.normalize_or_zero();
        if n == Vec3::ZERO {
            face_normal
        } else {
            n
        }
    }

    fn texcoords(&self, face: usize, u: f32, v: f32) -> Vec2 {
        match &self.mesh.uvs {
            Some(uvs) => {
                let [a, b, c] = self.mesh.face(face);
                (1.0 - u - v) * uvs[a] + u * uvs[b] + v * uvs[c]
            }
            None => Vec2::new(u, v),
        }
    }
}

impl Hittable for MeshObject {
    fn hit<'a>(
        &'a self,
        ray: &Ray,
        origin_part: Option<usize>,
        ray_t: Interval,
        rec: &mut HitRecord<'a>,
    ) -> bool {
        let mut nearest = None;

        self.bvh.nearest(ray, ray_t, &mut |face, interval| {
            if origin_part == Some(face) {
                return None;
            }
            let verts = Self::face_vertices(&self.mesh, face);
            let (t, u, v) = intersect_triangle(ray, &verts, interval)?;
            nearest = Some((face, t, u, v));
            Some(t)
        });

        let Some((face, t, u, v)) = nearest else {
            return false;
        };

        rec.t = t;
        rec.p = ray.at(t);
        rec.normal = self.shading_normal(face, u, v);
        rec.uv = self.texcoords(face, u, v);
        rec.material = self.mesh.face_material(face).as_ref();
        rec.part = face;

        true
    }

    fn is_convex(&self) -> bool {
        false
    }

    fn bounding_box(&self) -> Aabb {
        self.bvh.bounding_box()
    }

    fn describe(&self) -> String {
        format!("mesh {} ({} faces)", self.mesh.name, self.mesh.triangle_count())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::Material;
    use lumen_math::Color;

    /// Two faces of an open box: floor (y=0, facing +Y) and a wall (x=1, facing -X).
    fn corner() -> MeshObject {
        let mesh = Mesh::new(
            "corner",
            vec![
                Vec3::new(-1.0, 0.0, -1.0),
                Vec3::new(-1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, -1.0),
                Vec3::new(1.0, 2.0, -1.0),
                Vec3::new(1.0, 2.0, 1.0),
            ],
            vec![0, 1, 2, 0, 2, 3, 3, 2, 5, 3, 5, 4],
            Arc::new(Material::new("white", Color::ONE)),
        );
        MeshObject::new(Arc::new(mesh))
    }

    #[test]
    fn test_mesh_hit_reports_face() {
        let mesh = corner();
        let ray = Ray::new(Vec3::new(0.5, 1.0, -0.5), Vec3::new(0.0, -1.0, 0.0));
        let mut rec = HitRecord::default();

        assert!(mesh.hit(&ray, None, Interval::FORWARD, &mut rec));
        assert!((rec.t - 1.0).abs() < 1e-4);
        assert!(rec.part < 2, "expected a floor face, got {}", rec.part);
        assert!((rec.normal - Vec3::Y).length() < 1e-4);
        assert!(!mesh.is_convex());
    }

    #[test]
    fn test_mesh_excludes_only_origin_face() {
        let mesh = corner();
        let mut rec = HitRecord::default();

        // Leave the floor towards the wall
        let ray = Ray::new(Vec3::new(0.0, 0.0, -0.5), Vec3::new(1.0, 1.0, 0.0));
        let mut floor = HitRecord::default();
        let down = Ray::new(Vec3::new(0.0, 1.0, -0.5), Vec3::new(0.0, -1.0, 0.0));
        assert!(mesh.hit(&down, None, Interval::FORWARD, &mut floor));

        assert!(mesh.hit(&ray, Some(floor.part), Interval::FORWARD, &mut rec));
        assert!(rec.part >= 2, "expected a wall face, got {}", rec.part);
        assert!((rec.p.x - 1.0).abs() < 1e-4);
    }
}
