//! Renderable scene and the intersection resolver.

use lumen_core::{Light, ObjectData, RenderConfig, SceneData, SceneError, SceneResult};
use lumen_math::{Aabb, Interval};

use crate::hittable::{HitOrigin, HitRecord, Hittable};
use crate::mesh::MeshObject;
use crate::sphere::Sphere;
use crate::triangle::Triangle;
use crate::Ray;

/// Smallest ray parameter accepted as a hit.
pub const MIN_HIT_T: f32 = 1e-4;

/// Nearest intersection found by [`Scene::find_first_hit`].
#[derive(Debug)]
pub struct Intersection<'a> {
    /// Index of the object that was hit
    pub object: usize,
    pub rec: HitRecord<'a>,
}

impl Intersection<'_> {
    /// Origin to hand to rays leaving this hit.
    pub fn origin(&self) -> HitOrigin {
        HitOrigin {
            object: self.object,
            part: self.rec.part,
        }
    }
}

/// Objects, lights and settings of one frame.
///
/// Nothing in here may change while a frame is in progress; callers restart
/// the progressive renderer after any edit.
pub struct Scene {
    objects: Vec<Box<dyn Hittable>>,
    lights: Vec<Light>,
    config: RenderConfig,
    bbox: Aabb,
}

impl Scene {
    pub fn new(config: RenderConfig) -> Self {
        Self {
            objects: Vec::new(),
            lights: Vec::new(),
            config: config.sanitized(),
            bbox: Aabb::EMPTY,
        }
    }

    /// Build renderer geometry for a resolved scene description.
    pub fn from_data(data: &SceneData) -> SceneResult<Self> {
        if data.lights.is_empty() {
            return Err(SceneError::NoLights(data.name.clone()));
        }

        let mut scene = Self::new(data.render.clone());

        for object in &data.objects {
            match object {
                ObjectData::Sphere {
                    center,
                    radius,
                    material,
                } => scene.add(Box::new(Sphere::new(*center, *radius, material.clone()))),
                ObjectData::Triangle {
                    vertices,
                    texcoords,
                    material,
                } => scene.add(Box::new(Triangle::with_texcoords(
                    *vertices,
                    *texcoords,
                    material.clone(),
                ))),
                ObjectData::Mesh(mesh) => {
                    if mesh.triangle_count() == 0 {
                        log::warn!("Skipping empty mesh {}", mesh.name);
                        continue;
                    }
                    scene.add(Box::new(MeshObject::new(mesh.clone())));
                }
            }
        }

        for light in &data.lights {
            scene.add_light(light.clone());
        }

        log::debug!(
            "Built renderer scene {}: {} objects, {} lights, {} triangles",
            data.name,
            scene.objects.len(),
            scene.lights.len(),
            data.triangle_count()
        );

        Ok(scene)
    }

    pub fn add(&mut self, object: Box<dyn Hittable>) {
        log::debug!("Adding object {}: {}", self.objects.len(), object.describe());
        self.bbox = Aabb::surrounding(&self.bbox, &object.bounding_box());
        self.objects.push(object);
    }

    pub fn add_light(&mut self, light: Light) {
        self.lights.push(light);
    }

    pub fn objects(&self) -> &[Box<dyn Hittable>] {
        &self.objects
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Change settings. The caller must restart any frame in progress.
    pub fn set_config(&mut self, config: RenderConfig) {
        self.config = config.sanitized();
    }

    pub fn bounding_box(&self) -> Aabb {
        self.bbox
    }

    /// Size of the scene, used to give escaping debug rays a visible length.
    pub fn scene_scale(&self) -> f32 {
        let diagonal = self.bbox.diagonal();
        if diagonal.is_finite() && diagonal > 0.0 {
            diagonal
        } else {
            1.0
        }
    }

    /// Status line describing the sampling settings.
    pub fn status_message(&self) -> String {
        self.config.status_message()
    }

    /// Find the nearest object hit by `ray` with `MIN_HIT_T < t < max_t`.
    ///
    /// When the ray leaves a surface, `origin` names that surface. A convex
    /// origin object is not tested at all, while a non-convex one (a mesh)
    /// is tested with only the originating part excluded. On equal ray
    /// parameters the first object in the list wins.
    pub fn find_first_hit(
        &self,
        ray: &Ray,
        origin: Option<HitOrigin>,
        max_t: f32,
    ) -> Option<Intersection<'_>> {
        let mut rec = HitRecord::default();
        let mut ray_t = Interval::new(MIN_HIT_T, max_t);
        let mut nearest = None;

        for (index, object) in self.objects.iter().enumerate() {
            let origin_part = match origin {
                Some(o) if o.object == index => {
                    if object.is_convex() {
                        continue;
                    }
                    Some(o.part)
                }
                _ => None,
            };

            if object.hit(ray, origin_part, ray_t, &mut rec) {
                ray_t = ray_t.clip_max(rec.t);
                nearest = Some(index);
            }
        }

        nearest.map(|object| Intersection { object, rec })
    }
}
