//! Triangle mesh geometry.
//!
//! A mesh is populated from a Wavefront OBJ file (with its MTL library) and
//! handed to the renderer, which builds the intersection structures. Each
//! face remembers which material it uses.

use std::path::Path;
use std::sync::Arc;

use lumen_math::{Color, Vec2, Vec3};

use crate::material::Material;
use crate::scene::{SceneError, SceneResult};
use crate::texture::TextureCache;

/// A mesh of triangles with per-face materials.
#[derive(Clone, Debug)]
pub struct Mesh {
    /// Mesh name (usually the file name)
    pub name: String,

    /// Vertex positions (one Vec3 per vertex)
    pub positions: Vec<Vec3>,

    /// Vertex normals (optional - one per vertex)
    pub normals: Option<Vec<Vec3>>,

    /// UV coordinates (optional - one per vertex)
    pub uvs: Option<Vec<Vec2>>,

    /// Triangle indices (every 3 indices form a triangle)
    pub indices: Vec<u32>,

    /// Index into `materials` for every triangle
    pub face_materials: Vec<usize>,

    /// Materials referenced by `face_materials`
    pub materials: Vec<Arc<Material>>,
}

impl Mesh {
    /// Create a mesh where every face uses `material`.
    pub fn new(
        name: impl Into<String>,
        positions: Vec<Vec3>,
        indices: Vec<u32>,
        material: Arc<Material>,
    ) -> Self {
        let face_materials = vec![0; indices.len() / 3];
        Self {
            name: name.into(),
            positions,
            normals: None,
            uvs: None,
            indices,
            face_materials,
            materials: vec![material],
        }
    }

    /// Get the number of triangles in the mesh.
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Get the number of vertices in the mesh.
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Vertex indices of triangle `face`.
    pub fn face(&self, face: usize) -> [usize; 3] {
        let base = face * 3;
        [
            self.indices[base] as usize,
            self.indices[base + 1] as usize,
            self.indices[base + 2] as usize,
        ]
    }

    /// Material of triangle `face`.
    pub fn face_material(&self, face: usize) -> &Arc<Material> {
        let index = self.face_materials.get(face).copied().unwrap_or(0);
        &self.materials[index.min(self.materials.len() - 1)]
    }

    /// Drop triangles that reference missing vertices.
    ///
    /// Returns the number of triangles removed.
    pub fn remove_invalid_faces(&mut self) -> usize {
        let vertex_count = self.positions.len();
        let before = self.triangle_count();

        let mut indices = Vec::with_capacity(self.indices.len());
        let mut face_materials = Vec::with_capacity(before);
        for (face, chunk) in self.indices.chunks_exact(3).enumerate() {
            if chunk.iter().all(|&i| (i as usize) < vertex_count) {
                indices.extend_from_slice(chunk);
                face_materials.push(self.face_materials.get(face).copied().unwrap_or(0));
            } else {
                log::warn!(
                    "{}: invalid triangle indices {:?}, vertex count: {}",
                    self.name,
                    chunk,
                    vertex_count
                );
            }
        }

        self.indices = indices;
        self.face_materials = face_materials;
        before - self.triangle_count()
    }

    /// Load a Wavefront OBJ file and its materials.
    ///
    /// Faces are triangulated and all models of the file are merged into one
    /// mesh. Materials missing from the MTL library fall back to grey.
    pub fn load_obj(path: impl AsRef<Path>) -> SceneResult<Mesh> {
        let path = path.as_ref();
        let (models, obj_materials) = tobj::load_obj(
            path,
            &tobj::LoadOptions {
                single_index: true,
                triangulate: true,
                ..Default::default()
            },
        )
        .map_err(|source| SceneError::Obj {
            path: path.display().to_string(),
            source,
        })?;

        if models.is_empty() {
            return Err(SceneError::Invalid(format!(
                "no models found in {}",
                path.display()
            )));
        }

        let obj_materials = obj_materials.unwrap_or_else(|e| {
            log::warn!("{}: could not load material library: {}", path.display(), e);
            Vec::new()
        });

        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let mut textures = TextureCache::with_base_dir(base_dir);
        let mut materials: Vec<Arc<Material>> = obj_materials
            .iter()
            .map(|m| Arc::new(convert_material(m, &mut textures)))
            .collect();
        let fallback = materials.len();
        materials.push(Arc::new(Material::new("default", Color::splat(0.5))));

        let mut positions = Vec::new();
        let mut normals = Vec::new();
        let mut uvs = Vec::new();
        let mut indices = Vec::new();
        let mut face_materials = Vec::new();
        let mut all_have_normals = true;
        let mut all_have_uvs = true;

        for model in &models {
            let mesh = &model.mesh;
            let offset = positions.len() as u32;
            let vertex_count = mesh.positions.len() / 3;

            positions.extend(mesh.positions.chunks_exact(3).map(|p| Vec3::new(p[0], p[1], p[2])));

            if mesh.normals.len() == mesh.positions.len() {
                normals.extend(mesh.normals.chunks_exact(3).map(|n| Vec3::new(n[0], n[1], n[2])));
            } else {
                all_have_normals = false;
            }

            if mesh.texcoords.len() / 2 == vertex_count {
                uvs.extend(mesh.texcoords.chunks_exact(2).map(|t| Vec2::new(t[0], t[1])));
            } else {
                all_have_uvs = false;
            }

            indices.extend(mesh.indices.iter().map(|i| i + offset));

            let material = mesh
                .material_id
                .filter(|&id| id < fallback)
                .unwrap_or(fallback);
            face_materials.extend(std::iter::repeat(material).take(mesh.indices.len() / 3));
        }

        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();

        let mut mesh = Mesh {
            name,
            positions,
            normals: all_have_normals.then_some(normals),
            uvs: all_have_uvs.then_some(uvs),
            indices,
            face_materials,
            materials,
        };

        let removed = mesh.remove_invalid_faces();
        log::info!(
            "Loaded {}: {} vertices, {} triangles, {} materials{}",
            mesh.name,
            mesh.vertex_count(),
            mesh.triangle_count(),
            mesh.materials.len(),
            if removed > 0 {
                format!(" ({} invalid triangles skipped)", removed)
            } else {
                String::new()
            }
        );

        Ok(mesh)
    }
}

/// Convert an MTL material. Texture failures are logged, not fatal.
fn convert_material(m: &tobj::Material, textures: &mut TextureCache) -> Material {
    let to_color = |c: Option<[f32; 3]>, default: f32| {
        c.map(Color::from_array).unwrap_or(Color::splat(default))
    };

    let mut material = Material {
        name: m.name.clone(),
        ka: to_color(m.ambient, 0.0),
        kd: to_color(m.diffuse, 0.5),
        ks: to_color(m.specular, 0.0),
        ie: Color::ZERO,
        shininess: m.shininess.unwrap_or(1.0),
        alpha: m.dissolve.unwrap_or(1.0).clamp(0.0, 1.0),
        texture: None,
    };

    if let Some(texture_path) = m.diffuse_texture.as_deref() {
        match textures.load(texture_path) {
            Ok(texture) => material.texture = Some(texture),
            Err(e) => log::warn!("material {}: {}", m.name, e),
        }
    }

    material
}
