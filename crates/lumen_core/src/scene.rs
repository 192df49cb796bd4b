//! Scene description files.
//!
//! A scene is a JSON document naming the eye, the point lights, a set of
//! named materials and the objects that use them:
//!
//! ```json
//! {
//!   "eye": { "position": [0, 0, 5], "look_at": [0, 0, 0], "up": [0, 1, 0], "fovy": 40 },
//!   "lights": [ { "position": [0, 10, 0], "colour": [1, 1, 1] } ],
//!   "materials": [ { "name": "red", "kd": [1, 0, 0] } ],
//!   "objects": [ { "type": "sphere", "center": [0, 0, 0], "radius": 1, "material": "red" } ],
//!   "render": { "max_depth": 4, "pixel_samples": 2, "jitter": true }
//! }
//! ```
//!
//! Loading resolves material names, textures and Wavefront files, so the
//! renderer only ever sees fully resolved [`SceneData`].

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use lumen_math::{Color, Vec2, Vec3};
use serde::Deserialize;
use thiserror::Error;

use crate::eye::Eye;
use crate::light::Light;
use crate::material::Material;
use crate::mesh::Mesh;
use crate::settings::RenderConfig;
use crate::texture::{TextureCache, TextureError};

/// Errors that can occur while loading a scene.
#[derive(Error, Debug)]
pub enum SceneError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scene description: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Texture(#[from] TextureError),

    #[error("failed to load wavefront file {path}: {source}")]
    Obj {
        path: String,
        #[source]
        source: tobj::LoadError,
    },

    #[error("object refers to unknown material '{0}'")]
    UnknownMaterial(String),

    #[error("no lights were provided in {0}, so the scene would be black")]
    NoLights(String),

    #[error("{0}")]
    Invalid(String),
}

pub type SceneResult<T> = Result<T, SceneError>;

/// Material entry of a scene file.
#[derive(Clone, Debug, Deserialize)]
pub struct MaterialDesc {
    pub name: String,
    #[serde(default)]
    pub ka: Color,
    #[serde(default)]
    pub kd: Color,
    #[serde(default)]
    pub ks: Color,
    #[serde(default)]
    pub ie: Color,
    #[serde(default = "default_shininess", alias = "n")]
    pub shininess: f32,
    #[serde(default = "default_alpha")]
    pub alpha: f32,
    /// Texture image, relative to the scene file
    #[serde(default)]
    pub texture: Option<String>,
}

fn default_shininess() -> f32 {
    1.0
}

fn default_alpha() -> f32 {
    1.0
}

/// Object entry of a scene file.
#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ObjectDesc {
    Sphere {
        center: Vec3,
        radius: f32,
        material: String,
    },
    Triangle {
        vertices: [Vec3; 3],
        #[serde(default)]
        texcoords: Option<[Vec2; 3]>,
        material: String,
    },
    /// Wavefront OBJ file, relative to the scene file
    Wavefront { file: String },
}

/// The raw contents of a scene file.
#[derive(Clone, Debug, Deserialize)]
pub struct SceneDescription {
    #[serde(default)]
    pub eye: Eye,
    #[serde(default)]
    pub lights: Vec<Light>,
    #[serde(default)]
    pub materials: Vec<MaterialDesc>,
    #[serde(default)]
    pub objects: Vec<ObjectDesc>,
    #[serde(default)]
    pub render: RenderConfig,
}

/// A resolved object, ready to be turned into renderer geometry.
#[derive(Clone, Debug)]
pub enum ObjectData {
    Sphere {
        center: Vec3,
        radius: f32,
        material: Arc<Material>,
    },
    Triangle {
        vertices: [Vec3; 3],
        texcoords: [Vec2; 3],
        material: Arc<Material>,
    },
    Mesh(Arc<Mesh>),
}

/// A fully resolved scene.
#[derive(Clone, Debug)]
pub struct SceneData {
    /// Scene name (usually from the file name)
    pub name: String,
    pub eye: Eye,
    pub lights: Vec<Light>,
    pub objects: Vec<ObjectData>,
    pub render: RenderConfig,
}

impl SceneData {
    /// Total number of triangles, counting every mesh face.
    pub fn triangle_count(&self) -> usize {
        self.objects
            .iter()
            .map(|o| match o {
                ObjectData::Sphere { .. } => 0,
                ObjectData::Triangle { .. } => 1,
                ObjectData::Mesh(mesh) => mesh.triangle_count(),
            })
            .sum()
    }
}

/// Load and resolve a scene file.
pub fn load_scene(path: impl AsRef<Path>) -> SceneResult<SceneData> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|source| SceneError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
    let name = path
        .file_stem()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    parse_scene(&text, &name, base_dir)
}

/// Parse and resolve a scene from JSON text.
///
/// Relative texture and Wavefront paths are resolved against `base_dir`.
pub fn parse_scene(text: &str, name: &str, base_dir: impl Into<PathBuf>) -> SceneResult<SceneData> {
    let description: SceneDescription = serde_json::from_str(text)?;
    resolve_scene(description, name, base_dir.into())
}

fn resolve_scene(description: SceneDescription, name: &str, base_dir: PathBuf) -> SceneResult<SceneData> {
    if description.lights.is_empty() {
        return Err(SceneError::NoLights(name.to_string()));
    }

    let mut textures = TextureCache::with_base_dir(&base_dir);
    let mut materials: HashMap<String, Arc<Material>> = HashMap::new();

    for desc in description.materials {
        let texture = match &desc.texture {
            Some(file) => Some(textures.load(file)?),
            None => None,
        };

        let material = Material {
            name: desc.name.clone(),
            ka: desc.ka,
            kd: desc.kd,
            ks: desc.ks,
            ie: desc.ie,
            shininess: desc.shininess,
            alpha: desc.alpha.clamp(0.0, 1.0),
            texture,
        };

        if materials.insert(desc.name.clone(), Arc::new(material)).is_some() {
            log::warn!("material '{}' defined twice, using the last definition", desc.name);
        }
    }

    let lookup = |name: &str| {
        materials
            .get(name)
            .cloned()
            .ok_or_else(|| SceneError::UnknownMaterial(name.to_string()))
    };

    let mut objects = Vec::with_capacity(description.objects.len());
    for desc in description.objects {
        let object = match desc {
            ObjectDesc::Sphere {
                center,
                radius,
                material,
            } => {
                if radius <= 0.0 {
                    return Err(SceneError::Invalid(format!(
                        "sphere at {:?} has non-positive radius {}",
                        center, radius
                    )));
                }
                ObjectData::Sphere {
                    center,
                    radius,
                    material: lookup(&material)?,
                }
            }
            ObjectDesc::Triangle {
                vertices,
                texcoords,
                material,
            } => ObjectData::Triangle {
                vertices,
                texcoords: texcoords.unwrap_or([Vec2::ZERO, Vec2::X, Vec2::Y]),
                material: lookup(&material)?,
            },
            ObjectDesc::Wavefront { file } => {
                ObjectData::Mesh(Arc::new(Mesh::load_obj(base_dir.join(file))?))
            }
        };
        objects.push(object);
    }

    let scene = SceneData {
        name: name.to_string(),
        eye: description.eye,
        lights: description.lights,
        objects,
        render: description.render.sanitized(),
    };

    log::info!(
        "Scene '{}': {} objects ({} triangles), {} lights, {} materials, {} textures",
        scene.name,
        scene.objects.len(),
        scene.triangle_count(),
        scene.lights.len(),
        materials.len(),
        textures.len()
    );

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCENE: &str = r#"{
        "eye": { "position": [0, 0, 5], "look_at": [0, 0, 0], "fovy": 40 },
        "lights": [ { "position": [0, 10, 0], "colour": [1, 1, 1] } ],
        "materials": [
            { "name": "red", "kd": [1, 0, 0], "ks": [0.2, 0.2, 0.2], "n": 30 },
            { "name": "glass", "alpha": 0.1 }
        ],
        "objects": [
            { "type": "sphere", "center": [0, 0, 0], "radius": 1, "material": "red" },
            { "type": "triangle", "vertices": [[0, 0, 0], [1, 0, 0], [0, 1, 0]], "material": "glass" }
        ],
        "render": { "max_depth": 3, "pixel_samples": 2 }
    }"#;

    #[test]
    fn test_parse_scene() {
        let scene = parse_scene(SCENE, "test", ".").unwrap();

        assert_eq!(scene.name, "test");
        assert_eq!(scene.eye.fovy, 40.0);
        assert_eq!(scene.eye.up, Vec3::Y);
        assert_eq!(scene.lights.len(), 1);
        assert_eq!(scene.objects.len(), 2);
        assert_eq!(scene.triangle_count(), 1);
        assert_eq!(scene.render.max_depth, 3);
        assert_eq!(scene.render.pixel_samples, 2);

        match &scene.objects[0] {
            ObjectData::Sphere { material, radius, .. } => {
                assert_eq!(*radius, 1.0);
                assert_eq!(material.kd, Color::new(1.0, 0.0, 0.0));
                assert_eq!(material.shininess, 30.0);
            }
            other => panic!("expected sphere, got {:?}", other),
        }

        match &scene.objects[1] {
            ObjectData::Triangle { material, texcoords, .. } => {
                assert_eq!(material.alpha, 0.1);
                assert_eq!(texcoords[1], Vec2::X);
            }
            other => panic!("expected triangle, got {:?}", other),
        }
    }

    #[test]
    fn test_scene_without_lights() {
        let text = r#"{ "objects": [] }"#;
        assert!(matches!(
            parse_scene(text, "dark", "."),
            Err(SceneError::NoLights(_))
        ));
    }

    #[test]
    fn test_unknown_material() {
        let text = r#"{
            "lights": [ { "position": [0, 1, 0], "colour": [1, 1, 1] } ],
            "objects": [ { "type": "sphere", "center": [0, 0, 0], "radius": 1, "material": "nope" } ]
        }"#;

        match parse_scene(text, "bad", ".") {
            Err(SceneError::UnknownMaterial(name)) => assert_eq!(name, "nope"),
            other => panic!("expected unknown material error, got {:?}", other.map(|s| s.name)),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(
            parse_scene("{ not json", "broken", "."),
            Err(SceneError::Json(_))
        ));
    }

    const CORNER_OBJ: &str = "\
mtllib corner.mtl
o floor
v -1 0 -1
v -1 0 1
v 1 0 1
v 1 0 -1
vn 0 1 0
usemtl red
f 1//1 2//1 3//1
f 1//1 3//1 4//1
o wall
v 1 0 -1
v 1 0 1
v 1 2 1
v 1 2 -1
vn -1 0 0
usemtl blue
f 5//2 6//2 7//2
f 5//2 7//2 8//2
";

    const CORNER_MTL: &str = "\
newmtl red
Kd 1 0 0
Ks 0.5 0.5 0.5
Ns 10
newmtl blue
Kd 0 0 1
d 0.5
";

    #[test]
    fn test_load_scene_with_wavefront() {
        let _ = env_logger::builder().is_test(true).try_init();

        let dir = std::env::temp_dir().join(format!("lumen-wavefront-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join("corner.obj"), CORNER_OBJ).unwrap();
        std::fs::write(dir.join("corner.mtl"), CORNER_MTL).unwrap();
        std::fs::write(
            dir.join("corner.json"),
            r#"{
                "lights": [ { "position": [0, 5, 0], "colour": [1, 1, 1] } ],
                "objects": [ { "type": "wavefront", "file": "corner.obj" } ]
            }"#,
        )
        .unwrap();

        let scene = load_scene(dir.join("corner.json")).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(scene.name, "corner");
        assert_eq!(scene.triangle_count(), 4);

        let mesh = match &scene.objects[0] {
            ObjectData::Mesh(mesh) => mesh.clone(),
            other => panic!("expected mesh, got {:?}", other),
        };

        assert_eq!(mesh.name, "corner.obj");
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.face_materials, vec![0, 0, 1, 1]);

        // red, blue and the fallback material
        assert_eq!(mesh.materials.len(), 3);
        let red = mesh.face_material(0);
        assert_eq!(red.kd, Color::new(1.0, 0.0, 0.0));
        assert_eq!(red.ks, Color::splat(0.5));
        assert_eq!(red.shininess, 10.0);
        let blue = mesh.face_material(3);
        assert_eq!(blue.kd, Color::new(0.0, 0.0, 1.0));
        assert_eq!(blue.alpha, 0.5);

        // Every vertex has a normal but none has texture coordinates
        assert_eq!(mesh.normals.as_ref().map(Vec::len), Some(8));
        assert!(mesh.uvs.is_none());

        let [a, b, c] = mesh.face(2);
        assert!(mesh.positions[a].x == 1.0 && mesh.positions[b].x == 1.0 && mesh.positions[c].x == 1.0);
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            load_scene("/nonexistent-lumen-dir/scene.json"),
            Err(SceneError::Io { .. })
        ));
    }
}
