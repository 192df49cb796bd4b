//! Lumen Core - renderer-agnostic scene data.
//!
//! This crate provides:
//!
//! - **Scene types**: `Material`, `Light`, `Eye`, `Texture`, `Mesh`
//! - **Settings**: `RenderConfig` for the ray tracer
//! - **Scene files**: JSON scene loading with Wavefront OBJ support
//!
//! # Example
//!
//! ```ignore
//! use lumen_core::load_scene;
//!
//! let scene = load_scene("scenes/spheres.json")?;
//! println!("Loaded {} objects, {} lights", scene.objects.len(), scene.lights.len());
//! ```

pub mod eye;
pub mod light;
pub mod material;
pub mod mesh;
pub mod scene;
pub mod settings;
pub mod texture;

// Re-export commonly used types
pub use eye::Eye;
pub use light::Light;
pub use material::Material;
pub use mesh::Mesh;
pub use scene::{
    load_scene, parse_scene, ObjectData, SceneData, SceneDescription, SceneError, SceneResult,
};
pub use settings::{RefractiveIndices, RenderConfig};
pub use texture::{Texture, TextureCache, TextureError};
