//! Lumen Renderer - Whitted-style CPU ray tracing
//!
//! Recursive ray tracer with mirror reflection, shadow rays and refraction
//! through partially transparent surfaces, driven one pixel at a time by a
//! progressive scheduler so that a host event loop stays responsive.

mod buffer;
mod bvh;
mod hittable;
mod mesh;
mod progressive;
mod refraction;
mod sampler;
mod scene;
mod shading;
mod sphere;
mod tracer;
mod triangle;

pub use buffer::ProgressiveImage;
pub use bvh::FaceBvh;
pub use hittable::{HitOrigin, HitRecord, Hittable};
pub use mesh::MeshObject;
pub use progressive::{DisplaySink, ProgressiveRenderer, RenderState};
pub use refraction::find_refraction_direction;
pub use sampler::{ImagePlane, PixelInspection};
pub use scene::{Intersection, Scene, MIN_HIT_T};
pub use shading::{calc_iout, mirror};
pub use sphere::Sphere;
pub use tracer::{RaySegment, SegmentKind, TraceContext};
pub use triangle::Triangle;

/// Re-export common math types from lumen_math
pub use lumen_math::{Aabb, Color, Interval, Ray, Vec2, Vec3};
