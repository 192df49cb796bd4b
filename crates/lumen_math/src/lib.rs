//! Math types shared by the Lumen crates.
//!
//! Vector and matrix types come straight from `glam`; this crate only adds
//! the few ray tracing primitives on top.

// Re-export glam for convenience
pub use glam::*;

mod aabb;
mod interval;
mod ray;

pub use aabb::Aabb;
pub use interval::Interval;
pub use ray::Ray;

/// Colour type alias (linear RGB, usually 0-1 but unbounded).
pub type Color = Vec3;
