//! Refraction through an interface between two media.

use lumen_core::RefractiveIndices;
use lumen_math::Vec3;

/// Direction of a ray arriving along `ray_dir` after it crosses a surface
/// with outward-pointing normal `normal`.
///
/// A ray travelling against the normal enters the surface (outside to
/// inside); otherwise it leaves it and the normal is flipped. Snell's law
/// gives the refraction angle, and the new direction is built in the plane
/// of incidence from the flipped normal and the tangent `n × (d × n)`.
///
/// Returns `None` on total internal reflection.
pub fn find_refraction_direction(
    ray_dir: Vec3,
    normal: Vec3,
    indices: RefractiveIndices,
) -> Option<Vec3> {
    let d = ray_dir.normalize();
    let mut n = normal.normalize();
    let (mut ni, mut nr) = (indices.outside, indices.inside);

    if d.dot(n) > 0.0 {
        std::mem::swap(&mut ni, &mut nr);
        n = -n;
    }

    let incidence = n.dot(-d).clamp(-1.0, 1.0).acos();
    let sin_refracted = ni / nr * incidence.sin();
    if sin_refracted > 1.0 {
        return None;
    }

    let refracted = sin_refracted.asin();
    let tangent = n.cross(d.cross(n)).normalize_or_zero();

    Some(refracted.cos() * -n + refracted.sin() * tangent)
}
