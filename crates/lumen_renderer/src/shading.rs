//! Local illumination.

use lumen_math::{Color, Vec3};

/// Mirror `v` about the normal `n`: `2 (v·n) n - v`.
///
/// Both `v` and the result point away from the surface.
#[inline]
pub fn mirror(v: Vec3, n: Vec3) -> Vec3 {
    2.0 * v.dot(n) * n - v
}

/// Outgoing radiance towards `e` due to radiance `incoming` arriving from `l`.
///
/// `r` is the reflection of `l` about `n`. Only the front of the surface
/// (`n·l > 0`) is lit:
///
/// ```text
/// Iout = incoming * (kd (n·l) + ks (r·e)^shininess)
/// ```
///
/// The specular term is dropped when `e` is behind the reflection direction.
pub fn calc_iout(
    n: Vec3,
    l: Vec3,
    e: Vec3,
    r: Vec3,
    kd: Color,
    ks: Color,
    shininess: f32,
    incoming: Color,
) -> Color {
    let n_dot_l = n.dot(l);
    if n_dot_l <= 0.0 {
        return Color::ZERO;
    }

    let diffuse = n_dot_l * incoming;

    let r_dot_e = r.dot(e);
    let specular = if r_dot_e < 0.0 {
        Color::ZERO
    } else {
        r_dot_e.powf(shininess) * incoming
    };

    specular * ks + diffuse * kd
}
