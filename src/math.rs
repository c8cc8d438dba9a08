//! Vector helpers used by the colliders and the tracer.

use glam::Vec3;

/// Vectors shorter than this normalize to zero instead of blowing up.
pub const NORMALIZE_EPSILON: f32 = 1e-5;

/// Normalizes `v`, returning the unit vector and the original magnitude.
/// Near-zero vectors come back as `(Vec3::ZERO, 0.0)`.
pub fn normalize_with_magnitude(v: Vec3) -> (Vec3, f32) {
    let magnitude = v.length();

    if magnitude > NORMALIZE_EPSILON {
        (v / magnitude, magnitude)
    } else {
        (Vec3::ZERO, 0.0)
    }
}

// Reflect vector v around normal n
pub fn reflect(v: Vec3, n: Vec3) -> Vec3 {
    v - 2.0 * v.dot(n) * n
}

/// Largest refraction index difference the bend is parameterized over.
const MAX_INDEX_DIFFERENCE: f32 = 4.0;
/// Bend at the extremes of the index range, a swing of about 90 degrees.
const MAX_BEND: f32 = 2.0;

/// Approximate refraction of `dir` at a surface with `normal`, going from a
/// medium of `source_index` into one of `target_index`.
///
/// This is not Snell's law. The direction is pushed along the normal in
/// proportion to the index difference and the view angle. The result is
/// not renormalized.
pub fn refract(dir: Vec3, source_index: f32, target_index: f32, normal: Vec3) -> Vec3 {
    let ratio = (target_index - source_index) / MAX_INDEX_DIFFERENCE;
    let bend = ratio * MAX_BEND * normal.dot(dir);

    dir + bend * normal
}

/// Closest point to `p` on the segment from `a` to `b`.
pub fn closest_point_on_segment(a: Vec3, b: Vec3, p: Vec3) -> Vec3 {
    let ab = b - a;
    let length_squared = ab.length_squared();

    if length_squared <= NORMALIZE_EPSILON * NORMALIZE_EPSILON {
        return a;
    }

    let t = ((p - a).dot(ab) / length_squared).clamp(0.0, 1.0);
    a + t * ab
}
