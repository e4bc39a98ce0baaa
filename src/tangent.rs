//! Tangent frames and tangent-space normal mapping.

use glam::Vec3;

const MIN_LENGTH: f32 = 1e-6;

/// Normalize `v`, or return `fallback` when `v` is zero-length or non-finite.
///
/// Every normalize in the pipeline goes through here so a single bad vertex
/// degrades to a safe direction instead of poisoning a whole preview with NaN.
#[inline]
pub fn normalize_or_fallback(v: Vec3, fallback: Vec3) -> Vec3 {
    let length = v.length();
    if !length.is_finite() || length < MIN_LENGTH {
        return fallback;
    }
    let n = v / length;
    if n.is_finite() {
        n
    } else {
        fallback
    }
}

/// Gram-Schmidt `tangent` against `normal`.
///
/// A tangent parallel to the normal (or garbage) is rebuilt from a fixed axis.
pub fn orthonormalize_tangent(normal: Vec3, tangent: Vec3) -> Vec3 {
    let n = normalize_or_fallback(normal, Vec3::Z);
    let projected = tangent - n * n.dot(tangent);
    let length = projected.length();
    if length.is_finite() && length >= MIN_LENGTH {
        return projected / length;
    }

    let axis = if n.y.abs() >= 0.95 { Vec3::X } else { Vec3::Y };
    normalize_or_fallback(axis.cross(n), Vec3::X)
}

/// Perturb `geom_normal` by a tangent-space normal sample.
///
/// `strength` scales the sampled X/Y; Z is floored at 0.01 so the frame never
/// collapses. Falls back to the geometric normal when the result degenerates.
pub fn apply_normal_map(
    geom_normal: Vec3,
    tangent: Vec3,
    bitangent: Vec3,
    sampled: Vec3,
    strength: f32,
) -> Vec3 {
    let n = normalize_or_fallback(geom_normal, Vec3::Z);
    let t = orthonormalize_tangent(n, tangent);

    // Keep the caller's handedness when rebuilding the bitangent.
    let reference = n.cross(t);
    let handedness = if reference.dot(bitangent) < 0.0 { -1.0 } else { 1.0 };
    let b_projected = bitangent - n * n.dot(bitangent) - t * t.dot(bitangent);
    let b = normalize_or_fallback(b_projected, reference * handedness);

    let strength = crate::math::finite_or(strength, 0.0);
    let sampled = if sampled.is_finite() { sampled } else { Vec3::Z };
    let mapped = Vec3::new(
        sampled.x * strength,
        sampled.y * strength,
        sampled.z.max(0.01),
    );

    normalize_or_fallback(t * mapped.x + b * mapped.y + n * mapped.z, n)
}

/// Bitangent from a normal and a tangent carrying its handedness in `w`.
#[inline]
pub fn bitangent_from(normal: Vec3, tangent: Vec3, handedness: f32) -> Vec3 {
    let sign = if handedness < 0.0 { -1.0 } else { 1.0 };
    normal.cross(tangent) * sign
}
