//! Lighting models.
//!
//! [`evaluate_pbr_lighting`] is a Cook-Torrance BRDF (GGX distribution, Smith
//! geometry, Schlick Fresnel) with hand-tuned boosts layered on top; the
//! constants are part of the output contract and must stay literal.
//! [`shade_material_sphere`] is the cheaper Blinn-style model used for
//! material swatches.

use std::f32::consts::PI;

use glam::Vec3;

use crate::math::{finite_or, lerp, pow5};
use crate::tangent::normalize_or_fallback;

const EPSILON: f32 = 1e-4;
const DIRECT_GAIN: f32 = 2.25;

/// Cook-Torrance lighting for one light, one view direction.
///
/// Directions are normalized here; `roughness` is clamped to `[0.04, 1]` and
/// `metallic`/`ao` to `[0, 1]`. The result is linear and unclamped (it can
/// exceed 1.0), and always finite.
pub fn evaluate_pbr_lighting(
    base_color: Vec3,
    normal: Vec3,
    light_dir: Vec3,
    view_dir: Vec3,
    roughness: f32,
    metallic: f32,
    ao: f32,
) -> Vec3 {
    let base_color = sanitize_color(base_color);
    let roughness = finite_or(roughness, 1.0).clamp(0.04, 1.0);
    let metallic = finite_or(metallic, 0.0).clamp(0.0, 1.0);
    let ao = finite_or(ao, 1.0).clamp(0.0, 1.0);

    let n = normalize_or_fallback(normal, Vec3::Z);
    let l = normalize_or_fallback(light_dir, Vec3::Z);
    let v = normalize_or_fallback(view_dir, Vec3::Z);
    let h = normalize_or_fallback(l + v, n);

    let ndotl = n.dot(l).max(0.0);
    let ndotv = n.dot(v).max(0.0);
    let ndoth = n.dot(h).max(0.0);
    let vdoth = v.dot(h).max(0.0);

    let f0 = Vec3::splat(0.04).lerp(base_color, metallic);
    let fresnel = f0 + (Vec3::ONE - f0) * pow5(1.0 - vdoth);

    let alpha = roughness * roughness;
    let alpha2 = alpha * alpha;
    let d_term = ndoth * ndoth * (alpha2 - 1.0) + 1.0;
    let distribution = alpha2 / (PI * d_term * d_term).max(EPSILON);

    let k = (alpha + 1.0) * (alpha + 1.0) / 8.0;
    let geometry = schlick_ggx(ndotl, k) * schlick_ggx(ndotv, k);

    let spec_boost = lerp(1.15, 2.35, 1.0 - roughness);
    let specular =
        fresnel * distribution * geometry / (4.0 * ndotl * ndotv).max(EPSILON) * spec_boost;
    let diffuse = (Vec3::ONE - fresnel) * (1.0 - metallic) * base_color / PI;

    let direct = (diffuse + specular) * ndotl * ao * DIRECT_GAIN;
    let ambient = base_color * (0.08 + 0.14 * ao) * (1.0 - 0.45 * metallic);

    let tint = Vec3::ONE.lerp(base_color, metallic);
    let highlight = tint * ndoth.powf(lerp(180.0, 24.0, roughness)) * lerp(0.38, 0.11, roughness);
    let rim = tint * pow5(1.0 - ndotv) * lerp(0.015, 0.08, metallic);

    sanitize_color(ambient + direct + highlight + rim)
}

#[inline]
fn schlick_ggx(x: f32, k: f32) -> f32 {
    x / (x * (1.0 - k) + k).max(EPSILON)
}

fn sanitize_color(color: Vec3) -> Vec3 {
    Vec3::new(
        finite_or(color.x, 0.0).max(0.0),
        finite_or(color.y, 0.0).max(0.0),
        finite_or(color.z, 0.0).max(0.0),
    )
}

/// Inputs for the material-swatch shader, all already sampled.
#[derive(Debug, Clone, Copy)]
pub struct SphereSurface {
    pub albedo: Vec3,
    pub normal: Vec3,
    pub roughness: f32,
    pub ao: f32,
}

/// Blinn-style swatch lighting: wrapped diffuse, roughness-driven specular
/// lobe and a fixed-weight Fresnel rim. Linear, unclamped.
pub fn shade_material_sphere(surface: &SphereSurface, light_dir: Vec3, view_dir: Vec3) -> Vec3 {
    let albedo = sanitize_color(surface.albedo);
    let roughness = finite_or(surface.roughness, 1.0).clamp(0.0, 1.0);
    let ao = finite_or(surface.ao, 1.0).clamp(0.0, 1.0);

    let n = normalize_or_fallback(surface.normal, Vec3::Z);
    let l = normalize_or_fallback(light_dir, Vec3::Z);
    let v = normalize_or_fallback(view_dir, Vec3::Z);
    let h = normalize_or_fallback(l + v, n);

    let ndotl = n.dot(l).max(0.0);
    let ndoth = n.dot(h).max(0.0);
    let ndotv = n.dot(v).max(0.0);

    let specular = ndoth.powf(lerp(64.0, 8.0, roughness)) * lerp(0.05, 0.3, 1.0 - roughness);
    let fresnel = pow5(1.0 - ndotv) * 0.2;

    sanitize_color(albedo * (0.15 + ndotl * ao * 0.85) + Vec3::splat(specular + fresnel))
}
