use glam::Vec3;

use crate::math::to_u8;

const INV_GAMMA: f32 = 1.0 / 2.2;

/// Narkowicz ACES fit followed by a 2.2 gamma encode.
#[inline]
pub fn tonemap_channel(x: f32) -> f32 {
    let x = if x.is_nan() { 0.0 } else { x.max(0.0) };
    if x.is_infinite() {
        return 1.0;
    }
    let mapped = (x * (2.51 * x + 0.03)) / (x * (2.43 * x + 0.59) + 0.14);
    mapped.clamp(0.0, 1.0).powf(INV_GAMMA)
}

#[inline]
pub fn tonemap_rgb(color: Vec3) -> Vec3 {
    Vec3::new(
        tonemap_channel(color.x),
        tonemap_channel(color.y),
        tonemap_channel(color.z),
    )
}

/// Tonemap linear HDR color and quantize to opaque RGBA8.
#[inline]
pub fn encode_rgb(color: Vec3) -> [u8; 4] {
    let mapped = tonemap_rgb(color);
    [to_u8(mapped.x), to_u8(mapped.y), to_u8(mapped.z), 255]
}

/// Quantize an already display-referred color without tonemapping.
#[inline]
pub fn encode_display(color: Vec3) -> [u8; 4] {
    [to_u8(color.x), to_u8(color.y), to_u8(color.z), 255]
}
