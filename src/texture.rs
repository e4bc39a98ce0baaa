//! RGBA8 texture payloads and the bilinear sampler used by every shading path.
//!
//! Addressing is toroidal: `u`/`v` wrap into `[0, 1)` and each texel fetch
//! wraps modulo the texture size, so tiled previews have no seams. Texture
//! space `v = 0` is the bottom row of the image.

use std::collections::BTreeMap;

use glam::Vec3;

use crate::error::PreviewError;

/// Row-major RGBA8 pixels with the origin at the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TexturePayload {
    width: u32,
    height: u32,
    rgba8: Vec<u8>,
}

impl TexturePayload {
    pub fn new(width: u32, height: u32, rgba8: Vec<u8>) -> Result<Self, PreviewError> {
        let expected = (width as usize)
            .checked_mul(height as usize)
            .and_then(|pixels| pixels.checked_mul(4));
        if width == 0 || height == 0 || expected != Some(rgba8.len()) {
            return Err(PreviewError::InvalidTexture {
                width,
                height,
                len: rgba8.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba8,
        })
    }

    #[cfg(test)]
    pub(crate) fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Result<Self, PreviewError> {
        let pixels = (width as usize) * (height as usize);
        let mut data = Vec::with_capacity(pixels * 4);
        for _ in 0..pixels {
            data.extend_from_slice(&rgba);
        }
        Self::new(width, height, data)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba8
    }

    pub fn sample_rgb(&self, u: f32, v: f32) -> Vec3 {
        sample_rgb_bilinear(&self.rgba8, self.width, self.height, u, v)
    }

    /// Decode a tangent-space normal; degenerate texels decode to `+Z`.
    pub fn sample_normal(&self, u: f32, v: f32) -> Vec3 {
        let rgb = self.sample_rgb(u, v);
        let n = rgb * 2.0 - Vec3::ONE;
        crate::tangent::normalize_or_fallback(n, Vec3::Z)
    }

    /// Red channel only; roughness and occlusion maps are grayscale.
    pub fn sample_gray(&self, u: f32, v: f32) -> f32 {
        self.sample_rgb(u, v).x
    }
}

/// Bilinear RGB sample over a flat RGBA8 buffer with wraparound addressing.
///
/// Panics if either dimension is zero.
pub fn sample_rgb_bilinear(rgba8: &[u8], width: u32, height: u32, u: f32, v: f32) -> Vec3 {
    assert!(
        width > 0 && height > 0,
        "texture dimensions must be positive, got {width}x{height}"
    );

    let u = wrap_unit(u);
    let v = wrap_unit(v);

    let x = u * width as f32 - 0.5;
    let y = (1.0 - v) * height as f32 - 0.5;
    let x0 = x.floor();
    let y0 = y.floor();
    let tx = x - x0;
    let ty = y - y0;
    let (x0, y0) = (x0 as i64, y0 as i64);

    let c00 = texel(rgba8, width, height, x0, y0);
    let c10 = texel(rgba8, width, height, x0 + 1, y0);
    let c01 = texel(rgba8, width, height, x0, y0 + 1);
    let c11 = texel(rgba8, width, height, x0 + 1, y0 + 1);

    let top = c00.lerp(c10, tx);
    let bottom = c01.lerp(c11, tx);
    top.lerp(bottom, ty)
}

fn wrap_unit(value: f32) -> f32 {
    if !value.is_finite() {
        return 0.0;
    }
    let wrapped = value - value.floor();
    // `x - floor(x)` rounds up to 1.0 for tiny negative inputs.
    if wrapped >= 1.0 {
        0.0
    } else {
        wrapped
    }
}

fn texel(rgba8: &[u8], width: u32, height: u32, x: i64, y: i64) -> Vec3 {
    let x = x.rem_euclid(i64::from(width)) as usize;
    let y = y.rem_euclid(i64::from(height)) as usize;
    let offset = (y * width as usize + x) * 4;
    Vec3::new(
        f32::from(rgba8[offset]),
        f32::from(rgba8[offset + 1]),
        f32::from(rgba8[offset + 2]),
    ) / 255.0
}

/// The four maps a lit preview needs, identified by key suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TextureRole {
    Albedo,
    Normal,
    Roughness,
    AmbientOcclusion,
}

impl TextureRole {
    pub const ALL: [TextureRole; 4] = [
        Self::Albedo,
        Self::Normal,
        Self::Roughness,
        Self::AmbientOcclusion,
    ];

    pub fn suffix(self) -> &'static str {
        match self {
            Self::Albedo => ".albedo",
            Self::Normal => ".normal",
            Self::Roughness => ".roughness",
            Self::AmbientOcclusion => ".ao",
        }
    }

    pub fn key(self, chunk_tag: &str) -> String {
        format!("{chunk_tag}{}", self.suffix())
    }
}

/// Texture payloads keyed by `"{chunk tag}{role suffix}"`.
#[derive(Debug, Clone, Default)]
pub struct TextureBundle {
    entries: BTreeMap<String, TexturePayload>,
}

impl TextureBundle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, texture: TexturePayload) {
        self.entries.insert(key.into(), texture);
    }

    pub fn get(&self, key: &str) -> Option<&TexturePayload> {
        self.entries.get(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn require(&self, chunk_tag: &str, role: TextureRole) -> Result<&TexturePayload, PreviewError> {
        let key = role.key(chunk_tag);
        self.entries
            .get(&key)
            .ok_or(PreviewError::MissingTexture { key })
    }

    /// Resolve all four roles at once, failing on the first missing entry.
    pub fn material(&self, chunk_tag: &str) -> Result<MaterialMaps<'_>, PreviewError> {
        Ok(MaterialMaps {
            albedo: self.require(chunk_tag, TextureRole::Albedo)?,
            normal: self.require(chunk_tag, TextureRole::Normal)?,
            roughness: self.require(chunk_tag, TextureRole::Roughness)?,
            ao: self.require(chunk_tag, TextureRole::AmbientOcclusion)?,
        })
    }
}

/// Borrowed view of a fully resolved material.
#[derive(Debug, Clone, Copy)]
pub struct MaterialMaps<'a> {
    pub albedo: &'a TexturePayload,
    pub normal: &'a TexturePayload,
    pub roughness: &'a TexturePayload,
    pub ao: &'a TexturePayload,
}

/// Everything the shaders read from the maps at one uv.
#[derive(Debug, Clone, Copy)]
pub struct MaterialSample {
    pub albedo: Vec3,
    pub normal: Vec3,
    pub roughness: f32,
    pub ao: f32,
}

impl MaterialMaps<'_> {
    pub fn sample(&self, u: f32, v: f32) -> MaterialSample {
        MaterialSample {
            albedo: self.albedo.sample_rgb(u, v),
            normal: self.normal.sample_normal(u, v),
            roughness: self.roughness.sample_gray(u, v),
            ao: self.ao.sample_gray(u, v),
        }
    }
}
