//! Preview orchestration: dispatches on the preview kind and assembles the
//! final RGBA8 buffer.
//!
//! `build_preview` is referentially transparent. Depth and color buffers are
//! owned by a single call, and every random choice is a pure function of the
//! seed, so identical arguments give byte-identical images.

use std::fmt::{Display, Formatter};

use anyhow::{anyhow, Context, Result};
use glam::Vec3;
use log::{debug, trace};

use crate::chunk::ChunkIdentity;
use crate::content::ContentSource;
use crate::error::PreviewError;
use crate::math::{luma, sample01, to_u8};
use crate::procedural::ProceduralContent;
use crate::raster::{prepare_vertices, rasterize_triangle, Camera, DepthBuffer};
use crate::shading::{evaluate_pbr_lighting, shade_material_sphere, SphereSurface};
use crate::tangent::{apply_normal_map, normalize_or_fallback, orthonormalize_tangent};
use crate::tonemap::{encode_display, encode_rgb, tonemap_channel};

const MESH_NORMAL_STRENGTH: f32 = 0.62;
const MATERIAL_NORMAL_STRENGTH: f32 = 0.68;
const MESH_METALLIC: f32 = 0.0;
const SPHERE_RADIUS: f32 = 0.9;

const BACKGROUND_TOP: Vec3 = Vec3::new(0.06, 0.08, 0.11);
const BACKGROUND_BOTTOM: Vec3 = Vec3::new(0.12, 0.14, 0.18);

fn light_dir() -> Vec3 {
    normalize_or_fallback(Vec3::new(0.5, 0.62, 0.61), Vec3::Z)
}

const VIEW_DIR: Vec3 = Vec3::Z;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewKind {
    Mesh,
    Texture,
    Material,
    Fallback,
}

impl PreviewKind {
    /// Case-insensitive; unknown kinds map to [`PreviewKind::Fallback`].
    pub fn parse(kind: &str) -> Self {
        match kind.trim().to_ascii_lowercase().as_str() {
            "mesh" => Self::Mesh,
            "texture" => Self::Texture,
            "material" => Self::Material,
            _ => Self::Fallback,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mesh => "mesh",
            Self::Texture => "texture",
            Self::Material => "material",
            Self::Fallback => "fallback",
        }
    }
}

impl Display for PreviewKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Row-major RGBA8 image with the origin at the top-left.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewImage {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl PreviewImage {
    fn filled(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            rgba: vec![0; width as usize * height as usize * 4],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn rgba(&self) -> &[u8] {
        &self.rgba
    }

    pub fn into_rgba(self) -> Vec<u8> {
        self.rgba
    }

    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = self.offset(x, y);
        [
            self.rgba[offset],
            self.rgba[offset + 1],
            self.rgba[offset + 2],
            self.rgba[offset + 3],
        ]
    }

    /// Rec. 709 luma of a pixel, in `[0, 1]`.
    pub fn luma(&self, x: u32, y: u32) -> f32 {
        let [r, g, b, _] = self.pixel(x, y);
        luma(
            f32::from(r) / 255.0,
            f32::from(g) / 255.0,
            f32::from(b) / 255.0,
        )
    }

    fn put(&mut self, x: u32, y: u32, pixel: [u8; 4]) {
        let offset = self.offset(x, y);
        self.rgba[offset..offset + 4].copy_from_slice(&pixel);
    }

    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }
}

/// Render a preview with the bundled procedural content generator.
pub fn build_preview(
    kind: &str,
    asset_path: &str,
    seed: u32,
    width: u32,
    height: u32,
) -> Result<PreviewImage> {
    build_preview_with(
        &ProceduralContent::default(),
        kind,
        asset_path,
        seed,
        width,
        height,
    )
}

/// Render a preview, pulling meshes and textures from `content`.
pub fn build_preview_with(
    content: &dyn ContentSource,
    kind: &str,
    asset_path: &str,
    seed: u32,
    width: u32,
    height: u32,
) -> Result<PreviewImage> {
    if width == 0 || height == 0 {
        return Err(anyhow!(PreviewError::InvalidDimensions { width, height }));
    }

    let kind = PreviewKind::parse(kind);
    let chunk = ChunkIdentity::derive(asset_path, seed);
    debug!(
        "building {kind} preview for '{asset_path}' as {chunk} at {width}x{height} (seed {seed})"
    );

    match kind {
        PreviewKind::Mesh => render_mesh(content, &chunk, seed, width, height),
        PreviewKind::Texture => render_texture(content, &chunk, seed, width, height),
        PreviewKind::Material => render_material(content, &chunk, seed, width, height),
        PreviewKind::Fallback => Ok(render_fallback(seed, width, height)),
    }
    .with_context(|| format!("failed to build {kind} preview for '{asset_path}'"))
}

fn background(y: u32, height: u32) -> Vec3 {
    let t = y as f32 / height.saturating_sub(1).max(1) as f32;
    BACKGROUND_TOP.lerp(BACKGROUND_BOTTOM, t)
}

fn fill_background(image: &mut PreviewImage) {
    for y in 0..image.height {
        let pixel = encode_display(background(y, image.height));
        for x in 0..image.width {
            image.put(x, y, pixel);
        }
    }
}

fn render_mesh(
    content: &dyn ContentSource,
    chunk: &ChunkIdentity,
    seed: u32,
    width: u32,
    height: u32,
) -> Result<PreviewImage> {
    let mesh = content.mesh(chunk, seed)?;
    let textures = content.textures(chunk, seed)?;
    let maps = textures.material(&chunk.tag())?;

    let camera = Camera::from_seed(seed);
    let vertices = prepare_vertices(&mesh, &camera, width, height);
    let light = light_dir();

    let mut image = PreviewImage::filled(width, height);
    fill_background(&mut image);
    let mut depth = DepthBuffer::new(width, height);

    let mut shaded = 0;
    for tri in mesh.indices().chunks_exact(3) {
        let corners = [
            &vertices[tri[0] as usize],
            &vertices[tri[1] as usize],
            &vertices[tri[2] as usize],
        ];
        shaded += rasterize_triangle(corners, &mut depth, |x, y, fragment| {
            let sample = maps.sample(fragment.uv.x, fragment.uv.y);

            // Two-sided: surfaces seen from behind shade with the flipped normal.
            let mut normal = normalize_or_fallback(fragment.normal, VIEW_DIR);
            if normal.dot(VIEW_DIR) < 0.0 {
                normal = -normal;
            }
            let shading_normal = apply_normal_map(
                normal,
                fragment.tangent,
                fragment.bitangent,
                sample.normal,
                MESH_NORMAL_STRENGTH,
            );

            let lit = evaluate_pbr_lighting(
                sample.albedo,
                shading_normal,
                light,
                VIEW_DIR,
                sample.roughness,
                MESH_METALLIC,
                sample.ao,
            );
            image.put(x, y, encode_rgb(lit * fragment.color));
        });
    }
    trace!(
        "rasterized {} triangles, {shaded} fragments shaded",
        mesh.triangle_count()
    );
    Ok(image)
}

fn render_texture(
    content: &dyn ContentSource,
    chunk: &ChunkIdentity,
    seed: u32,
    width: u32,
    height: u32,
) -> Result<PreviewImage> {
    let surface = content.albedo_surface(chunk, seed, width, height)?;
    if surface.width() != width || surface.height() != height {
        return Err(anyhow!(
            "albedo surface for {} is {}x{}, requested {}x{}",
            chunk.tag(),
            surface.width(),
            surface.height(),
            width,
            height
        ));
    }

    let mut image = PreviewImage::filled(width, height);
    for (dst, src) in image
        .rgba
        .chunks_exact_mut(4)
        .zip(surface.pixels().chunks_exact(4))
    {
        for channel in 0..3 {
            dst[channel] = to_u8(tonemap_channel(f32::from(src[channel]) / 255.0));
        }
        dst[3] = src[3];
    }
    Ok(image)
}

fn render_material(
    content: &dyn ContentSource,
    chunk: &ChunkIdentity,
    seed: u32,
    width: u32,
    height: u32,
) -> Result<PreviewImage> {
    let textures = content.textures(chunk, seed)?;
    let maps = textures.material(&chunk.tag())?;
    let light = light_dir();
    let radius2 = SPHERE_RADIUS * SPHERE_RADIUS;
    let span_x = width.saturating_sub(1).max(1) as f32;
    let span_y = height.saturating_sub(1).max(1) as f32;

    let mut image = PreviewImage::filled(width, height);
    for y in 0..height {
        let ny = y as f32 / span_y * 2.0 - 1.0;
        for x in 0..width {
            let nx = x as f32 / span_x * 2.0 - 1.0;
            let r2 = nx * nx + ny * ny;
            if r2 > radius2 {
                image.put(x, y, encode_display(background(y, height)));
                continue;
            }

            let z = (1.0 - r2 / radius2).max(0.0).sqrt();
            let normal = normalize_or_fallback(Vec3::new(nx, -ny, z), VIEW_DIR);
            // Tangent follows increasing longitude around the vertical axis.
            let tangent = orthonormalize_tangent(normal, Vec3::new(normal.z, 0.0, -normal.x));
            let bitangent = normal.cross(tangent);

            let sample = maps.sample(nx * 0.5 + 0.5, ny * 0.5 + 0.5);
            let shading_normal =
                apply_normal_map(normal, tangent, bitangent, sample.normal, MATERIAL_NORMAL_STRENGTH);

            let color = shade_material_sphere(
                &SphereSurface {
                    albedo: sample.albedo,
                    normal: shading_normal,
                    roughness: sample.roughness,
                    ao: sample.ao,
                },
                light,
                VIEW_DIR,
            );
            image.put(x, y, encode_rgb(color));
        }
    }
    Ok(image)
}

/// Unlit diagonal gradient with per-pixel hash grain.
fn render_fallback(seed: u32, width: u32, height: u32) -> PreviewImage {
    let span_x = width.saturating_sub(1).max(1) as f32;
    let span_y = height.saturating_sub(1).max(1) as f32;
    let from = Vec3::new(0.18, 0.2, 0.24);
    let to = Vec3::new(0.42, 0.38, 0.34);

    let mut image = PreviewImage::filled(width, height);
    for y in 0..height {
        for x in 0..width {
            let t = (x as f32 / span_x + y as f32 / span_y) * 0.5;
            let grain = (sample01(seed, x, y) - 0.5) * 0.08;
            let color = from.lerp(to, t) + Vec3::splat(grain);
            image.put(x, y, encode_display(color));
        }
    }
    image
}

/// Fraction of pixels whose luma reaches `threshold`.
pub fn bright_fraction(image: &PreviewImage, threshold: f32) -> f32 {
    let total = image.width as usize * image.height as usize;
    let bright = (0..image.height)
        .flat_map(|y| (0..image.width).map(move |x| (x, y)))
        .filter(|&(x, y)| image.luma(x, y) >= threshold)
        .count();
    bright as f32 / total.max(1) as f32
}
