//! Bundled [`ContentSource`]: box-assembled chunk meshes and tileable
//! panel/noise material maps, all driven by [`hash`].

use anyhow::{Context, Result};
use glam::{Vec2, Vec3, Vec4};

use crate::chunk::{ChunkIdentity, NodeType};
use crate::content::ContentSource;
use crate::math::{hash, lerp, sample01, to_u8};
use crate::mesh::{Mesh, Vertex};
use crate::tangent::normalize_or_fallback;
use crate::texture::{TextureBundle, TexturePayload, TextureRole};

pub const DEFAULT_TEXTURE_SIZE: u32 = 64;

const UV_TILE: f32 = 0.5;
const NORMAL_STRENGTH: f32 = 2.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProceduralContent {
    pub texture_size: u32,
}

impl Default for ProceduralContent {
    fn default() -> Self {
        Self {
            texture_size: DEFAULT_TEXTURE_SIZE,
        }
    }
}

impl ContentSource for ProceduralContent {
    fn mesh(&self, chunk: &ChunkIdentity, seed: u32) -> Result<Mesh> {
        let field = SurfaceField::new(chunk, seed);
        let stretch = 1.0 + chunk.variant as f32 * 0.12;
        let mut builder = MeshBuilder::new(field.seed);

        match chunk.node_type {
            NodeType::Corridor => {
                builder.add_box(Vec3::ZERO, Vec3::new(1.6 * stretch, 0.45, 0.5));
                builder.add_box(
                    Vec3::new(0.0, -0.5, 0.0),
                    Vec3::new(1.7 * stretch, 0.06, 0.62),
                );
            }
            NodeType::Junction => {
                builder.add_box(Vec3::ZERO, Vec3::new(1.3 * stretch, 0.45, 0.45));
                builder.add_box(Vec3::ZERO, Vec3::new(0.45, 0.45, 1.3 * stretch));
                builder.add_box(
                    Vec3::new(0.0, -0.5, 0.0),
                    Vec3::new(0.7, 0.06, 0.7),
                );
            }
            NodeType::DeadEnd => {
                builder.add_box(
                    Vec3::new(-0.4, 0.0, 0.0),
                    Vec3::new(1.1 * stretch, 0.45, 0.5),
                );
                builder.add_box(
                    Vec3::new(0.7 + 0.85 * (stretch - 1.0), 0.05, 0.0),
                    Vec3::new(0.25, 0.6, 0.65),
                );
            }
            NodeType::Shaft => {
                builder.add_box(Vec3::ZERO, Vec3::new(0.6, 1.6 * stretch, 0.6));
                builder.add_box(
                    Vec3::new(0.0, 1.5 * stretch, 0.0),
                    Vec3::new(0.8, 0.08, 0.8),
                );
                builder.add_box(
                    Vec3::new(0.0, -1.5 * stretch, 0.0),
                    Vec3::new(0.8, 0.08, 0.8),
                );
            }
            NodeType::Room => {
                builder.add_box(Vec3::ZERO, Vec3::new(1.2 * stretch, 0.5, 1.1));
                builder.add_box(
                    Vec3::new(0.7 * stretch, 0.25, 0.6),
                    Vec3::new(0.18, 0.75, 0.18),
                );
                builder.add_box(
                    Vec3::new(0.0, -0.56, 0.0),
                    Vec3::new(1.3 * stretch, 0.06, 1.2),
                );
            }
        }

        builder
            .build()
            .with_context(|| format!("failed to assemble mesh for {}", chunk.tag()))
    }

    fn textures(&self, chunk: &ChunkIdentity, seed: u32) -> Result<TextureBundle> {
        let field = SurfaceField::new(chunk, seed);
        let size = self.texture_size;
        let tag = chunk.tag();

        let mut bundle = TextureBundle::new();
        bundle.insert(
            TextureRole::Albedo.key(&tag),
            rasterize(size, size, |u, v| {
                let c = field.albedo(u, v);
                [to_u8(c.x), to_u8(c.y), to_u8(c.z), 255]
            })?,
        );
        bundle.insert(
            TextureRole::Normal.key(&tag),
            rasterize(size, size, |u, v| {
                let n = field.normal(u, v, size) * 0.5 + Vec3::splat(0.5);
                [to_u8(n.x), to_u8(n.y), to_u8(n.z), 255]
            })?,
        );
        bundle.insert(
            TextureRole::Roughness.key(&tag),
            rasterize(size, size, |u, v| gray(field.roughness(u, v)))?,
        );
        bundle.insert(
            TextureRole::AmbientOcclusion.key(&tag),
            rasterize(size, size, |u, v| gray(field.ao(u, v)))?,
        );
        Ok(bundle)
    }

    fn albedo_surface(
        &self,
        chunk: &ChunkIdentity,
        seed: u32,
        width: u32,
        height: u32,
    ) -> Result<TexturePayload> {
        let field = SurfaceField::new(chunk, seed);
        let surface = rasterize(width, height, |u, v| {
            let c = field.albedo(u, v);
            [to_u8(c.x), to_u8(c.y), to_u8(c.z), 255]
        })?;
        Ok(surface)
    }
}

fn gray(value: f32) -> [u8; 4] {
    let g = to_u8(value);
    [g, g, g, 255]
}

/// Evaluate `texel` at every texel center. `v = 0` is the bottom row.
fn rasterize<F>(width: u32, height: u32, texel: F) -> Result<TexturePayload>
where
    F: Fn(f32, f32) -> [u8; 4],
{
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        let v = 1.0 - (y as f32 + 0.5) / height as f32;
        for x in 0..width {
            let u = (x as f32 + 0.5) / width as f32;
            data.extend_from_slice(&texel(u, v));
        }
    }
    Ok(TexturePayload::new(width, height, data)?)
}

/// Tileable scalar fields shared by all four maps of one chunk.
struct SurfaceField {
    seed: u32,
    panels: f32,
    palette: Vec3,
}

impl SurfaceField {
    fn new(chunk: &ChunkIdentity, seed: u32) -> Self {
        let salt = match chunk.node_type {
            NodeType::Corridor => 0x1F3D_5B79,
            NodeType::Junction => 0x2A4C_6E80,
            NodeType::DeadEnd => 0x3B5D_7F91,
            NodeType::Shaft => 0x4C6E_80A2,
            NodeType::Room => 0x5D7F_91B3,
        };
        let seed = hash(seed ^ salt, chunk.node_id, chunk.variant);
        let base = match chunk.node_type {
            NodeType::Corridor => Vec3::new(0.62, 0.58, 0.52),
            NodeType::Junction => Vec3::new(0.55, 0.6, 0.64),
            NodeType::DeadEnd => Vec3::new(0.66, 0.52, 0.44),
            NodeType::Shaft => Vec3::new(0.5, 0.56, 0.5),
            NodeType::Room => Vec3::new(0.68, 0.64, 0.58),
        };
        let jitter = Vec3::new(
            sample01(seed, 3, 5),
            sample01(seed, 7, 11),
            sample01(seed, 13, 17),
        ) * 0.08
            - Vec3::splat(0.04);

        Self {
            seed,
            panels: (2 + chunk.variant) as f32,
            palette: base + jitter,
        }
    }

    fn grain(&self, u: f32, v: f32) -> f32 {
        value_noise(self.seed, u, v, 4) * 0.5
            + value_noise(self.seed ^ 0x9E37_79B9, u, v, 8) * 0.3
            + value_noise(self.seed ^ 0x7F4A_7C15, u, v, 16) * 0.2
    }

    /// 0 on panel seams, 1 in panel interiors.
    fn seam(&self, u: f32, v: f32) -> f32 {
        let fu = fract(u * self.panels);
        let fv = fract(v * self.panels);
        let distance = fu.min(1.0 - fu).min(fv).min(1.0 - fv);
        smoothstep(0.0, 0.06, distance)
    }

    fn height(&self, u: f32, v: f32) -> f32 {
        self.seam(u, v) * 0.7 + self.grain(u, v) * 0.3
    }

    fn albedo(&self, u: f32, v: f32) -> Vec3 {
        let grain = self.grain(u, v);
        let seam = self.seam(u, v);
        self.palette * (0.7 + 0.45 * grain) * (0.55 + 0.45 * seam)
    }

    fn normal(&self, u: f32, v: f32, size: u32) -> Vec3 {
        let step = 1.0 / size as f32;
        let dx = self.height(u + step, v) - self.height(u - step, v);
        let dy = self.height(u, v + step) - self.height(u, v - step);
        normalize_or_fallback(
            Vec3::new(-dx * NORMAL_STRENGTH, -dy * NORMAL_STRENGTH, 1.0),
            Vec3::Z,
        )
    }

    fn roughness(&self, u: f32, v: f32) -> f32 {
        let detail = value_noise(self.seed ^ 0x51ED_2701, u, v, 8);
        (0.35 + 0.45 * detail + (1.0 - self.seam(u, v)) * 0.15).clamp(0.0, 1.0)
    }

    fn ao(&self, u: f32, v: f32) -> f32 {
        (0.55 + 0.45 * self.seam(u, v)) * (0.9 + 0.1 * self.grain(u, v))
    }
}

fn fract(x: f32) -> f32 {
    x - x.floor()
}

fn smoothstep(edge0: f32, edge1: f32, x: f32) -> f32 {
    let t = ((x - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    t * t * (3.0 - 2.0 * t)
}

/// Value noise on a `cells`×`cells` lattice that wraps at the unit square.
fn value_noise(seed: u32, u: f32, v: f32, cells: u32) -> f32 {
    let x = fract(u) * cells as f32;
    let y = fract(v) * cells as f32;
    let xf = x.floor();
    let yf = y.floor();
    let tx = smoothstep(0.0, 1.0, x - xf);
    let ty = smoothstep(0.0, 1.0, y - yf);

    let cells = i64::from(cells);
    let lattice = |ix: i64, iy: i64| {
        let wx = ix.rem_euclid(cells) as u32;
        let wy = iy.rem_euclid(cells) as u32;
        sample01(seed, wx, wy)
    };
    let (ix, iy) = (xf as i64, yf as i64);

    let top = lerp(lattice(ix, iy), lattice(ix + 1, iy), tx);
    let bottom = lerp(lattice(ix, iy + 1), lattice(ix + 1, iy + 1), tx);
    lerp(top, bottom, ty)
}

struct MeshBuilder {
    seed: u32,
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    faces: u32,
}

/// Outward normal and tangent per box face; bitangent is `normal × tangent`.
const BOX_FACES: [(Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_X, Vec3::Z),
    (Vec3::Y, Vec3::X),
    (Vec3::NEG_Y, Vec3::X),
    (Vec3::Z, Vec3::X),
    (Vec3::NEG_Z, Vec3::NEG_X),
];

impl MeshBuilder {
    fn new(seed: u32) -> Self {
        Self {
            seed,
            vertices: Vec::new(),
            indices: Vec::new(),
            faces: 0,
        }
    }

    fn add_box(&mut self, center: Vec3, half: Vec3) {
        for (normal, tangent) in BOX_FACES {
            let bitangent = normal.cross(tangent);
            let half_n = half.dot(normal.abs());
            let half_t = half.dot(tangent.abs());
            let half_b = half.dot(bitangent.abs());

            let face = self.faces;
            self.faces += 1;
            let tint = Vec3::new(
                sample01(self.seed, face, 1),
                sample01(self.seed, face, 2),
                sample01(self.seed, face, 3),
            ) * 0.12
                + Vec3::splat(0.88);

            let base = self.vertices.len() as u32;
            for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
                let position =
                    center + normal * half_n + tangent * (su * half_t) + bitangent * (sv * half_b);
                let uv = Vec2::new(
                    (su * half_t + half_t) * UV_TILE,
                    (sv * half_b + half_b) * UV_TILE,
                );
                self.vertices.push(Vertex {
                    position,
                    normal,
                    tangent: Vec4::new(tangent.x, tangent.y, tangent.z, 1.0),
                    uv,
                    color: tint,
                });
            }
            self.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }
    }

    fn build(self) -> Result<Mesh> {
        Ok(Mesh::new(self.vertices, self.indices)?)
    }
}
