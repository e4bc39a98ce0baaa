use anyhow::Result;
use glam::{Vec2, Vec3, Vec4};
use softpreview::chunk::ChunkIdentity;
use softpreview::content::ContentSource;
use softpreview::mesh::{Mesh, Vertex};
use softpreview::preview::bright_fraction;
use softpreview::procedural::ProceduralContent;
use softpreview::texture::{TextureBundle, TexturePayload, TextureRole};
use softpreview::{build_preview, build_preview_with, find_preview_error, PreviewError};

const DEFAULT_MESH_ASSET: &str = "levels/room.chunk";
const BRIGHT_LUMA: f32 = 0.72;

#[test]
fn default_mesh_preview_is_neither_blown_out_nor_black() {
    let image = build_preview("mesh", DEFAULT_MESH_ASSET, 0, 96, 96).expect("mesh preview");
    let fraction = bright_fraction(&image, BRIGHT_LUMA);
    assert!(
        (0.01..=0.45).contains(&fraction),
        "bright fraction {fraction} outside [0.01, 0.45]"
    );
}

#[test]
fn mesh_brightness_stays_balanced_across_seeds() {
    for seed in [1, 2, 5] {
        let image = build_preview("mesh", DEFAULT_MESH_ASSET, seed, 96, 96).expect("mesh preview");
        let fraction = bright_fraction(&image, BRIGHT_LUMA);
        assert!(
            fraction > 0.0 && fraction <= 0.45,
            "seed {seed}: bright fraction {fraction}"
        );
    }
}

#[test]
fn material_sphere_center_outshines_corner() {
    for (asset, seed) in [(DEFAULT_MESH_ASSET, 0), ("levels/corridor_a.chunk", 1234)] {
        let image = build_preview("material", asset, seed, 96, 96).expect("material preview");
        let center = image.luma(48, 48);
        let corner = image.luma(3, 3);
        assert!(
            center - corner > 0.06,
            "{asset}: center {center} vs corner {corner}"
        );
    }
}

#[test]
fn node_types_render_distinct_meshes() {
    let corridor = build_preview("mesh", "levels/corridor_a.chunk", 11, 64, 64).expect("corridor");
    let shaft = build_preview("mesh", "levels/shaft_a.chunk", 11, 64, 64).expect("shaft");
    assert_ne!(corridor.rgba(), shaft.rgba());
}

#[test]
fn node_types_render_distinct_textures_and_materials() {
    for kind in ["texture", "material"] {
        let corridor =
            build_preview(kind, "levels/corridor_a.chunk", 11, 64, 64).expect("corridor");
        let shaft = build_preview(kind, "levels/shaft_a.chunk", 11, 64, 64).expect("shaft");
        assert_ne!(corridor.rgba(), shaft.rgba(), "{kind}");
    }
}

#[test]
fn preview_kinds_of_one_asset_differ() {
    let mesh = build_preview("mesh", "levels/junction_2", 8, 48, 48).expect("mesh");
    let texture = build_preview("texture", "levels/junction_2", 8, 48, 48).expect("texture");
    let material = build_preview("material", "levels/junction_2", 8, 48, 48).expect("material");
    assert_ne!(mesh.rgba(), texture.rgba());
    assert_ne!(texture.rgba(), material.rgba());
    assert_ne!(mesh.rgba(), material.rgba());
}

#[test]
fn texture_preview_matches_requested_size() {
    let image = build_preview("texture", "levels/deadend", 4, 40, 24).expect("texture");
    assert_eq!((image.width(), image.height()), (40, 24));
    assert_eq!(image.rgba().len(), 40 * 24 * 4);
}

/// Procedural content with the ambient occlusion map left out.
struct WithoutAo(ProceduralContent);

impl ContentSource for WithoutAo {
    fn mesh(&self, chunk: &ChunkIdentity, seed: u32) -> Result<Mesh> {
        self.0.mesh(chunk, seed)
    }

    fn textures(&self, chunk: &ChunkIdentity, seed: u32) -> Result<TextureBundle> {
        let full = self.0.textures(chunk, seed)?;
        let tag = chunk.tag();
        let mut partial = TextureBundle::new();
        for role in [TextureRole::Albedo, TextureRole::Normal, TextureRole::Roughness] {
            let key = role.key(&tag);
            if let Some(texture) = full.get(&key) {
                partial.insert(key, texture.clone());
            }
        }
        Ok(partial)
    }

    fn albedo_surface(
        &self,
        chunk: &ChunkIdentity,
        seed: u32,
        width: u32,
        height: u32,
    ) -> Result<TexturePayload> {
        self.0.albedo_surface(chunk, seed, width, height)
    }
}

#[test]
fn missing_texture_role_fails_lit_previews() {
    let content = WithoutAo(ProceduralContent::default());
    let expected_key = TextureRole::AmbientOcclusion.key(&ChunkIdentity::derive("levels/room", 3).tag());

    for kind in ["mesh", "material"] {
        let error = build_preview_with(&content, kind, "levels/room", 3, 32, 32)
            .expect_err("lit preview without ao map");
        assert_eq!(
            find_preview_error(&error),
            Some(&PreviewError::MissingTexture {
                key: expected_key.clone()
            }),
            "{kind}: {error:#}"
        );
    }

    // Unlit kinds never consult the bundle.
    build_preview_with(&content, "texture", "levels/room", 3, 32, 32).expect("texture preview");
    build_preview_with(&content, "fallback", "levels/room", 3, 32, 32).expect("fallback preview");
}

/// Procedural content whose mesh gains one extra triangle with a corrupt corner.
struct WithCorruptVertex {
    inner: ProceduralContent,
    corrupt: Vec3,
}

impl ContentSource for WithCorruptVertex {
    fn mesh(&self, chunk: &ChunkIdentity, seed: u32) -> Result<Mesh> {
        let mesh = self.inner.mesh(chunk, seed)?;
        let mut vertices = mesh.vertices().to_vec();
        let mut indices = mesh.indices().to_vec();
        let base = vertices.len() as u32;
        for position in [Vec3::new(-0.3, 0.0, 0.0), Vec3::new(0.3, 0.2, 0.0), self.corrupt] {
            vertices.push(Vertex {
                position,
                normal: Vec3::Y,
                tangent: Vec4::new(1.0, 0.0, 0.0, 1.0),
                uv: Vec2::ZERO,
                color: Vec3::ONE,
            });
        }
        indices.extend_from_slice(&[base, base + 1, base + 2]);
        Ok(Mesh::new(vertices, indices)?)
    }

    fn textures(&self, chunk: &ChunkIdentity, seed: u32) -> Result<TextureBundle> {
        self.inner.textures(chunk, seed)
    }

    fn albedo_surface(
        &self,
        chunk: &ChunkIdentity,
        seed: u32,
        width: u32,
        height: u32,
    ) -> Result<TexturePayload> {
        self.inner.albedo_surface(chunk, seed, width, height)
    }
}

#[test]
fn one_non_finite_vertex_only_drops_its_triangle() {
    let clean = build_preview("mesh", DEFAULT_MESH_ASSET, 0, 48, 48).expect("clean mesh");
    for corrupt in [
        Vec3::splat(f32::INFINITY),
        Vec3::splat(f32::NEG_INFINITY),
        Vec3::new(0.0, f32::NAN, 0.0),
    ] {
        let content = WithCorruptVertex {
            inner: ProceduralContent::default(),
            corrupt,
        };
        let image = build_preview_with(&content, "mesh", DEFAULT_MESH_ASSET, 0, 48, 48)
            .expect("corrupt vertex must not fail the render");
        assert_eq!(image.rgba(), clean.rgba(), "corner {corrupt:?}");
    }
}
