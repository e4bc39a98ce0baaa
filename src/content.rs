//! The seam between the renderer and whatever synthesizes preview content.

use anyhow::Result;

use crate::chunk::ChunkIdentity;
use crate::mesh::Mesh;
use crate::texture::{TextureBundle, TexturePayload};

/// Deterministic supplier of meshes and textures for a chunk.
///
/// Implementations must be pure functions of `(chunk, seed, size)`: the
/// preview contract is byte-identical output across runs and machines.
pub trait ContentSource {
    fn mesh(&self, chunk: &ChunkIdentity, seed: u32) -> Result<Mesh>;

    /// Albedo, normal, roughness and ao maps keyed by
    /// [`TextureRole::key`](crate::texture::TextureRole::key).
    fn textures(&self, chunk: &ChunkIdentity, seed: u32) -> Result<TextureBundle>;

    /// The albedo surface evaluated directly at the requested resolution.
    fn albedo_surface(
        &self,
        chunk: &ChunkIdentity,
        seed: u32,
        width: u32,
        height: u32,
    ) -> Result<TexturePayload>;
}
