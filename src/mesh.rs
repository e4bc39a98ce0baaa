use glam::{Vec2, Vec3, Vec4};

use crate::error::PreviewError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    /// xyz tangent, w handedness sign.
    pub tangent: Vec4,
    pub uv: Vec2,
    pub color: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    /// Bounds of the finite points; `None` when there are none.
    pub fn from_points<I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = Vec3>,
    {
        let mut iter = points.into_iter().filter(|p| p.is_finite());
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(min, max), p| (min.min(p), max.max(p)));
        Some(Self { min, max })
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn max_extent(&self) -> f32 {
        self.extent().max_element()
    }
}

/// Indexed triangle list, immutable while a preview renders.
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    vertices: Vec<Vertex>,
    indices: Vec<u32>,
    bounds: Bounds,
}

impl Mesh {
    /// Validates the triangle list and computes bounds from the vertices.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>) -> Result<Self, PreviewError> {
        if indices.is_empty() || indices.len() % 3 != 0 {
            return Err(PreviewError::InvalidMesh {
                reason: format!(
                    "index count must be a positive multiple of 3, got {}",
                    indices.len()
                ),
            });
        }
        if let Some(bad) = indices.iter().find(|&&i| i as usize >= vertices.len()) {
            return Err(PreviewError::InvalidMesh {
                reason: format!(
                    "index {bad} out of range for {} vertices",
                    vertices.len()
                ),
            });
        }
        let bounds = Bounds::from_points(vertices.iter().map(|v| v.position)).ok_or_else(|| {
            PreviewError::InvalidMesh {
                reason: "mesh has no finite vertex positions".to_owned(),
            }
        })?;
        Ok(Self {
            vertices,
            indices,
            bounds,
        })
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    pub fn bounds(&self) -> Bounds {
        self.bounds
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3, Vec4};

    use super::*;

    fn vertex(x: f32, y: f32, z: f32) -> Vertex {
        Vertex {
            position: Vec3::new(x, y, z),
            normal: Vec3::Z,
            tangent: Vec4::new(1.0, 0.0, 0.0, 1.0),
            uv: Vec2::ZERO,
            color: Vec3::ONE,
        }
    }

    #[test]
    fn bounds_cover_all_vertices() {
        let mesh = Mesh::new(
            vec![vertex(-1.0, 0.0, 2.0), vertex(3.0, -2.0, 0.0), vertex(0.0, 1.0, -1.0)],
            vec![0, 1, 2],
        )
        .expect("mesh should build");
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, -2.0, -1.0));
        assert_eq!(bounds.max, Vec3::new(3.0, 1.0, 2.0));
        assert_eq!(bounds.max_extent(), 4.0);
        assert_eq!(mesh.triangle_count(), 1);
    }

    #[test]
    fn non_finite_positions_stay_out_of_bounds() {
        let mesh = Mesh::new(
            vec![
                vertex(-1.0, 0.0, 0.0),
                vertex(1.0, 1.0, 0.0),
                vertex(f32::INFINITY, 0.0, 0.0),
                vertex(0.0, f32::NAN, f32::NEG_INFINITY),
            ],
            vec![0, 1, 2, 0, 1, 3],
        )
        .expect("finite vertices remain");
        let bounds = mesh.bounds();
        assert_eq!(bounds.min, Vec3::new(-1.0, 0.0, 0.0));
        assert_eq!(bounds.max, Vec3::new(1.0, 1.0, 0.0));
    }

    #[test]
    fn meshes_without_finite_positions_are_rejected() {
        let error = Mesh::new(
            vec![
                vertex(f32::INFINITY, 0.0, 0.0),
                vertex(f32::NAN, 0.0, 0.0),
                vertex(0.0, f32::NEG_INFINITY, 0.0),
            ],
            vec![0, 1, 2],
        )
        .expect_err("no finite positions");
        assert!(matches!(error, PreviewError::InvalidMesh { .. }), "{error}");
    }

    #[test]
    fn malformed_index_lists_are_rejected() {
        let vertices = vec![vertex(0.0, 0.0, 0.0), vertex(1.0, 0.0, 0.0), vertex(0.0, 1.0, 0.0)];
        assert!(Mesh::new(vertices.clone(), vec![0, 1]).is_err());
        assert!(Mesh::new(vertices.clone(), vec![0, 1, 3]).is_err());
        assert!(Mesh::new(Vec::new(), vec![0, 0, 0]).is_err());
        assert!(Mesh::new(vertices, Vec::new()).is_err());
    }
}
