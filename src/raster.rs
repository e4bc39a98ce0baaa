//! Seeded camera, perspective projection and depth-tested triangle
//! rasterization.
//!
//! Coverage uses edge functions compared against the sign of the triangle's
//! own area, so both windings rasterize and nothing is culled.

use glam::{Mat3, Vec2, Vec3};

use crate::math::{edge, sample01};
use crate::mesh::Mesh;
use crate::tangent::{bitangent_from, normalize_or_fallback};

/// Distance from the eye to the recentered mesh.
pub const CAMERA_DISTANCE: f32 = 3.2;
/// Size of the largest mesh extent after normalization.
pub const FIT_EXTENT: f32 = 1.8;
const FOCAL: f32 = 1.6;
const NEAR: f32 = 0.1;
const MIN_AREA: f32 = 1e-6;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera {
    pub fn from_seed(seed: u32) -> Self {
        Self {
            yaw: 0.65 + sample01(seed, 17, 3) * 0.35,
            pitch: -0.42 + sample01(seed, 23, 7) * 0.08,
        }
    }

    /// Yaw about Y first, then pitch about X; no roll.
    pub fn rotation(&self) -> Mat3 {
        Mat3::from_rotation_x(self.pitch) * Mat3::from_rotation_y(self.yaw)
    }
}

/// Perspective divide onto a `width`×`height` pixel grid.
///
/// Returns screen xy (pixel centers at integers, y down) and the view depth.
pub fn project(point: Vec3, width: u32, height: u32) -> (Vec2, f32) {
    let inv_z = 1.0 / point.z.max(NEAR);
    let x = (point.x * FOCAL * inv_z * 0.5 + 0.5) * (width.saturating_sub(1)) as f32;
    let y = (0.5 - point.y * FOCAL * inv_z * 0.5) * (height.saturating_sub(1)) as f32;
    (Vec2::new(x, y), point.z)
}

/// Camera-space directions are mirrored in z for shading so that +Z points
/// back toward the eye.
#[inline]
fn to_shading_frame(v: Vec3) -> Vec3 {
    Vec3::new(v.x, v.y, -v.z)
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct RasterVertex {
    pub screen: Vec2,
    pub depth: f32,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub uv: Vec2,
    pub color: Vec3,
}

/// Recenter, normalize, orient and project every mesh vertex.
pub(crate) fn prepare_vertices(
    mesh: &Mesh,
    camera: &Camera,
    width: u32,
    height: u32,
) -> Vec<RasterVertex> {
    let bounds = mesh.bounds();
    let center = bounds.center();
    let scale = FIT_EXTENT / bounds.max_extent().max(1e-4);
    let rotation = camera.rotation();

    mesh.vertices()
        .iter()
        .map(|vertex| {
            let local = (vertex.position - center) * scale;
            let mut view = rotation * local;
            view.z += CAMERA_DISTANCE;
            let (screen, depth) = project(view, width, height);

            let normal = normalize_or_fallback(rotation * vertex.normal, Vec3::NEG_Z);
            let tangent_xyz = vertex.tangent.truncate();
            let tangent = normalize_or_fallback(rotation * tangent_xyz, Vec3::X);
            let bitangent = bitangent_from(normal, tangent, vertex.tangent.w);

            RasterVertex {
                screen,
                depth,
                normal: to_shading_frame(normal),
                tangent: to_shading_frame(tangent),
                bitangent: to_shading_frame(bitangent),
                uv: vertex.uv,
                color: vertex.color,
            }
        })
        .collect()
}

pub struct DepthBuffer {
    width: u32,
    height: u32,
    depth: Vec<f32>,
}

impl DepthBuffer {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            depth: vec![f32::INFINITY; width as usize * height as usize],
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    #[cfg(test)]
    pub(crate) fn get(&self, x: u32, y: u32) -> f32 {
        self.depth[self.index(x, y)]
    }

    /// Less-than test; stores `depth` and returns true when it passes.
    pub fn test_and_set(&mut self, x: u32, y: u32, depth: f32) -> bool {
        let index = self.index(x, y);
        if depth < self.depth[index] {
            self.depth[index] = depth;
            true
        } else {
            false
        }
    }

    fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }
}

/// Attributes interpolated at a covered pixel, shading frame.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Fragment {
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
    pub uv: Vec2,
    pub color: Vec3,
}

/// Rasterize one triangle, calling `shade` for every pixel that wins the
/// depth test. Returns the number of pixels shaded.
pub(crate) fn rasterize_triangle<F>(
    tri: [&RasterVertex; 3],
    depth: &mut DepthBuffer,
    mut shade: F,
) -> usize
where
    F: FnMut(u32, u32, &Fragment),
{
    let [a, b, c] = tri;
    let area = edge(
        a.screen.x, a.screen.y, b.screen.x, b.screen.y, c.screen.x, c.screen.y,
    );
    if !area.is_finite() || area.abs() < MIN_AREA {
        return 0;
    }

    let min = a.screen.min(b.screen).min(c.screen);
    let max = a.screen.max(b.screen).max(c.screen);
    let max_x = (depth.width() - 1) as f32;
    let max_y = (depth.height() - 1) as f32;
    if max.x < 0.0 || max.y < 0.0 || min.x > max_x || min.y > max_y {
        return 0;
    }
    let x0 = min.x.floor().max(0.0) as u32;
    let y0 = min.y.floor().max(0.0) as u32;
    let x1 = max.x.ceil().min(max_x) as u32;
    let y1 = max.y.ceil().min(max_y) as u32;

    let inv_area = 1.0 / area;
    let mut shaded = 0;
    for y in y0..=y1 {
        let py = y as f32;
        for x in x0..=x1 {
            let px = x as f32;
            let w0 = edge(b.screen.x, b.screen.y, c.screen.x, c.screen.y, px, py);
            let w1 = edge(c.screen.x, c.screen.y, a.screen.x, a.screen.y, px, py);
            let w2 = edge(a.screen.x, a.screen.y, b.screen.x, b.screen.y, px, py);
            let inside = if area > 0.0 {
                w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0
            } else {
                w0 <= 0.0 && w1 <= 0.0 && w2 <= 0.0
            };
            if !inside {
                continue;
            }

            let (l0, l1, l2) = (w0 * inv_area, w1 * inv_area, w2 * inv_area);
            let z = a.depth * l0 + b.depth * l1 + c.depth * l2;
            if !depth.test_and_set(x, y, z) {
                continue;
            }

            let fragment = Fragment {
                normal: a.normal * l0 + b.normal * l1 + c.normal * l2,
                tangent: a.tangent * l0 + b.tangent * l1 + c.tangent * l2,
                bitangent: a.bitangent * l0 + b.bitangent * l1 + c.bitangent * l2,
                uv: a.uv * l0 + b.uv * l1 + c.uv * l2,
                color: a.color * l0 + b.color * l1 + c.color * l2,
            };
            shade(x, y, &fragment);
            shaded += 1;
        }
    }
    shaded
}

#[cfg(test)]
mod tests {
    use glam::{Vec2, Vec3};

    use super::*;

    fn vertex(x: f32, y: f32, depth: f32) -> RasterVertex {
        RasterVertex {
            screen: Vec2::new(x, y),
            depth,
            normal: Vec3::Z,
            tangent: Vec3::X,
            bitangent: Vec3::Y,
            uv: Vec2::ZERO,
            color: Vec3::ONE,
        }
    }

    fn coverage(tri: [&RasterVertex; 3]) -> Vec<(u32, u32)> {
        let mut depth = DepthBuffer::new(8, 8);
        let mut pixels = Vec::new();
        rasterize_triangle(tri, &mut depth, |x, y, _| pixels.push((x, y)));
        pixels
    }

    #[test]
    fn both_windings_cover_the_same_pixels() {
        let a = vertex(0.0, 0.0, 1.0);
        let b = vertex(7.0, 0.0, 1.0);
        let c = vertex(0.0, 7.0, 1.0);
        let ccw = coverage([&a, &b, &c]);
        let cw = coverage([&a, &c, &b]);
        assert!(!ccw.is_empty());
        assert_eq!(ccw, cw);
    }

    #[test]
    fn degenerate_triangles_are_skipped() {
        let a = vertex(0.0, 0.0, 1.0);
        let b = vertex(3.0, 3.0, 1.0);
        let c = vertex(6.0, 6.0, 1.0);
        assert!(coverage([&a, &b, &c]).is_empty());
    }

    #[test]
    fn nearer_triangle_wins_regardless_of_order() {
        let far = [vertex(0.0, 0.0, 5.0), vertex(7.0, 0.0, 5.0), vertex(0.0, 7.0, 5.0)];
        let near = [vertex(0.0, 0.0, 2.0), vertex(7.0, 0.0, 2.0), vertex(0.0, 7.0, 2.0)];

        let mut depth = DepthBuffer::new(8, 8);
        rasterize_triangle([&near[0], &near[1], &near[2]], &mut depth, |_, _, _| {});
        let overdraw = rasterize_triangle([&far[0], &far[1], &far[2]], &mut depth, |_, _, _| {});
        assert_eq!(overdraw, 0);
        assert!((depth.get(1, 1) - 2.0).abs() < 1e-5);
    }

    #[test]
    fn offscreen_triangles_touch_nothing() {
        let a = vertex(-20.0, -20.0, 1.0);
        let b = vertex(-10.0, -20.0, 1.0);
        let c = vertex(-20.0, -10.0, 1.0);
        assert!(coverage([&a, &b, &c]).is_empty());
    }

    #[test]
    fn projection_centers_the_optical_axis() {
        let (screen, depth) = project(Vec3::new(0.0, 0.0, CAMERA_DISTANCE), 97, 97);
        assert_eq!(screen, Vec2::new(48.0, 48.0));
        assert_eq!(depth, CAMERA_DISTANCE);

        let (up, _) = project(Vec3::new(0.0, 0.5, CAMERA_DISTANCE), 97, 97);
        assert!(up.y < 48.0, "+y should map toward the top row");
    }

    #[test]
    fn camera_angles_stay_in_jitter_range() {
        for seed in 0..256 {
            let camera = Camera::from_seed(seed);
            assert!(camera.yaw >= 0.65 && camera.yaw <= 1.0);
            assert!(camera.pitch >= -0.42 && camera.pitch <= -0.34);
        }
    }
}
