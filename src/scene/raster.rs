//! Triangle setup and tile rasterization.
//!
//! Setup (triangle assembly, rejection, screen mapping, bounding boxes) runs once per triangle per
//! frame. Rasterization then works on one exclusively owned tile at a time: coverage through edge
//! functions, barycentric weights, perspective correct interpolation, the depth test and shading.

use std::ops::{Add, Mul};
use std::sync::Arc;

use nalgebra as na;
use na::{vector, Vector2};

use super::buffer::Tile;
use super::mesh::Topology;
use super::settings::RenderSettings;
use super::shader::{Fragment, Material, SceneLighting};
use super::transform::PostTransformVertex;
use super::util::ColorRGB;

/// Overlay color for bounding box visualization.
const BOUNDING_BOX_COLOR: ColorRGB = vector![1.0, 1.0, 1.0];

/// Pixel rectangle [min, max) covering a triangle, already clamped to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundingBox {
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
}

/// Triangle ready for rasterization.
#[derive(Debug, Clone, Copy)]
pub struct TriangleSetup {
    vertices: [PostTransformVertex; 3],
    screen: [Vector2<f32>; 3],
    area: f32, // Signed, twice the screen space area.
    bbox: BoundingBox,
    material: usize,
}

/// Everything a tile worker needs for one frame. Immutable once built.
pub struct FrameJob {
    pub triangles: Vec<TriangleSetup>,
    pub materials: Vec<Arc<Material>>,
    pub lighting: SceneLighting,
    pub settings: RenderSettings,
}

/// NDC x, y in [-1, 1] to pixel coordinates, y pointing down.
pub fn ndc_to_screen(ndc: Vector2<f32>, width: u32, height: u32) -> Vector2<f32> {
    return vector![(ndc.x + 1.0) / 2.0 * width as f32, (1.0 - ndc.y) / 2.0 * height as f32];
}

/// 2D cross product of the edge a -> b with a -> p. Non-negative on the inner side of a
/// triangle whose total area (edge_function(v0, v1, v2)) is positive.
pub fn edge_function(a: Vector2<f32>, b: Vector2<f32>, p: Vector2<f32>) -> f32 {
    return (b.x - a.x) * (p.y - a.y) - (b.y - a.y) * (p.x - a.x);
}

/// Convex combination of three vertex values.
fn blend<T>(values: [T; 3], factors: [f32; 3]) -> T
where
    T: Copy + Mul<f32, Output = T> + Add<Output = T>,
{
    return values[0] * factors[0] + values[1] * factors[1] + values[2] * factors[2];
}

impl TriangleSetup {
    /// Rejects triangles that can't produce pixels and prepares the rest.
    ///
    /// Rejection is conservative: triangles crossing the screen border are kept and cut by the
    /// bounding box clamp instead of being clipped.
    pub fn new(vertices: [PostTransformVertex; 3], width: u32, height: u32, material: usize) -> Option<Self> {
        // No clipping against the near plane, vertices behind the eye make the divide meaningless.
        if vertices.iter().any(|v| v.position.w <= 0.0) {
            return None;
        }
        if vertices.iter().all(|v| !(0.0..=1.0).contains(&v.position.z)) {
            return None;
        }
        if vertices.iter().all(|v| v.position.x < -1.0)
            || vertices.iter().all(|v| v.position.x > 1.0)
            || vertices.iter().all(|v| v.position.y < -1.0)
            || vertices.iter().all(|v| v.position.y > 1.0)
        {
            return None;
        }

        let screen = vertices.map(|v| ndc_to_screen(v.position.xy(), width, height));
        let area = edge_function(screen[0], screen[1], screen[2]);
        if area.abs() < f32::EPSILON {
            return None;
        }

        let min_x = screen[0].x.min(screen[1].x).min(screen[2].x);
        let min_y = screen[0].y.min(screen[1].y).min(screen[2].y);
        let max_x = screen[0].x.max(screen[1].x).max(screen[2].x);
        let max_y = screen[0].y.max(screen[1].y).max(screen[2].y);
        let bbox = BoundingBox {
            min_x: min_x.floor().clamp(0.0, width as f32) as u32,
            min_y: min_y.floor().clamp(0.0, height as f32) as u32,
            max_x: max_x.ceil().clamp(0.0, width as f32) as u32,
            max_y: max_y.ceil().clamp(0.0, height as f32) as u32,
        };

        return Some(Self {
            vertices,
            screen,
            area,
            bbox,
            material,
        });
    }

    pub fn bbox(&self) -> BoundingBox {
        return self.bbox;
    }

    /// Edge function values at `p`, each one belonging to the vertex opposite of its edge.
    pub fn edge_values(&self, p: Vector2<f32>) -> [f32; 3] {
        let [v0, v1, v2] = self.screen;
        return [edge_function(v1, v2, p), edge_function(v2, v0, p), edge_function(v0, v1, p)];
    }

    /// Barycentric weights from edge values. Sum to 1 for any point.
    pub fn weights(&self, edges: [f32; 3]) -> [f32; 3] {
        return edges.map(|e| e / self.area);
    }

    /// Perspective correct attributes under the given screen space weights.
    ///
    /// Depth is affine in screen space and blended directly. Every other attribute is divided by
    /// its vertex w, blended, and multiplied with the interpolated w.
    pub fn interpolate(&self, weights: [f32; 3]) -> Fragment {
        let [v0, v1, v2] = self.vertices;
        let depth = blend([v0.position.z, v1.position.z, v2.position.z], weights);
        let inverse_w = weights[0] / v0.position.w + weights[1] / v1.position.w + weights[2] / v2.position.w;
        let w = 1.0 / inverse_w;
        let factors = [
            weights[0] / v0.position.w * w,
            weights[1] / v1.position.w * w,
            weights[2] / v2.position.w * w,
        ];

        return Fragment {
            depth,
            color: blend([v0.color, v1.color, v2.color], factors),
            uv: blend([v0.uv, v1.uv, v2.uv], factors),
            normal: blend([v0.normal, v1.normal, v2.normal], factors),
            tangent: blend([v0.tangent, v1.tangent, v2.tangent], factors),
            view_direction: blend([v0.view_direction, v1.view_direction, v2.view_direction], factors),
        };
    }
}

/// Assembles, filters and sets up every triangle of a mesh, appending them to `out`.
pub fn setup_triangles(
    transformed: &[PostTransformVertex],
    indices: &[u32],
    topology: Topology,
    width: u32,
    height: u32,
    material: usize,
    out: &mut Vec<TriangleSetup>,
) {
    for triangle in topology.triangles(indices) {
        // Indices were validated against the vertex count when the mesh was created.
        let vertices = triangle.map(|index| transformed[index as usize]);
        if let Some(setup) = TriangleSetup::new(vertices, width, height, material) {
            out.push(setup);
        }
    }
}

/// Renders every triangle of the job that overlaps the tile. Returns the number of fragments written.
pub fn rasterize_tile(tile: &mut Tile, job: &FrameJob) -> usize {
    let rect = tile.rect();
    let settings = &job.settings;
    let mut written = 0;

    for triangle in &job.triangles {
        let min_x = triangle.bbox.min_x.max(rect.x);
        let min_y = triangle.bbox.min_y.max(rect.y);
        let max_x = triangle.bbox.max_x.min(rect.x + rect.width);
        let max_y = triangle.bbox.max_y.min(rect.y + rect.height);
        if min_x >= max_x || min_y >= max_y {
            continue;
        }

        if settings.show_bounding_boxes {
            for y in min_y..max_y {
                for x in min_x..max_x {
                    tile.paint(x, y, BOUNDING_BOX_COLOR);
                }
            }
            continue;
        }

        let material = &job.materials[triangle.material];
        for y in min_y..max_y {
            for x in min_x..max_x {
                let pixel_center = vector![x as f32 + 0.5, y as f32 + 0.5];
                let edges = triangle.edge_values(pixel_center);
                if !settings.cull_mode.is_inside(edges) {
                    continue;
                }

                let fragment = triangle.interpolate(triangle.weights(edges));
                if !tile.passes_depth_test(x, y, fragment.depth) {
                    continue;
                }
                if let Some(color) = material.shade(&fragment, &job.lighting, settings) {
                    tile.write(x, y, fragment.depth, color);
                    written += 1;
                }
            }
        }
    }

    return written;
}
