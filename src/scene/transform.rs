use nalgebra as na;
use na::{Matrix4, Vector2, Vector3, Vector4};

use super::mesh::Vertex;
use super::util::{from_hom_point, from_hom_vector, perspective_divide, to_hom_point, to_hom_vector, ColorRGB};

/// Vertex after the vertex stage, everything the rasterizer interpolates.
#[derive(Debug, Clone, Copy, Default)]
pub struct PostTransformVertex {
    pub position: Vector4<f32>,       // x, y, z in NDC after the divide, w kept from clip space.
    pub world_position: Vector3<f32>,
    pub normal: Vector3<f32>,         // World space, normalized.
    pub tangent: Vector3<f32>,        // World space, normalized.
    pub uv: Vector2<f32>,
    pub view_direction: Vector3<f32>, // From the camera towards the vertex, normalized.
    pub color: ColorRGB,
}

/// Per mesh constants of the vertex stage.
#[derive(Debug, Clone, Copy)]
pub struct VertexTransform {
    pub world_view_projection: Matrix4<f32>,
    pub world: Matrix4<f32>,
    pub camera_origin: Vector3<f32>,
    pub base_color: ColorRGB,
}

impl VertexTransform {
    pub fn new(world: Matrix4<f32>, view_projection: Matrix4<f32>, camera_origin: Vector3<f32>, base_color: ColorRGB) -> Self {
        return Self {
            world_view_projection: view_projection * world,
            world,
            camera_origin,
            base_color,
        };
    }

    pub fn apply(&self, vertex: &Vertex) -> PostTransformVertex {
        let position = perspective_divide(self.world_view_projection * to_hom_point(vertex.position));
        // Directions only follow the world transform, projection would skew them.
        let normal = from_hom_vector(self.world * to_hom_vector(vertex.normal)).normalize();
        let tangent = from_hom_vector(self.world * to_hom_vector(vertex.tangent)).normalize();
        let world_position = from_hom_point(self.world * to_hom_point(vertex.position));
        let view_direction = (world_position - self.camera_origin).normalize();

        return PostTransformVertex {
            position,
            world_position,
            normal,
            tangent,
            uv: vertex.uv,
            view_direction,
            color: self.base_color,
        };
    }

    /// Transforms a run of vertices. Input is never modified.
    pub fn apply_all(&self, vertices: &[Vertex]) -> Vec<PostTransformVertex> {
        return vertices.iter().map(|vertex| self.apply(vertex)).collect();
    }
}
