use std::sync::Arc;

use nalgebra as na;
use na::{vector, Matrix4, Rotation3, Vector2, Vector3};

use super::shader::Material;
use super::transform::PostTransformVertex;
use super::util::ColorRGB;
use crate::error::{RenderError, Result};

/// Mesh space vertex as it comes from the loader.
#[derive(Debug, Clone, Copy, Default)]
pub struct Vertex {
    pub position: Vector3<f32>,
    pub normal: Vector3<f32>,
    pub tangent: Vector3<f32>,
    pub uv: Vector2<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Topology {
    TriangleList,
    TriangleStrip,
}

impl Topology {
    /// Splits an index buffer into triangles.
    ///
    /// Lists advance by 3 indices. Strips advance by 1 and swap the last two vertices of every odd
    /// triangle so all of them keep the same winding; strip triangles that repeat an index carry
    /// no area and are dropped.
    pub fn triangles(self, indices: &[u32]) -> Vec<[u32; 3]> {
        match self {
            Topology::TriangleList => {
                return indices.chunks_exact(3).map(|t| [t[0], t[1], t[2]]).collect();
            }
            Topology::TriangleStrip => {
                let mut triangles = Vec::with_capacity(indices.len().saturating_sub(2));
                for i in 0..indices.len().saturating_sub(2) {
                    let mut triangle = [indices[i], indices[i + 1], indices[i + 2]];
                    if i % 2 == 1 {
                        triangle.swap(1, 2);
                    }
                    if triangle[0] == triangle[1] || triangle[1] == triangle[2] || triangle[0] == triangle[2] {
                        continue;
                    }
                    triangles.push(triangle);
                }
                return triangles;
            }
        }
    }
}

/// Fails on the first index that doesn't reference one of `vertex_count` vertices.
pub fn validate_indices(indices: &[u32], vertex_count: usize) -> Result<()> {
    if let Some(position) = indices.iter().position(|&index| index as usize >= vertex_count) {
        return Err(RenderError::IndexOutOfRange {
            position,
            index: indices[position],
            vertex_count,
        });
    }
    return Ok(());
}

/// Typed index into the scene mesh arena.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MeshHandle(pub(crate) usize);

/// Indexed triangle mesh with its material and world placement.
///
/// Vertex and index buffers are immutable and shared with worker threads. The world transform is
/// kept as separate scale, rotation and translation, composed on read in that order.
pub struct Mesh {
    vertices: Arc<Vec<Vertex>>,
    indices: Arc<Vec<u32>>,
    topology: Topology,
    material: Arc<Material>,
    pub base_color: ColorRGB,
    pub visible: bool,
    scale: Matrix4<f32>,
    rotation: Matrix4<f32>,
    translation: Matrix4<f32>,
    // Output of the vertex transformer for the current frame, replaced every frame.
    transformed: Arc<Vec<PostTransformVertex>>,
}

impl Mesh {
    /// Creates a mesh, rejecting index buffers that reference missing vertices.
    pub fn new(vertices: Vec<Vertex>, indices: Vec<u32>, topology: Topology, material: Arc<Material>) -> Result<Self> {
        validate_indices(&indices, vertices.len())?;
        if topology == Topology::TriangleList && indices.len() % 3 != 0 {
            return Err(RenderError::IncompleteTriangleList { index_count: indices.len() });
        }

        return Ok(Self {
            vertices: Arc::new(vertices),
            indices: Arc::new(indices),
            topology,
            material,
            base_color: vector![1.0, 1.0, 1.0],
            visible: true,
            scale: Matrix4::identity(),
            rotation: Matrix4::identity(),
            translation: Matrix4::identity(),
            transformed: Arc::new(Vec::new()),
        });
    }

    pub fn vertices(&self) -> &Arc<Vec<Vertex>> {
        return &self.vertices;
    }

    pub fn indices(&self) -> &[u32] {
        return &self.indices[..];
    }

    pub fn topology(&self) -> Topology {
        return self.topology;
    }

    pub fn material(&self) -> &Arc<Material> {
        return &self.material;
    }

    /// World matrix, scale applied first, then rotation, then translation.
    pub fn world_matrix(&self) -> Matrix4<f32> {
        return self.translation * self.rotation * self.scale;
    }

    pub fn set_translation(&mut self, translation: Vector3<f32>) {
        self.translation = Matrix4::new_translation(&translation);
    }

    pub fn set_rotation_y(&mut self, angle: f32) {
        self.rotation = Rotation3::from_axis_angle(&Vector3::y_axis(), angle).to_homogeneous();
    }

    #[cfg(test)]
    pub fn set_scale(&mut self, scale: Vector3<f32>) {
        self.scale = Matrix4::new_nonuniform_scaling(&scale);
    }

    pub fn transformed(&self) -> &Arc<Vec<PostTransformVertex>> {
        return &self.transformed;
    }

    pub fn set_transformed(&mut self, transformed: Vec<PostTransformVertex>) {
        self.transformed = Arc::new(transformed);
    }
}
