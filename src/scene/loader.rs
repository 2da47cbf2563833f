use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use nalgebra as na;
use na::{vector, Vector3};
use obj::{load_obj, Obj, TexturedVertex};

use super::mesh::{validate_indices, Vertex};
use crate::error::Result;

/// Loads a triangulated OBJ file with positions, uvs and normals.
pub fn load_mesh(path: &Path) -> Result<(Vec<Vertex>, Vec<u32>)> {
    let (vertices, indices) = parse_mesh(BufReader::new(File::open(path)?))?;
    log::info!(
        "Loaded {} - {} vertices, {} indices",
        path.display(),
        vertices.len(),
        indices.len()
    );
    return Ok((vertices, indices));
}

/// Converts OBJ data to the left handed world: z is mirrored, so triangle winding is swapped to
/// keep faces pointing the same way. V is flipped since images are stored top row first.
/// Tangents are derived from uv directions.
pub fn parse_mesh<R: BufRead>(input: R) -> Result<(Vec<Vertex>, Vec<u32>)> {
    let model: Obj<TexturedVertex, u32> = load_obj(input)?;

    let mut vertices: Vec<Vertex> = model
        .vertices
        .iter()
        .map(|v| Vertex {
            position: vector![v.position[0], v.position[1], -v.position[2]],
            normal: vector![v.normal[0], v.normal[1], -v.normal[2]],
            tangent: Vector3::zeros(),
            uv: vector![v.texture[0], 1.0 - v.texture[1]],
        })
        .collect();
    let mut indices = model.indices;
    for triangle in indices.chunks_exact_mut(3) {
        triangle.swap(1, 2);
    }

    validate_indices(&indices, vertices.len())?;
    compute_tangents(&mut vertices, &indices);
    return Ok((vertices, indices));
}

/// Accumulates per triangle tangents (direction of increasing u) on the vertices and
/// orthogonalizes them against the vertex normal.
pub fn compute_tangents(vertices: &mut [Vertex], indices: &[u32]) {
    for triangle in indices.chunks_exact(3) {
        let [i0, i1, i2] = [triangle[0] as usize, triangle[1] as usize, triangle[2] as usize];
        let (v0, v1, v2) = (vertices[i0], vertices[i1], vertices[i2]);

        let edge_0 = v1.position - v0.position;
        let edge_1 = v2.position - v0.position;
        let diff_u = vector![v1.uv.x - v0.uv.x, v2.uv.x - v0.uv.x];
        let diff_v = vector![v1.uv.y - v0.uv.y, v2.uv.y - v0.uv.y];
        let determinant = diff_u.x * diff_v.y - diff_u.y * diff_v.x;
        if determinant.abs() < f32::EPSILON {
            // Degenerate uv mapping, this triangle doesn't say anything about the tangent.
            continue;
        }

        let tangent = (edge_0 * diff_v.y - edge_1 * diff_v.x) / determinant;
        vertices[i0].tangent += tangent;
        vertices[i1].tangent += tangent;
        vertices[i2].tangent += tangent;
    }

    for vertex in vertices.iter_mut() {
        let normal = vertex.normal;
        let rejected = vertex.tangent - normal * vertex.tangent.dot(&normal);
        vertex.tangent = match rejected.try_normalize(f32::EPSILON) {
            Some(tangent) => tangent,
            // No usable uv gradient, any direction perpendicular to the normal will do.
            None => normal.cross(&Vector3::y()).try_normalize(f32::EPSILON).unwrap_or_else(Vector3::x),
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "\
v 0 0 0
v 1 0 0
v 0 1 0
vt 0 0
vt 1 0
vt 0 1
vn 0 0 -1
f 1/1/1 2/2/1 3/3/1
";

    #[test]
    fn converts_to_left_handed() {
        let (vertices, indices) = parse_mesh(TRIANGLE_OBJ.as_bytes()).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(indices, vec![0, 2, 1]);
        assert_eq!(vertices[0].normal, vector![0.0, 0.0, 1.0]);
        assert_eq!(vertices[0].uv, vector![0.0, 1.0]);
        assert_eq!(vertices[1].uv, vector![1.0, 1.0]);
    }

    #[test]
    fn tangent_follows_u() {
        let (vertices, _) = parse_mesh(TRIANGLE_OBJ.as_bytes()).unwrap();
        for vertex in vertices {
            assert!((vertex.tangent - vector![1.0, 0.0, 0.0]).norm() < 1e-5);
            assert!(vertex.tangent.dot(&vertex.normal).abs() < 1e-5);
        }
    }

    #[test]
    fn tangent_falls_back_when_uvs_collapse() {
        let mut vertices = vec![
            Vertex { position: vector![0.0, 0.0, 0.0], normal: vector![0.0, 0.0, 1.0], ..Default::default() },
            Vertex { position: vector![1.0, 0.0, 0.0], normal: vector![0.0, 0.0, 1.0], ..Default::default() },
            Vertex { position: vector![0.0, 1.0, 0.0], normal: vector![0.0, 0.0, 1.0], ..Default::default() },
        ];
        compute_tangents(&mut vertices, &[0, 1, 2]);
        for vertex in vertices {
            assert!((vertex.tangent.norm() - 1.0).abs() < 1e-5);
            assert!(vertex.tangent.dot(&vertex.normal).abs() < 1e-5);
        }
    }
}
