//! Frame orchestration over a worker pool.
//!
//! A frame runs in two parallel phases. Vertex transformation is split into chunks of vertices,
//! each one transformed by a pool job into its own output vector. Rasterization is split into
//! disjoint screen tiles, each one copied out of the frame buffer, rendered by exactly one job and
//! written back. Jobs only share immutable data (`Arc`), results come back over a channel, and the
//! main thread waits for every one of them before the frame is handed out.

use std::sync::mpsc::channel;
use std::sync::Arc;

use nalgebra::Vector3;
use threadpool::ThreadPool;

use super::buffer::FrameBuffer;
use super::camera::Camera;
use super::raster::{rasterize_tile, setup_triangles, FrameJob};
use super::settings::RenderSettings;
use super::transform::{PostTransformVertex, VertexTransform};
use super::util::{from_hom_point, to_hom_point, ColorRGB};
use super::Scene;
use crate::error::{RenderError, Result};

/// Vertices handed to a single transform job.
const VERTEX_CHUNK_SIZE: usize = 4096;

pub const DEFAULT_TILE_SIZE: u32 = 64;

pub struct Renderer {
    pool: ThreadPool,
    frame: FrameBuffer,
    tile_size: u32,
}

impl Renderer {
    pub fn new(width: u32, height: u32, threads: usize, tile_size: u32) -> Self {
        let threads = threads.max(1);
        log::info!("Renderer {}x{} with {} worker threads, {}px tiles", width, height, threads, tile_size);
        return Self {
            pool: ThreadPool::new(threads),
            frame: FrameBuffer::new(width, height),
            tile_size: tile_size.max(1),
        };
    }

    pub fn frame(&self) -> &FrameBuffer {
        return &self.frame;
    }

    /// Renders one frame of `scene` as seen by `camera`.
    ///
    /// `settings` is copied for the frame, so toggles changed while rendering only apply to the
    /// next one. On success the returned frame buffer is complete: every tile has been written.
    pub fn render(&mut self, scene: &mut Scene, camera: &Camera, settings: RenderSettings, clear_color: ColorRGB) -> Result<&FrameBuffer> {
        self.transform_vertices(scene, camera)?;

        let width = self.frame.width();
        let height = self.frame.height();
        let mut triangles = Vec::new();
        let mut materials = Vec::new();
        for mesh in scene.meshes().iter().filter(|mesh| mesh.visible) {
            setup_triangles(
                mesh.transformed(),
                mesh.indices(),
                mesh.topology(),
                width,
                height,
                materials.len(),
                &mut triangles,
            );
            materials.push(Arc::clone(mesh.material()));
        }
        log::debug!("{} triangles survived setup", triangles.len());

        let job = Arc::new(FrameJob {
            triangles,
            materials,
            lighting: scene.lighting,
            settings,
        });
        self.rasterize(job, clear_color)?;
        return Ok(&self.frame);
    }

    /// Runs the vertex stage for every visible mesh and stores the results on the meshes.
    fn transform_vertices(&mut self, scene: &mut Scene, camera: &Camera) -> Result<()> {
        let view_projection = camera.projection_matrix() * camera.view_matrix();
        // Eye position in world space, the translation of the camera-to-world transform.
        let eye = from_hom_point(camera.inverse_view_matrix() * to_hom_point(Vector3::zeros()));
        let (tx, rx) = channel();
        let mut expected = 0;

        for (mesh_index, mesh) in scene.meshes().iter().enumerate() {
            if !mesh.visible {
                continue;
            }
            let transform = VertexTransform::new(mesh.world_matrix(), view_projection, eye, mesh.base_color);
            let vertex_count = mesh.vertices().len();
            for start in (0..vertex_count).step_by(VERTEX_CHUNK_SIZE) {
                let end = (start + VERTEX_CHUNK_SIZE).min(vertex_count);
                let vertices = Arc::clone(mesh.vertices());
                let tx = tx.clone();
                self.pool.execute(move || {
                    let transformed = transform.apply_all(&vertices[start..end]);
                    if tx.send((mesh_index, start, transformed)).is_err() {
                        log::warn!("Transformed vertices {}..{} of mesh {} had no receiver", start, end, mesh_index);
                    }
                });
                expected += 1;
            }
        }
        // Only the jobs hold senders now, the loop below ends once all of them are done or gone.
        drop(tx);

        let mut outputs: Vec<Vec<PostTransformVertex>> = scene
            .meshes()
            .iter()
            .map(|mesh| {
                let count = if mesh.visible { mesh.vertices().len() } else { 0 };
                return vec![PostTransformVertex::default(); count];
            })
            .collect();
        let mut received = 0;
        for (mesh_index, start, transformed) in rx.iter() {
            outputs[mesh_index][start..start + transformed.len()].copy_from_slice(&transformed);
            received += 1;
        }
        if received != expected {
            return Err(RenderError::WorkerLost { expected, received });
        }

        for (mesh, transformed) in scene.meshes_mut().iter_mut().zip(outputs) {
            if mesh.visible {
                mesh.set_transformed(transformed);
            }
        }
        return Ok(());
    }

    /// Clears the frame and renders every tile of it on the pool.
    fn rasterize(&mut self, job: Arc<FrameJob>, clear_color: ColorRGB) -> Result<()> {
        self.frame.clear(clear_color);

        let (tx, rx) = channel();
        let tiles = self.frame.tiles(self.tile_size);
        let expected = tiles.len();
        for rect in tiles {
            let mut tile = self.frame.read_tile(rect);
            let job = Arc::clone(&job);
            let tx = tx.clone();
            self.pool.execute(move || {
                let written = rasterize_tile(&mut tile, &job);
                if tx.send((tile, written)).is_err() {
                    log::warn!("Tile at ({}, {}) had no receiver", rect.x, rect.y);
                }
            });
        }
        drop(tx);

        let mut received = 0;
        let mut fragments = 0;
        for (tile, written) in rx.iter() {
            self.frame.write_tile(&tile);
            fragments += written;
            received += 1;
        }
        if received != expected {
            return Err(RenderError::WorkerLost { expected, received });
        }
        log::debug!("{} tiles rendered, {} fragments written", received, fragments);
        return Ok(());
    }
}
