pub mod buffer;
pub mod camera;
pub mod loader;
pub mod mesh;
pub mod raster;
pub mod renderer;
pub mod settings;
pub mod shader;
pub mod texture;
pub mod transform;
pub mod util;

use std::path::Path;
use std::sync::Arc;

use nalgebra as na;
use na::{vector, Vector3};

use crate::error::Result;
use loader::load_mesh;
use mesh::{Mesh, MeshHandle, Topology};
use shader::{EffectMaterial, LitMaterial, Material, SceneLighting};
use texture::Texture;

/// Where the default meshes are placed in the world.
pub const DEFAULT_MESH_POSITION: Vector3<f32> = vector![0.0, 0.0, 50.0];

/// Arena of meshes plus the scene wide lighting. Meshes are addressed by handles, so the
/// application can keep hold of "the vehicle" or "the fire" without borrowing the scene.
pub struct Scene {
    meshes: Vec<Mesh>,
    pub lighting: SceneLighting,
}

/// Handles to the meshes of the default scene.
#[derive(Debug, Clone, Copy)]
pub struct DefaultMeshes {
    pub vehicle: MeshHandle,
    pub effect: MeshHandle,
}

impl Scene {
    pub fn new(lighting: SceneLighting) -> Self {
        return Self {
            meshes: Vec::new(),
            lighting,
        };
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshHandle {
        self.meshes.push(mesh);
        return MeshHandle(self.meshes.len() - 1);
    }

    /// Handles only come from `add_mesh` and meshes are never removed, so a handle is always valid
    /// for the scene that made it.
    #[cfg(test)]
    pub fn mesh(&self, handle: MeshHandle) -> &Mesh {
        return &self.meshes[handle.0];
    }

    pub fn mesh_mut(&mut self, handle: MeshHandle) -> &mut Mesh {
        return &mut self.meshes[handle.0];
    }

    pub fn meshes(&self) -> &[Mesh] {
        return &self.meshes[..];
    }

    pub fn meshes_mut(&mut self) -> &mut [Mesh] {
        return &mut self.meshes[..];
    }

    /// Builds the demo scene from `asset_dir`: a lit, normal mapped vehicle and an unlit fire
    /// effect around it, both at the same place.
    pub fn load_default(asset_dir: &Path) -> Result<(Self, DefaultMeshes)> {
        let mut scene = Scene::new(SceneLighting::default());

        let load_texture = |name: &str| -> Result<Arc<Texture>> {
            return Ok(Arc::new(Texture::load(&asset_dir.join(name))?));
        };

        let vehicle_material = Material::Lit(LitMaterial {
            diffuse: load_texture("vehicle_diffuse.png")?,
            normal: load_texture("vehicle_normal.png")?,
            specular: load_texture("vehicle_specular.png")?,
            glossiness: load_texture("vehicle_gloss.png")?,
        });
        let (vertices, indices) = load_mesh(&asset_dir.join("vehicle.obj"))?;
        let mut vehicle = Mesh::new(vertices, indices, Topology::TriangleList, Arc::new(vehicle_material))?;
        vehicle.set_translation(DEFAULT_MESH_POSITION);

        let effect_material = Material::Effect(EffectMaterial {
            diffuse: load_texture("fireFX_diffuse.png")?,
        });
        let (vertices, indices) = load_mesh(&asset_dir.join("fireFX.obj"))?;
        let mut effect = Mesh::new(vertices, indices, Topology::TriangleList, Arc::new(effect_material))?;
        effect.set_translation(DEFAULT_MESH_POSITION);

        let handles = DefaultMeshes {
            vehicle: scene.add_mesh(vehicle),
            effect: scene.add_mesh(effect),
        };
        log::info!("Scene loaded from {} with {} meshes", asset_dir.display(), scene.meshes.len());
        return Ok((scene, handles));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};
    use super::mesh::Vertex;

    fn effect_mesh() -> Mesh {
        let texture = Arc::new(Texture::from_image(RgbImage::from_pixel(1, 1, Rgb([255, 255, 255]))));
        let material = Arc::new(Material::Effect(EffectMaterial { diffuse: texture }));
        return Mesh::new(vec![Vertex::default(); 3], vec![0, 1, 2], Topology::TriangleList, material).unwrap();
    }

    #[test]
    fn handles_address_their_mesh() {
        let mut scene = Scene::new(SceneLighting::default());
        let first = scene.add_mesh(effect_mesh());
        let second = scene.add_mesh(effect_mesh());
        assert_ne!(first, second);

        scene.mesh_mut(second).visible = false;
        assert!(scene.mesh(first).visible);
        assert!(!scene.mesh(second).visible);
        assert_eq!(scene.meshes().len(), 2);
    }

    #[test]
    fn missing_assets_are_reported() {
        let result = Scene::load_default(Path::new("this/directory/does/not/exist"));
        assert!(result.is_err());
    }
}
