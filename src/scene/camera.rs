use nalgebra as na;
use na::{vector, Matrix4, Vector3};

use super::util::{look_at_lh, perspective_fov_lh};

/// Fixed perspective camera in a left handed world, looking along +z with +y up.
///
/// Only the output contract is used by the renderer: view, projection, inverse view and origin.
/// All matrices are calculated once on creation.
pub struct Camera {
    origin: Vector3<f32>,
    view_matrix: Matrix4<f32>,
    inverse_view_matrix: Matrix4<f32>,
    projection_matrix: Matrix4<f32>,
}

impl Camera {
    pub fn new(origin: Vector3<f32>, fov_y_degrees: f32, aspect_ratio: f32, near: f32, far: f32) -> Self {
        let view_matrix = look_at_lh(origin, vector![0.0, 0.0, 1.0], vector![0.0, 1.0, 0.0]);
        return Self {
            origin,
            view_matrix,
            // The view matrix is a rigid transform, identity only stands in for a NaN origin.
            inverse_view_matrix: view_matrix.try_inverse().unwrap_or_else(Matrix4::identity),
            projection_matrix: perspective_fov_lh(fov_y_degrees.to_radians(), aspect_ratio, near, far),
        };
    }

    pub fn origin(&self) -> Vector3<f32> {
        return self.origin;
    }

    pub fn view_matrix(&self) -> Matrix4<f32> {
        return self.view_matrix;
    }

    pub fn projection_matrix(&self) -> Matrix4<f32> {
        return self.projection_matrix;
    }

    /// Camera-to-world transform. Its translation is the eye position.
    pub fn inverse_view_matrix(&self) -> Matrix4<f32> {
        return self.inverse_view_matrix;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::util::{from_hom_point, to_hom_point};

    #[test]
    fn inverse_view_returns_origin() {
        let camera = Camera::new(vector![3.0, -2.0, 7.0], 45.0, 1.0, 0.1, 100.0);
        let eye = from_hom_point(camera.inverse_view_matrix() * to_hom_point(vector![0.0, 0.0, 0.0]));
        assert!((eye - camera.origin()).norm() < 1e-4);
        let identity = camera.view_matrix() * camera.inverse_view_matrix();
        assert!((identity - Matrix4::identity()).norm() < 1e-5);
    }

    #[test]
    fn point_ahead_projects_to_center() {
        let camera = Camera::new(vector![0.0, 0.0, 0.0], 45.0, 4.0 / 3.0, 0.1, 100.0);
        let clip = camera.projection_matrix() * camera.view_matrix() * to_hom_point(vector![0.0, 0.0, 50.0]);
        let ndc = from_hom_point(clip);
        assert!(ndc.x.abs() < 1e-6 && ndc.y.abs() < 1e-6);
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
        assert!((clip.w - 50.0).abs() < 1e-4);
    }
}
