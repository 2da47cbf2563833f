use nalgebra as na;
use na::{matrix, vector, Matrix4, Vector3, Vector4};

/// Normalized rgb color, every channel is expected to be in [0.0, 1.0] after shading.
pub type ColorRGB = Vector3<f32>;

/// Transformation of a point to homogenous coordinates.
pub fn to_hom_point(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 1.0];
}

/// Transformation of a vector to homogenous coordinates.
pub fn to_hom_vector(v: Vector3<f32>) -> Vector4<f32> {
    return vector![v.x, v.y, v.z, 0.0];
}

/// Perspective divide, keeping w in the last component so it can be used for
/// perspective correct interpolation later on.
pub fn perspective_divide(v: Vector4<f32>) -> Vector4<f32> {
    return vector![v.x / v.w, v.y / v.w, v.z / v.w, v.w];
}

/// Transformation of a point from homogenous coordinates.
pub fn from_hom_point(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x / v.w, v.y / v.w, v.z / v.w];
}

/// Transformation of a vector from homogenous coordinates.
pub fn from_hom_vector(v: Vector4<f32>) -> Vector3<f32> {
    return vector![v.x, v.y, v.z];
}

/// Left handed view matrix for a camera placed at `origin`, looking along `forward`.
/// Columns of the inverse are right, up, forward and origin.
pub fn look_at_lh(origin: Vector3<f32>, forward: Vector3<f32>, world_up: Vector3<f32>) -> Matrix4<f32> {
    let forward = forward.normalize();
    let right = world_up.cross(&forward).normalize();
    let up = forward.cross(&right);
    return matrix![right.x,   right.y,   right.z,   -right.dot(&origin);
                   up.x,      up.y,      up.z,      -up.dot(&origin);
                   forward.x, forward.y, forward.z, -forward.dot(&origin);
                   0.0,       0.0,       0.0,       1.0];
}

/// Left handed perspective projection mapping view space depth in [near, far] to [0, 1].
/// Clip space w equals view space z.
pub fn perspective_fov_lh(fov_y: f32, aspect_ratio: f32, near: f32, far: f32) -> Matrix4<f32> {
    let fov_ratio = (fov_y / 2.0).tan();
    let a = far / (far - near);
    let b = -(far * near) / (far - near);
    return matrix![1.0 / (aspect_ratio * fov_ratio), 0.0,             0.0, 0.0;
                   0.0,                              1.0 / fov_ratio, 0.0, 0.0;
                   0.0,                              0.0,             a,   b;
                   0.0,                              0.0,             1.0, 0.0];
}

/// Linear remap of `value` from [min, max] to [0, 1], clamped.
pub fn remap(value: f32, min: f32, max: f32) -> f32 {
    return ((value - min) / (max - min)).clamp(0.0, 1.0);
}

/// Packs a normalized color to rgb8, clamping every channel to [0, 1] first.
pub fn color_to_rgb8(color: ColorRGB) -> [u8; 3] {
    return [
        (color.x.clamp(0.0, 1.0) * 255.0) as u8,
        (color.y.clamp(0.0, 1.0) * 255.0) as u8,
        (color.z.clamp(0.0, 1.0) * 255.0) as u8,
    ];
}
