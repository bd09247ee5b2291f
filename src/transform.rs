//! 4x4 transform construction over [`glam::Mat4`].
//!
//! All matrices are column-major `f32`, the layout the renderer uploads directly.
//! Every function returns a new value; nothing mutates its inputs, so snapshots held on
//! the interpreter's stack can never alias the working register.

use glam::{Mat4, Vec3};

/// The identity transform.
pub fn identity() -> Mat4 {
    Mat4::IDENTITY
}

/// Standard matrix product `a * b` (apply `b` first, then `a`).
pub fn multiply(a: Mat4, b: Mat4) -> Mat4 {
    a * b
}

/// Translation by `(x, y, z)`.
pub fn translate(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_translation(Vec3::new(x, y, z))
}

/// Per-axis scale.
pub fn scale(x: f32, y: f32, z: f32) -> Mat4 {
    Mat4::from_scale(Vec3::new(x, y, z))
}

/// Right-handed rotation about X by `rad` radians.
pub fn rotate_x(rad: f32) -> Mat4 {
    Mat4::from_rotation_x(rad)
}

/// Right-handed rotation about Y by `rad` radians.
pub fn rotate_y(rad: f32) -> Mat4 {
    Mat4::from_rotation_y(rad)
}

/// Right-handed rotation about Z by `rad` radians.
pub fn rotate_z(rad: f32) -> Mat4 {
    Mat4::from_rotation_z(rad)
}

/// Right-handed perspective projection into OpenGL clip space (`z` in `[-1, 1]`).
pub fn perspective(fovy: f32, aspect: f32, near: f32, far: f32) -> Mat4 {
    Mat4::perspective_rh_gl(fovy, aspect, near, far)
}

/// Applies the affine part of `m` to `p` (w = 1, no perspective divide).
pub fn transform_point(m: &Mat4, p: Vec3) -> Vec3 {
    m.transform_point3(p)
}
