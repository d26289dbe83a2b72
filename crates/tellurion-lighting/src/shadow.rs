//! Sun shadow projection.
//!
//! One orthographic depth map covers the whole Earth-Moon system; the light
//! matrix projects world positions into it with the same reverse-Z
//! convention as the main camera.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec3};

/// GPU-side shadow uniform: the light-space view-projection matrix.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct ShadowUniform {
    pub light_view_proj: [[f32; 4]; 4],
}

/// Build the sun's shadow view-projection matrix.
///
/// `direction` is the sun's travel direction (normalized), `half_extent` the
/// half-width of the orthographic volume around the origin, and `distance`
/// how far back along the light direction the virtual eye sits. Near/far are
/// swapped for reverse-Z, matching the depth pipeline.
pub fn sun_shadow_matrix(direction: Vec3, half_extent: f32, distance: f32) -> Mat4 {
    let eye = -direction * distance;
    // Pick an up vector that cannot be parallel to the light direction.
    let up = if direction.y.abs() > 0.99 {
        Vec3::Z
    } else {
        Vec3::Y
    };
    let view = Mat4::look_at_rh(eye, Vec3::ZERO, up);
    let far = distance + half_extent;
    let near = (distance - half_extent).max(0.1);
    // Reverse-Z: far passed as "near", near as "far".
    let proj = Mat4::orthographic_rh(
        -half_extent,
        half_extent,
        -half_extent,
        half_extent,
        far,
        near,
    );
    proj * view
}

impl ShadowUniform {
    /// Pack a light matrix for GPU upload.
    pub fn new(light_view_proj: Mat4) -> Self {
        Self {
            light_view_proj: light_view_proj.to_cols_array_2d(),
        }
    }
}
