//! Perspective camera with reverse-Z projection.

use bytemuck::{Pod, Zeroable};
use glam::{Mat3, Mat4, Quat, Vec3};

/// Uniform buffer layout shared by every pipeline that needs the camera.
///
/// 96 bytes: mat4x4 view-projection, camera position, and packed parameters
/// (x = tone-mapping exposure).
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    pub camera_pos: [f32; 4],
    pub params: [f32; 4],
}

/// A camera that generates view and projection matrices for rendering.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Position in world space.
    pub position: Vec3,
    /// Rotation as a unit quaternion.
    pub rotation: Quat,
    /// Vertical field of view in radians.
    pub fov_y: f32,
    /// Width / height.
    pub aspect_ratio: f32,
    /// Near clip plane distance (always positive).
    pub near: f32,
    /// Far clip plane distance (always positive, > near).
    pub far: f32,
}

impl Camera {
    /// Compute the view matrix (inverse of the camera transform).
    pub fn view_matrix(&self) -> Mat4 {
        let rotation_matrix = Mat4::from_quat(self.rotation);
        let translation_matrix = Mat4::from_translation(self.position);
        (translation_matrix * rotation_matrix).inverse()
    }

    /// Compute the projection matrix with reverse-Z.
    ///
    /// Near and far are swapped so the near plane maps to z=1 and the far
    /// plane to z=0, keeping float precision for distant geometry (the
    /// starfield sits at ~1000 units).
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_y, self.aspect_ratio, self.far, self.near)
    }

    /// Compute the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// The forward direction vector (-Z in camera space).
    pub fn forward(&self) -> Vec3 {
        self.rotation * Vec3::NEG_Z
    }

    /// The up direction vector (+Y in camera space).
    pub fn up(&self) -> Vec3 {
        self.rotation * Vec3::Y
    }

    /// Update the aspect ratio after a window resize.
    pub fn set_aspect_ratio(&mut self, width: f32, height: f32) {
        if height > 0.0 {
            self.aspect_ratio = width / height;
        }
    }

    /// Orient the camera to look at `target` with +Y as up.
    pub fn look_at(&mut self, target: Vec3) {
        let forward = (target - self.position).normalize();
        let right = forward.cross(Vec3::Y).normalize();
        let camera_up = right.cross(forward).normalize();
        let rotation_mat = Mat3::from_cols(right, camera_up, -forward);
        self.rotation = Quat::from_mat3(&rotation_mat);
    }

    /// Convert the camera to a uniform suitable for GPU upload.
    pub fn to_uniform(&self, exposure: f32) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_projection_matrix().to_cols_array_2d(),
            camera_pos: [self.position.x, self.position.y, self.position.z, 1.0],
            params: [exposure, 0.0, 0.0, 0.0],
        }
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(0.0, 0.0, 50.0),
            rotation: Quat::IDENTITY,
            fov_y: 75.0_f32.to_radians(),
            aspect_ratio: 16.0 / 9.0,
            near: 0.1,
            far: 2000.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_fov_is_75_degrees() {
        let camera = Camera::default();
        assert!((camera.fov_y - 75.0_f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_default_clip_planes() {
        let camera = Camera::default();
        assert_eq!(camera.near, 0.1);
        assert_eq!(camera.far, 2000.0);
    }

    #[test]
    fn test_default_camera_fifty_units_out() {
        let camera = Camera::default();
        assert_eq!(camera.position, Vec3::new(0.0, 0.0, 50.0));
        // Identity rotation looks down -Z, toward the origin.
        let forward = camera.forward();
        assert!((forward.z + 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_set_aspect_ratio() {
        let mut camera = Camera::default();
        camera.set_aspect_ratio(1920.0, 1080.0);
        assert!((camera.aspect_ratio - 16.0 / 9.0).abs() < 1e-6);
        camera.set_aspect_ratio(800.0, 800.0);
        assert!((camera.aspect_ratio - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_set_aspect_ratio_ignores_zero_height() {
        let mut camera = Camera::default();
        let before = camera.aspect_ratio;
        camera.set_aspect_ratio(1920.0, 0.0);
        assert_eq!(camera.aspect_ratio, before);
    }

    #[test]
    fn test_view_matrix_inverse_is_camera_transform() {
        let mut camera = Camera {
            position: Vec3::new(10.0, 20.0, 30.0),
            ..Camera::default()
        };
        camera.look_at(Vec3::ZERO);
        let inv_view = camera.view_matrix().inverse();
        let reconstructed_pos = inv_view.col(3).truncate();
        assert!((reconstructed_pos - camera.position).length() < 1e-4);
    }

    #[test]
    fn test_look_at_points_forward_at_target() {
        let mut camera = Camera {
            position: Vec3::new(0.0, 0.0, 50.0),
            ..Camera::default()
        };
        camera.look_at(Vec3::ZERO);
        let forward = camera.forward();
        let expected = Vec3::NEG_Z;
        assert!((forward - expected).length() < 1e-5);
        // Up stays roughly +Y for a horizontal view.
        assert!(camera.up().y > 0.99);
    }

    #[test]
    fn test_look_at_from_offset_position() {
        let mut camera = Camera {
            position: Vec3::new(30.0, 40.0, 0.0),
            ..Camera::default()
        };
        camera.look_at(Vec3::ZERO);
        let forward = camera.forward();
        let expected = (Vec3::ZERO - camera.position).normalize();
        assert!((forward - expected).length() < 1e-5);
    }

    #[test]
    fn test_uniform_size_and_exposure() {
        assert_eq!(std::mem::size_of::<CameraUniform>(), 96);
        let camera = Camera::default();
        let uniform = camera.to_uniform(0.5);
        assert_eq!(uniform.params[0], 0.5);
        assert_eq!(uniform.camera_pos[2], 50.0);
    }

    #[test]
    fn test_view_projection_combines_correctly() {
        let camera = Camera::default();
        let vp = camera.view_projection_matrix();
        let expected = camera.projection_matrix() * camera.view_matrix();
        for col in 0..4 {
            for row in 0..4 {
                assert!(
                    (vp.col(col)[row] - expected.col(col)[row]).abs() < 1e-6,
                    "mismatch at col={col}, row={row}"
                );
            }
        }
    }
}
