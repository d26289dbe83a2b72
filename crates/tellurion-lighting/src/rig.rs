//! Directional lights and the fixed three-light rig.
//!
//! The scene is lit by a main "sun" directional light from +X, a cool rim
//! light from −X for silhouette depth, and a dim ambient fill. The CPU-side
//! structs here pack into a single std140 uniform written once at startup.

use bytemuck::{Pod, Zeroable};

/// CPU-side directional light description.
///
/// The direction points FROM the light toward the scene, i.e. the direction
/// the photons travel.
#[derive(Clone, Debug)]
pub struct DirectionalLight {
    /// Normalized travel direction of the light.
    pub direction: glam::Vec3,
    /// Linear RGB color (not premultiplied by intensity).
    pub color: glam::Vec3,
    /// Scalar intensity multiplier.
    pub intensity: f32,
}

impl DirectionalLight {
    /// Create a light shining from `position` toward the origin.
    pub fn from_position(position: glam::Vec3, color: glam::Vec3, intensity: f32) -> Self {
        Self {
            direction: (-position).normalize(),
            color,
            intensity,
        }
    }

    /// Set the light direction, normalizing the input.
    ///
    /// # Panics
    ///
    /// Panics if the input vector has near-zero length.
    pub fn set_direction(&mut self, dir: glam::Vec3) {
        let len = dir.length();
        assert!(len > 1e-6, "directional light direction must not be zero");
        self.direction = dir / len;
    }
}

/// The complete light rig: sun, rim, and ambient fill.
#[derive(Clone, Debug)]
pub struct LightRig {
    /// Main light. Casts the shadow map.
    pub sun: DirectionalLight,
    /// Cool back light opposite the sun. No shadows.
    pub rim: DirectionalLight,
    /// Ambient fill color (linear RGB).
    pub ambient: glam::Vec3,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            // Sun at +X shining toward the origin.
            sun: DirectionalLight::from_position(
                glam::Vec3::new(50.0, 0.0, 0.0),
                glam::Vec3::ONE,
                2.0,
            ),
            // Rim from the opposite side, steel blue (0x335577).
            rim: DirectionalLight::from_position(
                glam::Vec3::new(-50.0, 0.0, 0.0),
                glam::Vec3::new(0.2, 0.333, 0.467),
                0.25,
            ),
            // Near-black fill (0x111111).
            ambient: glam::Vec3::splat(0.067),
        }
    }
}

impl LightRig {
    /// Build the GPU-side uniform from this rig.
    pub fn to_uniform(&self) -> LightRigUniform {
        LightRigUniform {
            sun_direction_intensity: [
                self.sun.direction.x,
                self.sun.direction.y,
                self.sun.direction.z,
                self.sun.intensity,
            ],
            sun_color: [self.sun.color.x, self.sun.color.y, self.sun.color.z, 0.0],
            rim_direction_intensity: [
                self.rim.direction.x,
                self.rim.direction.y,
                self.rim.direction.z,
                self.rim.intensity,
            ],
            rim_color: [self.rim.color.x, self.rim.color.y, self.rim.color.z, 0.0],
            ambient_color: [self.ambient.x, self.ambient.y, self.ambient.z, 0.0],
        }
    }
}

/// GPU-side light rig, 80 bytes, std140-compatible.
#[repr(C)]
#[derive(Clone, Copy, Debug, Pod, Zeroable)]
pub struct LightRigUniform {
    /// xyz = sun travel direction (normalized), w = intensity.
    pub sun_direction_intensity: [f32; 4],
    /// xyz = sun color (linear RGB), w = padding.
    pub sun_color: [f32; 4],
    /// xyz = rim travel direction (normalized), w = intensity.
    pub rim_direction_intensity: [f32; 4],
    /// xyz = rim color (linear RGB), w = padding.
    pub rim_color: [f32; 4],
    /// xyz = ambient fill color, w = padding.
    pub ambient_color: [f32; 4],
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_position_points_at_origin() {
        let light =
            DirectionalLight::from_position(glam::Vec3::new(50.0, 0.0, 0.0), glam::Vec3::ONE, 2.0);
        assert!((light.direction - glam::Vec3::NEG_X).length() < 1e-6);
    }

    #[test]
    fn test_default_rig_directions_oppose() {
        let rig = LightRig::default();
        let dot = rig.sun.direction.dot(rig.rim.direction);
        assert!(
            (dot + 1.0).abs() < 1e-5,
            "sun and rim should be antiparallel, dot = {dot}"
        );
    }

    #[test]
    fn test_default_intensities() {
        let rig = LightRig::default();
        assert_eq!(rig.sun.intensity, 2.0);
        assert_eq!(rig.rim.intensity, 0.25);
    }

    #[test]
    fn test_rim_is_cool_toned() {
        let rig = LightRig::default();
        assert!(
            rig.rim.color.z > rig.rim.color.x,
            "rim blue ({}) should exceed red ({})",
            rig.rim.color.z,
            rig.rim.color.x
        );
    }

    #[test]
    fn test_ambient_is_dim() {
        let rig = LightRig::default();
        assert!(rig.ambient.max_element() < 0.1);
        assert!(rig.ambient.min_element() > 0.0);
    }

    #[test]
    fn test_set_direction_normalizes() {
        let mut light = LightRig::default().sun;
        light.set_direction(glam::Vec3::new(3.0, -4.0, 0.0));
        assert!((light.direction.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    #[should_panic(expected = "must not be zero")]
    fn test_zero_direction_panics() {
        let mut light = LightRig::default().sun;
        light.set_direction(glam::Vec3::ZERO);
    }

    #[test]
    fn test_uniform_layout_matches_shader() {
        // Five vec4<f32> fields: 80 bytes with fixed offsets.
        assert_eq!(std::mem::size_of::<LightRigUniform>(), 80);
        assert_eq!(
            std::mem::offset_of!(LightRigUniform, sun_direction_intensity),
            0
        );
        assert_eq!(std::mem::offset_of!(LightRigUniform, sun_color), 16);
        assert_eq!(
            std::mem::offset_of!(LightRigUniform, rim_direction_intensity),
            32
        );
        assert_eq!(std::mem::offset_of!(LightRigUniform, rim_color), 48);
        assert_eq!(std::mem::offset_of!(LightRigUniform, ambient_color), 64);
    }

    #[test]
    fn test_to_uniform_packs_correctly() {
        let rig = LightRig::default();
        let u = rig.to_uniform();
        assert!((u.sun_direction_intensity[0] - (-1.0)).abs() < 1e-6);
        assert!((u.sun_direction_intensity[3] - 2.0).abs() < 1e-6);
        assert!((u.rim_direction_intensity[0] - 1.0).abs() < 1e-6);
        assert!((u.rim_direction_intensity[3] - 0.25).abs() < 1e-6);
        assert!((u.ambient_color[0] - 0.067).abs() < 1e-6);
        assert_eq!(u.sun_color[3], 0.0);
    }
}
