//! Damped orbit camera controller.
//!
//! Left-drag rotates around the origin, scroll zooms. Drag input lands in a
//! pending-delta pair; each frame applies a damping fraction of the pending
//! rotation and decays the remainder, so the camera keeps gliding briefly
//! after the pointer stops.

use glam::Vec2;

/// Radians of orbit per logical pixel of drag, before the rotate speed
/// multiplier.
const DRAG_RADIANS_PER_PIXEL: f32 = 0.008;

/// Zoom scale applied per scroll line: one line out multiplies the distance
/// by this factor's reciprocal.
const ZOOM_SCALE_PER_LINE: f32 = 0.95;

/// Pitch stops this far short of the poles to keep the view basis stable.
const POLE_MARGIN: f32 = 0.01;

/// Tuning parameters for the orbit controller.
#[derive(Clone, Copy, Debug)]
pub struct OrbitParams {
    /// Drag-to-rotate speed multiplier.
    pub rotate_speed: f32,
    /// Fraction of the pending rotation applied per frame, in `(0, 1]`.
    pub damping: f32,
    /// Minimum zoom distance.
    pub min_distance: f32,
    /// Maximum zoom distance.
    pub max_distance: f32,
}

impl Default for OrbitParams {
    fn default() -> Self {
        Self {
            rotate_speed: 0.5,
            damping: 0.05,
            min_distance: 20.0,
            max_distance: 100.0,
        }
    }
}

/// Orbit state: yaw/pitch/distance around the origin plus pending input.
#[derive(Clone, Debug)]
pub struct OrbitController {
    params: OrbitParams,
    yaw: f32,
    pitch: f32,
    distance: f32,
    pending_yaw: f32,
    pending_pitch: f32,
}

impl OrbitController {
    /// Create a controller at the given starting distance, clamped into the
    /// configured range. Starts on the +Z axis (yaw 0, pitch 0).
    pub fn new(params: OrbitParams, distance: f32) -> Self {
        Self {
            distance: distance.clamp(params.min_distance, params.max_distance),
            params,
            yaw: 0.0,
            pitch: 0.0,
            pending_yaw: 0.0,
            pending_pitch: 0.0,
        }
    }

    /// Feed a drag delta in logical pixels (left button held).
    pub fn apply_drag(&mut self, delta: Vec2) {
        let scale = DRAG_RADIANS_PER_PIXEL * self.params.rotate_speed;
        // Dragging right orbits the camera left around the scene; dragging
        // down tilts the view up.
        self.pending_yaw -= delta.x * scale;
        self.pending_pitch += delta.y * scale;
    }

    /// Feed scroll input in lines (positive = scroll up = zoom in).
    /// Zoom applies immediately; only rotation is damped.
    pub fn apply_scroll(&mut self, lines: f32) {
        if lines == 0.0 {
            return;
        }
        self.distance = (self.distance * ZOOM_SCALE_PER_LINE.powf(lines))
            .clamp(self.params.min_distance, self.params.max_distance);
    }

    /// Advance one frame: apply a damping fraction of the pending rotation
    /// and decay the rest.
    pub fn update(&mut self) {
        let damping = self.params.damping;
        self.yaw += self.pending_yaw * damping;
        self.pitch = (self.pitch + self.pending_pitch * damping).clamp(
            -std::f32::consts::FRAC_PI_2 + POLE_MARGIN,
            std::f32::consts::FRAC_PI_2 - POLE_MARGIN,
        );
        self.pending_yaw *= 1.0 - damping;
        self.pending_pitch *= 1.0 - damping;
    }

    /// Camera position on the orbit sphere around the origin.
    pub fn position(&self) -> glam::Vec3 {
        let (sin_yaw, cos_yaw) = self.yaw.sin_cos();
        let (sin_pitch, cos_pitch) = self.pitch.sin_cos();
        glam::Vec3::new(
            self.distance * cos_pitch * sin_yaw,
            self.distance * sin_pitch,
            self.distance * cos_pitch * cos_yaw,
        )
    }

    /// Current orbit azimuth, radians.
    pub fn yaw(&self) -> f32 {
        self.yaw
    }

    /// Current orbit elevation, radians.
    pub fn pitch(&self) -> f32 {
        self.pitch
    }

    /// Current distance from the origin.
    pub fn distance(&self) -> f32 {
        self.distance
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn controller() -> OrbitController {
        OrbitController::new(OrbitParams::default(), 50.0)
    }

    #[test]
    fn test_starts_on_positive_z() {
        let orbit = controller();
        let pos = orbit.position();
        assert!((pos - glam::Vec3::new(0.0, 0.0, 50.0)).length() < 1e-5);
    }

    #[test]
    fn test_position_stays_on_orbit_sphere() {
        let mut orbit = controller();
        orbit.apply_drag(Vec2::new(300.0, -150.0));
        for _ in 0..50 {
            orbit.update();
        }
        assert!((orbit.position().length() - orbit.distance()).abs() < 1e-3);
    }

    #[test]
    fn test_drag_rotation_scales_with_rotate_speed() {
        let slow_params = OrbitParams {
            rotate_speed: 0.5,
            ..OrbitParams::default()
        };
        let fast_params = OrbitParams {
            rotate_speed: 1.0,
            ..OrbitParams::default()
        };
        let mut slow = OrbitController::new(slow_params, 50.0);
        let mut fast = OrbitController::new(fast_params, 50.0);

        slow.apply_drag(Vec2::new(100.0, 0.0));
        fast.apply_drag(Vec2::new(100.0, 0.0));
        slow.update();
        fast.update();

        assert!((fast.yaw() - 2.0 * slow.yaw()).abs() < 1e-6);
    }

    #[test]
    fn test_pending_rotation_decays_under_damping() {
        let mut orbit = controller();
        orbit.apply_drag(Vec2::new(100.0, 0.0));

        orbit.update();
        let first_step = orbit.yaw();
        orbit.update();
        let second_step = orbit.yaw() - first_step;

        assert!(first_step.abs() > 0.0);
        // Each frame applies a shrinking share of the original drag.
        assert!(second_step.abs() < first_step.abs());

        // After many frames the motion has effectively stopped at the total.
        for _ in 0..400 {
            orbit.update();
        }
        let settled = orbit.yaw();
        orbit.update();
        assert!((orbit.yaw() - settled).abs() < 1e-6);
    }

    #[test]
    fn test_full_drag_eventually_lands() {
        // The damped series sums to the whole pending rotation.
        let mut orbit = controller();
        orbit.apply_drag(Vec2::new(-100.0, 0.0));
        let expected = 100.0 * DRAG_RADIANS_PER_PIXEL * 0.5;
        for _ in 0..1000 {
            orbit.update();
        }
        assert!(
            (orbit.yaw() - expected).abs() < 1e-3,
            "yaw {} != expected {expected}",
            orbit.yaw()
        );
    }

    #[test]
    fn test_zoom_is_clamped() {
        let mut orbit = controller();
        orbit.apply_scroll(1000.0);
        assert_eq!(orbit.distance(), 20.0);
        orbit.apply_scroll(-1000.0);
        assert_eq!(orbit.distance(), 100.0);
    }

    #[test]
    fn test_scroll_in_reduces_distance() {
        let mut orbit = controller();
        let before = orbit.distance();
        orbit.apply_scroll(2.0);
        assert!(orbit.distance() < before);
        assert!(orbit.distance() >= 20.0);
    }

    #[test]
    fn test_pitch_clamped_short_of_poles() {
        let mut orbit = controller();
        orbit.apply_drag(Vec2::new(0.0, 1e6));
        for _ in 0..500 {
            orbit.update();
        }
        assert!(orbit.pitch() < std::f32::consts::FRAC_PI_2);
        assert!(orbit.pitch() >= std::f32::consts::FRAC_PI_2 - 0.011);
        // The view basis stays well-defined: the position never reaches the
        // exact pole.
        let pos = orbit.position();
        assert!(pos.x.abs() + pos.z.abs() > 1e-3);
    }

    #[test]
    fn test_initial_distance_clamped() {
        let orbit = OrbitController::new(OrbitParams::default(), 500.0);
        assert_eq!(orbit.distance(), 100.0);
    }

    #[test]
    fn test_update_without_input_is_stable() {
        let mut orbit = controller();
        let before = orbit.position();
        for _ in 0..10 {
            orbit.update();
        }
        assert!((orbit.position() - before).length() < 1e-6);
    }
}
