//! Rotation laws for Earth, clouds, and the Moon.
//!
//! Each angle is a pure function of the tick counter or the clock time,
//! wrapped to `[0, 2π)` where the consumer expects a bounded angle.

use std::f64::consts::TAU;

use crate::clock::SimClock;

/// Length of one Earth day in the simulation's day unit.
pub const EARTH_DAY: f64 = 1.0;
/// Length of one lunar month in days.
pub const MOON_MONTH: f64 = 27.32;
/// Divisor slowing Earth's self-rotation to one revolution per 1500 ticks.
pub const EARTH_SPIN_DIVISOR: f64 = 1500.0;
/// Divisor for the cloud layer; clouds complete a revolution in fewer ticks
/// than the surface, so they drift ahead of it.
pub const CLOUD_SPIN_DIVISOR: f64 = 850.0;
/// Scale applied to the lunar month for the pivot revolution rate.
pub const MOON_ORBIT_SCALE: f64 = 100.0;
/// Moon self-rotation increment per tick, in radians.
pub const MOON_SPIN_STEP: f64 = 0.001;

/// Earth's self-rotation angle after `ticks` ticks, in `[0, 2π)`.
pub fn earth_spin_angle(ticks: u64) -> f64 {
    (ticks as f64 * TAU / (EARTH_DAY * EARTH_SPIN_DIVISOR)).rem_euclid(TAU)
}

/// Cloud-layer rotation angle after `ticks` ticks, in `[0, 2π)`.
pub fn cloud_spin_angle(ticks: u64) -> f64 {
    (ticks as f64 * TAU / (EARTH_DAY * CLOUD_SPIN_DIVISOR)).rem_euclid(TAU)
}

/// Moon-pivot revolution angle for the given clock `time`, in `[0, 2π)`.
///
/// Recomputed from the accumulated clock each tick rather than summed per
/// frame. The 0.1-per-tick clock step folds into the effective rate, so the
/// apparent period differs from a naive per-tick monthly rate by a factor of
/// ten; that scaling is intentional and load-bearing for the visual pacing.
pub fn moon_pivot_angle(time: f64) -> f64 {
    (TAU * time / (MOON_MONTH * MOON_ORBIT_SCALE)).rem_euclid(TAU)
}

/// Moon self-rotation angle after `ticks` ticks. Unbounded; the transform
/// consumes it modulo a full turn.
pub fn moon_spin_angle(ticks: u64) -> f64 {
    ticks as f64 * MOON_SPIN_STEP
}

/// Rotation angles for every animated scene node, in radians.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RotationAngles {
    /// Earth self-rotation about +Y.
    pub earth: f64,
    /// Cloud-layer rotation about +Y (relative to Earth's node).
    pub clouds: f64,
    /// Moon-pivot revolution about +Y.
    pub moon_pivot: f64,
    /// Moon self-rotation about +Y.
    pub moon_spin: f64,
}

impl RotationAngles {
    /// Compute all angles for the given clock position.
    pub fn at(clock: &SimClock) -> Self {
        Self {
            earth: earth_spin_angle(clock.ticks()),
            clouds: cloud_spin_angle(clock.ticks()),
            moon_pivot: moon_pivot_angle(clock.time()),
            moon_spin: moon_spin_angle(clock.ticks()),
        }
    }
}

/// Complete animation state: the clock plus the derived angles.
///
/// The state is advanced by [`stepped`](Self::stepped), a pure function, so a
/// driver can tick it once per frame while tests replay arbitrary histories.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct SimState {
    /// The animation clock.
    pub clock: SimClock,
    /// Angles derived from the clock.
    pub angles: RotationAngles,
}

impl SimState {
    /// Create the state at tick zero.
    pub fn new() -> Self {
        let clock = SimClock::new();
        Self {
            angles: RotationAngles::at(&clock),
            clock,
        }
    }

    /// The state one tick later. Pure; does not mutate `self`.
    pub fn stepped(&self) -> Self {
        let mut clock = self.clock;
        clock.tick();
        Self {
            angles: RotationAngles::at(&clock),
            clock,
        }
    }

    /// Advance in place by one tick.
    pub fn advance(&mut self) {
        *self = self.stepped();
    }
}
