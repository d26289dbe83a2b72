//! Animation clock and rotation laws for the Earth-Moon system.
//!
//! All rotation angles are pure functions of the tick counter or the
//! accumulated clock time, so any frame's state can be computed directly
//! without replaying the preceding frames.

mod clock;
mod rotation;

pub use clock::{SimClock, TIME_STEP};
pub use rotation::{
    CLOUD_SPIN_DIVISOR, EARTH_DAY, EARTH_SPIN_DIVISOR, MOON_MONTH, MOON_ORBIT_SCALE,
    MOON_SPIN_STEP, RotationAngles, SimState, cloud_spin_angle, earth_spin_angle, moon_pivot_angle,
    moon_spin_angle,
};
