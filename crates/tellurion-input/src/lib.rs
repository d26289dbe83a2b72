//! Pointer input and the orbit camera controller.
//!
//! [`MouseState`] accumulates winit events into frame-coherent state;
//! [`OrbitController`] turns drag and scroll input into a damped orbit
//! around the scene origin.

mod mouse;
mod orbit;

pub use mouse::MouseState;
pub use orbit::{OrbitController, OrbitParams};
