//! Tellurion application shell.
//!
//! Window creation, event handling, per-frame driving of the simulation and
//! renderers, and platform directory resolution.

pub mod platform;
pub mod textures;
pub mod window;
