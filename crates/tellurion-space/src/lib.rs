//! Starfield: deterministic point-cloud generation and GPU rendering.

mod renderer;
mod starfield;

pub use renderer::{STAR_OPACITY, StarfieldRenderer};
pub use starfield::{StarPoint, StarfieldGenerator, hsl_to_rgb};
