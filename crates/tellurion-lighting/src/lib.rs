//! Light rig for the Earth-Moon scene: sun and rim directional lights plus
//! ambient fill, with GPU uniform packing and the sun's shadow projection.

mod rig;
mod shadow;

pub use rig::{DirectionalLight, LightRig, LightRigUniform};
pub use shadow::{ShadowUniform, sun_shadow_matrix};
