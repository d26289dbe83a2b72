//! Scene graph and celestial body rendering for the Earth-Moon system.
//!
//! The graph is a flat arena of typed nodes (bodies, pivots, point clouds)
//! with parent/child transform chaining. [`assemble`] builds the fixed
//! Earth / Clouds / Moon / starfield hierarchy once at startup; nothing is
//! added or removed afterwards.

mod bodies;
mod graph;
mod node;
mod renderer;

pub use bodies::{
    BodyParams, CLOUD_RADIUS, EARTH_RADIUS, EARTH_TESSELLATION, MaterialParams, MOON_ORBIT_OFFSET,
    MOON_RADIUS, MOON_TESSELLATION, SceneAssembly, TextureSet, assemble,
};
pub use graph::SceneGraph;
pub use node::{Node, NodeId, NodeKind};
pub use renderer::{SceneRenderer, SceneTextures};
