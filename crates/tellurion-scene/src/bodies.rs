//! Celestial body parameters and one-shot scene assembly.

use glam::Vec3;

use tellurion_sim::RotationAngles;

use crate::graph::SceneGraph;
use crate::node::{NodeId, NodeKind};

/// Earth sphere radius in world units.
pub const EARTH_RADIUS: f32 = 10.0;
/// Cloud shell radius; slightly above the surface so the layers never z-fight.
pub const CLOUD_RADIUS: f32 = 10.2;
/// Moon sphere radius.
pub const MOON_RADIUS: f32 = 2.7;
/// Moon's fixed offset from the pivot along +X.
pub const MOON_ORBIT_OFFSET: f32 = 25.0;
/// Earth and cloud sphere tessellation (segments and rings).
pub const EARTH_TESSELLATION: u32 = 128;
/// Moon sphere tessellation.
pub const MOON_TESSELLATION: u32 = 64;

/// Phong-style material parameters for one body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MaterialParams {
    /// Specular exponent.
    pub shininess: f32,
    /// Strength of the bump perturbation derived from the height source.
    pub bump_scale: f32,
    /// Strength of the tangent-space normal map, where one is used.
    pub normal_scale: f32,
    /// Specular tint, linear RGB. The specular map modulates this per texel.
    pub specular_color: [f32; 3],
    /// Output alpha. Only the cloud shell is below 1.
    pub opacity: f32,
}

/// Texture slots a body samples from, keyed by texture-manager name.
///
/// `normal` and `specular` are optional; bodies without them shade from the
/// geometric normal and the flat specular tint.
#[derive(Clone, Copy, Debug)]
pub struct TextureSet {
    pub color: &'static str,
    pub normal: Option<&'static str>,
    pub specular: Option<&'static str>,
}

/// Everything needed to build one celestial body: geometry, material,
/// texture slots.
#[derive(Clone, Copy, Debug)]
pub struct BodyParams {
    pub radius: f32,
    pub segments: u32,
    pub rings: u32,
    pub material: MaterialParams,
    pub textures: TextureSet,
}

impl BodyParams {
    /// Earth: full texture set, ocean-tinted specular (0x444444).
    pub fn earth() -> Self {
        Self {
            radius: EARTH_RADIUS,
            segments: EARTH_TESSELLATION,
            rings: EARTH_TESSELLATION,
            material: MaterialParams {
                shininess: 25.0,
                bump_scale: 0.8,
                normal_scale: 0.85,
                specular_color: [0.267, 0.267, 0.267],
                opacity: 1.0,
            },
            textures: TextureSet {
                color: "earth-color",
                normal: Some("earth-normal"),
                specular: Some("earth-specular"),
            },
        }
    }

    /// Cloud shell: color map only, 35% opacity, drawn additively.
    pub fn clouds() -> Self {
        Self {
            radius: CLOUD_RADIUS,
            segments: EARTH_TESSELLATION,
            rings: EARTH_TESSELLATION,
            material: MaterialParams {
                shininess: 1.0,
                bump_scale: 0.0,
                normal_scale: 0.0,
                specular_color: [0.0, 0.0, 0.0],
                opacity: 0.35,
            },
            textures: TextureSet {
                color: "clouds",
                normal: None,
                specular: None,
            },
        }
    }

    /// Moon: one color map that doubles as the bump height source.
    pub fn moon() -> Self {
        Self {
            radius: MOON_RADIUS,
            segments: MOON_TESSELLATION,
            rings: MOON_TESSELLATION,
            material: MaterialParams {
                shininess: 5.0,
                bump_scale: 0.4,
                normal_scale: 0.0,
                specular_color: [0.1, 0.1, 0.1],
                opacity: 1.0,
            },
            textures: TextureSet {
                color: "moon",
                normal: None,
                specular: None,
            },
        }
    }
}

/// The assembled Earth-Moon scene: the graph plus ids of every animated node.
pub struct SceneAssembly {
    pub graph: SceneGraph,
    /// Earth body at the origin.
    pub earth: NodeId,
    /// Cloud shell, child of Earth.
    pub clouds: NodeId,
    /// Invisible pivot at the origin carrying the Moon.
    pub moon_pivot: NodeId,
    /// Moon body, child of the pivot at +X offset.
    pub moon: NodeId,
    /// Starfield point cloud.
    pub stars: NodeId,
}

/// Build the fixed scene hierarchy. Called once at startup; no node is added
/// or removed afterwards.
pub fn assemble() -> SceneAssembly {
    let mut graph = SceneGraph::new();

    let earth = graph.insert("earth", NodeKind::Body, None, Vec3::ZERO);
    let clouds = graph.insert("clouds", NodeKind::Body, Some(earth), Vec3::ZERO);
    let moon_pivot = graph.insert("moon-pivot", NodeKind::Pivot, None, Vec3::ZERO);
    let moon = graph.insert(
        "moon",
        NodeKind::Body,
        Some(moon_pivot),
        Vec3::new(MOON_ORBIT_OFFSET, 0.0, 0.0),
    );
    let stars = graph.insert("stars", NodeKind::PointCloud, None, Vec3::ZERO);

    log::info!("Scene assembled: {} nodes", graph.len());

    SceneAssembly {
        graph,
        earth,
        clouds,
        moon_pivot,
        moon,
        stars,
    }
}

impl SceneAssembly {
    /// Write the current animation angles into the graph.
    ///
    /// The cloud rotation is relative to Earth's node; the graph chains the
    /// transforms, so the shell's world rotation is the sum of both.
    pub fn apply_angles(&mut self, angles: &RotationAngles) {
        self.graph.set_rotation_y(self.earth, angles.earth);
        self.graph.set_rotation_y(self.clouds, angles.clouds);
        self.graph.set_rotation_y(self.moon_pivot, angles.moon_pivot);
        self.graph.set_rotation_y(self.moon, angles.moon_spin);
    }
}
