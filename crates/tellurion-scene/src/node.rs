//! Typed scene graph nodes.

use glam::{Mat4, Vec3};

/// Index of a node in its [`SceneGraph`](crate::SceneGraph) arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    /// The underlying arena index.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// What a scene node renders as.
///
/// Transform chaining is identical for every kind; the renderer decides what
/// to draw. A `Pivot` draws nothing, it exists so a child placed at an offset
/// revolves around the pivot's origin when the pivot rotates.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeKind {
    /// A textured sphere (Earth, Clouds, Moon).
    Body,
    /// An invisible transform-only node.
    Pivot,
    /// A point-list mesh (the starfield).
    PointCloud,
}

/// A single scene node: a kind, a parent link, and a local transform.
///
/// The local transform is a Y-axis rotation followed by a translation, which
/// covers every motion in this scene (self-spin and revolution both happen
/// about +Y).
#[derive(Clone, Debug)]
pub struct Node {
    /// What this node renders as.
    pub kind: NodeKind,
    /// Parent node, or `None` for roots.
    pub parent: Option<NodeId>,
    /// Debug name, also used to look nodes up in tests.
    pub name: &'static str,
    /// Local translation relative to the parent.
    pub translation: Vec3,
    /// Local rotation about +Y, radians.
    pub rotation_y: f64,
}

impl Node {
    /// Local transform matrix: `translation * rotation`.
    ///
    /// Rotation is applied before translation, so a node spins about its own
    /// center and a pivot's child orbits the pivot's origin.
    pub fn local_matrix(&self) -> Mat4 {
        Mat4::from_translation(self.translation) * Mat4::from_rotation_y(self.rotation_y as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identity_local_matrix() {
        let node = Node {
            kind: NodeKind::Pivot,
            parent: None,
            name: "pivot",
            translation: Vec3::ZERO,
            rotation_y: 0.0,
        };
        assert_eq!(node.local_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn test_rotation_applies_before_translation() {
        // A node translated +X and rotated 90 degrees still sits at +X: the
        // rotation spins the node in place, it does not move the origin.
        let node = Node {
            kind: NodeKind::Body,
            parent: None,
            name: "body",
            translation: Vec3::new(25.0, 0.0, 0.0),
            rotation_y: std::f64::consts::FRAC_PI_2,
        };
        let origin = node.local_matrix().transform_point3(Vec3::ZERO);
        assert!((origin - Vec3::new(25.0, 0.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_rotation_turns_local_axes() {
        let node = Node {
            kind: NodeKind::Body,
            parent: None,
            name: "body",
            translation: Vec3::ZERO,
            rotation_y: std::f64::consts::FRAC_PI_2,
        };
        // +X rotates into -Z after a quarter turn about +Y.
        let x_axis = node.local_matrix().transform_vector3(Vec3::X);
        assert!((x_axis - Vec3::NEG_Z).length() < 1e-5);
    }
}
