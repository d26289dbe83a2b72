//! Flat-arena scene graph with parent/child transform chaining.

use glam::Mat4;

use crate::node::{Node, NodeId, NodeKind};

/// A scene graph stored as a flat arena of nodes.
///
/// Nodes are only ever appended; the Earth-Moon scene is assembled once at
/// startup and its topology never changes afterwards. Parents must be
/// inserted before their children, which the arena enforces by construction
/// (a parent `NodeId` can only come from a prior insert).
#[derive(Debug, Default)]
pub struct SceneGraph {
    nodes: Vec<Node>,
}

impl SceneGraph {
    /// Create an empty graph.
    pub fn new() -> Self {
        Self { nodes: Vec::new() }
    }

    /// Insert a node and return its id.
    pub fn insert(
        &mut self,
        name: &'static str,
        kind: NodeKind,
        parent: Option<NodeId>,
        translation: glam::Vec3,
    ) -> NodeId {
        if let Some(parent) = parent {
            assert!(parent.0 < self.nodes.len(), "parent node does not exist");
        }
        let id = NodeId(self.nodes.len());
        self.nodes.push(Node {
            kind,
            parent,
            name,
            translation,
            rotation_y: 0.0,
        });
        id
    }

    /// Number of nodes in the graph.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the graph is empty.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Borrow a node.
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    /// Set a node's rotation about +Y, radians.
    pub fn set_rotation_y(&mut self, id: NodeId, angle: f64) {
        self.nodes[id.0].rotation_y = angle;
    }

    /// Iterate over `(id, node)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (NodeId, &Node)> {
        self.nodes.iter().enumerate().map(|(i, n)| (NodeId(i), n))
    }

    /// World transform of a node: the product of local matrices from the root
    /// down to the node.
    pub fn world_matrix(&self, id: NodeId) -> Mat4 {
        let node = &self.nodes[id.0];
        let local = node.local_matrix();
        match node.parent {
            Some(parent) => self.world_matrix(parent) * local,
            None => local,
        }
    }

    /// Ids of all direct children of `parent`.
    pub fn children_of(&self, parent: NodeId) -> Vec<NodeId> {
        self.iter()
            .filter(|(_, n)| n.parent == Some(parent))
            .map(|(id, _)| id)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    #[test]
    fn test_insert_assigns_sequential_ids() {
        let mut graph = SceneGraph::new();
        let a = graph.insert("a", NodeKind::Body, None, Vec3::ZERO);
        let b = graph.insert("b", NodeKind::Pivot, None, Vec3::ZERO);
        assert_eq!(a.index(), 0);
        assert_eq!(b.index(), 1);
        assert_eq!(graph.len(), 2);
    }

    #[test]
    fn test_child_inherits_parent_translation() {
        let mut graph = SceneGraph::new();
        let parent = graph.insert("parent", NodeKind::Pivot, None, Vec3::new(0.0, 5.0, 0.0));
        let child = graph.insert(
            "child",
            NodeKind::Body,
            Some(parent),
            Vec3::new(25.0, 0.0, 0.0),
        );
        let world = graph.world_matrix(child).transform_point3(Vec3::ZERO);
        assert!((world - Vec3::new(25.0, 5.0, 0.0)).length() < 1e-5);
    }

    #[test]
    fn test_pivot_rotation_revolves_child() {
        // The Moon arrangement: a pivot at the origin, the child offset +X.
        // Rotating the pivot a quarter turn carries the child to -Z.
        let mut graph = SceneGraph::new();
        let pivot = graph.insert("pivot", NodeKind::Pivot, None, Vec3::ZERO);
        let moon = graph.insert(
            "moon",
            NodeKind::Body,
            Some(pivot),
            Vec3::new(25.0, 0.0, 0.0),
        );

        graph.set_rotation_y(pivot, std::f64::consts::FRAC_PI_2);
        let world = graph.world_matrix(moon).transform_point3(Vec3::ZERO);
        assert!(
            (world - Vec3::new(0.0, 0.0, -25.0)).length() < 1e-4,
            "moon at {world:?}, expected (0, 0, -25)"
        );
        // Distance from the pivot is preserved.
        assert!((world.length() - 25.0).abs() < 1e-4);
    }

    #[test]
    fn test_child_rotation_does_not_move_child() {
        // Self-spin: rotating the child itself leaves its center in place.
        let mut graph = SceneGraph::new();
        let pivot = graph.insert("pivot", NodeKind::Pivot, None, Vec3::ZERO);
        let moon = graph.insert(
            "moon",
            NodeKind::Body,
            Some(pivot),
            Vec3::new(25.0, 0.0, 0.0),
        );

        graph.set_rotation_y(moon, 1.234);
        let world = graph.world_matrix(moon).transform_point3(Vec3::ZERO);
        assert!((world - Vec3::new(25.0, 0.0, 0.0)).length() < 1e-4);
    }

    #[test]
    fn test_grandchild_chains_transforms() {
        let mut graph = SceneGraph::new();
        let root = graph.insert("root", NodeKind::Body, None, Vec3::new(1.0, 0.0, 0.0));
        let mid = graph.insert("mid", NodeKind::Pivot, Some(root), Vec3::new(0.0, 2.0, 0.0));
        let leaf = graph.insert("leaf", NodeKind::Body, Some(mid), Vec3::new(0.0, 0.0, 3.0));
        let world = graph.world_matrix(leaf).transform_point3(Vec3::ZERO);
        assert!((world - Vec3::new(1.0, 2.0, 3.0)).length() < 1e-5);
    }

    #[test]
    fn test_children_of() {
        let mut graph = SceneGraph::new();
        let earth = graph.insert("earth", NodeKind::Body, None, Vec3::ZERO);
        let clouds = graph.insert("clouds", NodeKind::Body, Some(earth), Vec3::ZERO);
        let pivot = graph.insert("pivot", NodeKind::Pivot, None, Vec3::ZERO);
        assert_eq!(graph.children_of(earth), vec![clouds]);
        assert!(graph.children_of(pivot).is_empty());
    }

    #[test]
    #[should_panic(expected = "parent node does not exist")]
    fn test_unknown_parent_rejected() {
        let mut graph = SceneGraph::new();
        graph.insert("orphan", NodeKind::Body, Some(NodeId(7)), Vec3::ZERO);
    }
}
