use cgmath::{Matrix4, Vector3};
use log::{debug, trace};
use thiserror::Error;

use crate::gfx::geometry::{MIN_HEIGHT_SEGMENTS, MIN_WIDTH_SEGMENTS};

use super::{
    light::{ResolvedPointLight, SceneLighting},
    node::{identity, Node, NodeId, NodeKind},
};

/// Errors raised by scene graph operations
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("node {0} does not exist in this scene")]
    UnknownNode(NodeId),
    #[error("the scene root cannot be removed")]
    RootRemoval,
}

/// Hierarchical scene: an arena of nodes hanging off a single root
///
/// Node ids are never reused, so an id held after its node was removed
/// reports [`SceneError::UnknownNode`] instead of aliasing a newer node.
/// Removed nodes leave an empty slot behind and the arena never shrinks;
/// lookups by name still walk those slots.
pub struct Scene {
    nodes: Vec<Option<Node>>,
    root: NodeId,
    live: usize,
}

impl Scene {
    /// Creates a scene containing only its root group
    pub fn new() -> Self {
        Self {
            nodes: vec![Some(Node::group("Scene"))],
            root: NodeId(0),
            live: 1,
        }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Attaches `node` as the last child of `parent`
    pub fn add(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::UnknownNode(parent));
        }

        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        debug!("Attaching '{}' {} under {}", node.name, id, parent);
        self.nodes.push(Some(node));
        self.live += 1;

        self.node_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Attaches `node` directly under the scene root
    pub fn add_to_root(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        node.parent = Some(self.root);
        node.children.clear();
        self.nodes.push(Some(node));
        self.live += 1;
        if let Some(Some(root)) = self.nodes.get_mut(self.root.0) {
            root.children.push(id);
        }
        id
    }

    /// Removes a node and its whole subtree, returning the removed nodes
    /// in depth-first order (the node itself first)
    pub fn remove(&mut self, id: NodeId) -> Result<Vec<Node>, SceneError> {
        if id == self.root {
            return Err(SceneError::RootRemoval);
        }
        let parent = self.node(id)?.parent;

        if let Some(parent) = parent {
            self.node_mut(parent)?.children.retain(|&child| child != id);
        }

        let mut removed = Vec::new();
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(node) = self.nodes.get_mut(current.0).and_then(Option::take) {
                stack.extend(node.children.iter().rev().copied());
                removed.push(node);
            }
        }

        self.live -= removed.len();
        debug!("Removed {} node(s) rooted at {}", removed.len(), id);
        Ok(removed)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        matches!(self.nodes.get(id.0), Some(Some(_)))
    }

    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.0).and_then(Option::as_ref)
    }

    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id.0).and_then(Option::as_mut)
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.get(id).ok_or(SceneError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.get_mut(id).ok_or(SceneError::UnknownNode(id))
    }

    /// Adds `increment` to a node's rotation about each axis
    pub fn rotate(&mut self, id: NodeId, increment: Vector3<f32>) -> Result<(), SceneError> {
        self.node_mut(id)?.transform.rotate(increment);
        Ok(())
    }

    /// Number of live nodes, root included
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes
            .iter()
            .enumerate()
            .find(|(_, slot)| slot.as_ref().is_some_and(|node| node.name == name))
            .map(|(index, _)| NodeId(index))
    }

    /// World matrix of a node: every ancestor's local matrix composed
    /// top-down, then the node's own
    pub fn world_matrix(&self, id: NodeId) -> Result<Matrix4<f32>, SceneError> {
        let mut world = self.node(id)?.local_matrix();
        let mut current = self.node(id)?.parent;

        while let Some(parent_id) = current {
            let parent = self.node(parent_id)?;
            world = parent.local_matrix() * world;
            current = parent.parent;
        }

        Ok(world)
    }

    pub fn world_position(&self, id: NodeId) -> Result<Vector3<f32>, SceneError> {
        Ok(self.world_matrix(id)?.w.truncate())
    }

    /// Visits every node depth-first from the root, parents before children,
    /// passing each node's world matrix
    pub fn walk<F>(&self, mut visit: F)
    where
        F: FnMut(NodeId, &Node, &Matrix4<f32>),
    {
        let mut stack = vec![(self.root, identity())];

        while let Some((id, parent_world)) = stack.pop() {
            let Some(node) = self.get(id) else {
                continue;
            };
            let world = parent_world * node.local_matrix();
            visit(id, node, &world);

            for &child in node.children.iter().rev() {
                stack.push((child, world));
            }
        }
    }

    /// Resolves every light in the scene to world space
    pub fn lighting(&self) -> SceneLighting {
        let mut lighting = SceneLighting::default();

        self.walk(|_, node, world| match &node.kind {
            NodeKind::PointLight(light) => lighting.point_lights.push(ResolvedPointLight {
                position: world.w.truncate(),
                color: light.color,
                intensity: light.intensity,
            }),
            NodeKind::AmbientLight(light) => {
                let radiance = light.radiance();
                for (sum, value) in lighting.ambient.iter_mut().zip(radiance) {
                    *sum += value;
                }
            }
            _ => {}
        });

        trace!(
            "Resolved {} point light(s), ambient {:?}",
            lighting.point_lights.len(),
            lighting.ambient
        );
        lighting
    }

    /// Gets statistics about the scene
    pub fn statistics(&self) -> SceneStatistics {
        let mut stats = SceneStatistics::default();

        for node in self.nodes.iter().flatten() {
            stats.node_count += 1;
            match &node.kind {
                NodeKind::Orbit => stats.orbit_count += 1,
                NodeKind::Mesh(mesh) => {
                    stats.mesh_count += 1;
                    let width = mesh.geometry.width_segments.max(MIN_WIDTH_SEGMENTS) as usize;
                    let height = mesh.geometry.height_segments.max(MIN_HEIGHT_SEGMENTS) as usize;
                    stats.total_vertices += (width + 1) * (height + 1);
                }
                NodeKind::PointLight(_) | NodeKind::AmbientLight(_) => stats.light_count += 1,
                NodeKind::Group => {}
            }
        }

        stats
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

/// Scene statistics for debugging and logging
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SceneStatistics {
    pub node_count: usize,
    pub orbit_count: usize,
    pub mesh_count: usize,
    pub light_count: usize,
    pub total_vertices: usize,
}
