use cgmath::{Matrix4, Rad, SquareMatrix, Vector3};

use super::light::{AmbientLight, PointLight};
use crate::gfx::{geometry::SphereGeometry, materials::MaterialId};

/// Index of a node inside a [`Scene`](super::Scene)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Local transform of a node relative to its parent
///
/// Rotation is stored as Euler angles in radians, applied in XYZ order.
/// Angles accumulate freely and are never wrapped.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::new(0.0, 0.0, 0.0),
            rotation: Vector3::new(0.0, 0.0, 0.0),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(position: Vector3<f32>) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Adds `increment` to the rotation about each axis independently
    pub fn rotate(&mut self, increment: Vector3<f32>) {
        self.rotation += increment;
    }

    /// Rotation matrix, X applied last (T * Rx * Ry * Rz * S order)
    pub fn rotation_matrix(&self) -> Matrix4<f32> {
        Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z))
    }

    /// Local matrix: translation * rotation * scale
    pub fn matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * self.rotation_matrix() * s // Order matters: T * R * S
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Renderable sphere body: geometry descriptor plus material reference
#[derive(Debug, Clone, PartialEq)]
pub struct Mesh {
    pub geometry: SphereGeometry,
    pub material: MaterialId,
}

impl Mesh {
    pub fn new(geometry: SphereGeometry, material: impl Into<MaterialId>) -> Self {
        Self {
            geometry,
            material: material.into(),
        }
    }
}

/// What a node is, beyond its transform
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Plain grouping node (the scene root is one)
    Group,
    /// Invisible anchor carrying orbital rotation only
    Orbit,
    Mesh(Mesh),
    PointLight(PointLight),
    AmbientLight(AmbientLight),
}

impl NodeKind {
    pub fn is_renderable(&self) -> bool {
        matches!(self, NodeKind::Mesh(_))
    }
}

/// A node in the scene hierarchy
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    pub name: String,
    pub kind: NodeKind,
    pub transform: Transform,
    pub visible: bool,
    pub(crate) parent: Option<NodeId>,
    pub(crate) children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            transform: Transform::default(),
            visible: true,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn group(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Group)
    }

    pub fn orbit(name: impl Into<String>) -> Self {
        Self::new(name, NodeKind::Orbit)
    }

    pub fn mesh(name: impl Into<String>, mesh: Mesh) -> Self {
        Self::new(name, NodeKind::Mesh(mesh))
    }

    /// Builder pattern: set the local position
    pub fn with_position(mut self, position: Vector3<f32>) -> Self {
        self.transform.position = position;
        self
    }

    /// Builder pattern: set the local rotation (radians)
    pub fn with_rotation(mut self, rotation: Vector3<f32>) -> Self {
        self.transform.rotation = rotation;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn as_mesh(&self) -> Option<&Mesh> {
        match &self.kind {
            NodeKind::Mesh(mesh) => Some(mesh),
            _ => None,
        }
    }

    pub fn local_matrix(&self) -> Matrix4<f32> {
        self.transform.matrix()
    }
}

impl Default for Node {
    fn default() -> Self {
        Self::group("Group")
    }
}

pub(crate) fn identity() -> Matrix4<f32> {
    Matrix4::identity()
}
