//! Collision participants
//!
//! A [`CollisionObject`] tags a mesh node as static or dynamic and carries an
//! optional intersection listener. It performs no detection itself: an
//! external detector reports intersections through the
//! [`CollisionWorld`](super::CollisionWorld), which invokes the listener.

use std::fmt;

use crate::gfx::scene::NodeId;

/// Identifies an object registered in a [`CollisionWorld`](super::CollisionWorld)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollisionObjectId(pub(crate) u32);

impl fmt::Display for CollisionObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "collider {}", self.0)
    }
}

/// What the listener learns about the other party of an intersection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intersection {
    pub other: CollisionObjectId,
    pub other_mesh: NodeId,
    pub other_is_static: bool,
}

/// Intersection callback; receives the owning object as its context
pub type IntersectListener = Box<dyn FnMut(&mut CollisionObject, &Intersection)>;

pub struct CollisionObject {
    mesh: NodeId,
    is_static: bool,
    pending_destroy: bool,
    on_intersect: Option<IntersectListener>,
}

impl CollisionObject {
    pub fn new(mesh: NodeId, is_static: bool) -> Self {
        Self {
            mesh,
            is_static,
            pending_destroy: false,
            on_intersect: None,
        }
    }

    /// Static collider for `mesh`
    pub fn fixed(mesh: NodeId) -> Self {
        Self::new(mesh, true)
    }

    /// Dynamic collider for `mesh`
    pub fn dynamic(mesh: NodeId) -> Self {
        Self::new(mesh, false)
    }

    pub fn mesh(&self) -> NodeId {
        self.mesh
    }

    pub fn is_static(&self) -> bool {
        self.is_static
    }

    pub fn is_pending_destroy(&self) -> bool {
        self.pending_destroy
    }

    pub fn has_listener(&self) -> bool {
        self.on_intersect.is_some()
    }

    /// Stores `listener`, replacing any previous one
    pub fn set_on_intersect_listener<F>(&mut self, listener: F)
    where
        F: FnMut(&mut CollisionObject, &Intersection) + 'static,
    {
        self.on_intersect = Some(Box::new(listener));
    }

    /// Flags the object for removal by its owner. Repeated calls are no-ops.
    pub fn destroy(&mut self) {
        self.pending_destroy = true;
    }

    /// Runs the listener with this object as its context
    ///
    /// Returns whether a listener ran. A listener that installs a replacement
    /// while running keeps the replacement.
    pub fn notify_intersect(&mut self, intersection: &Intersection) -> bool {
        let Some(mut listener) = self.on_intersect.take() else {
            return false;
        };

        listener(self, intersection);

        if self.on_intersect.is_none() {
            self.on_intersect = Some(listener);
        }
        true
    }
}

impl fmt::Debug for CollisionObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CollisionObject")
            .field("mesh", &self.mesh)
            .field("is_static", &self.is_static)
            .field("pending_destroy", &self.pending_destroy)
            .field("has_listener", &self.has_listener())
            .finish()
    }
}
