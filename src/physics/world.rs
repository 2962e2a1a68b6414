//! Ownership of collision objects and their removal queue

use std::collections::BTreeMap;

use log::{debug, trace};
use thiserror::Error;

use super::collision_object::{CollisionObject, CollisionObjectId, Intersection};

#[derive(Debug, Error, PartialEq, Eq)]
pub enum PhysicsError {
    #[error("{0} is not registered")]
    UnknownObject(CollisionObjectId),
}

/// Owns every collision object and decides when flagged ones leave
///
/// Objects flag themselves with [`CollisionObject::destroy`]; nothing is
/// removed until the owner drains the queue with
/// [`drain_destroyed`](Self::drain_destroyed), once per frame.
#[derive(Debug, Default)]
pub struct CollisionWorld {
    objects: BTreeMap<CollisionObjectId, CollisionObject>,
    next_id: u32,
}

impl CollisionWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, object: CollisionObject) -> CollisionObjectId {
        let id = CollisionObjectId(self.next_id);
        self.next_id += 1;
        debug!("Registered {} for mesh {}", id, object.mesh());
        self.objects.insert(id, object);
        id
    }

    pub fn get(&self, id: CollisionObjectId) -> Option<&CollisionObject> {
        self.objects.get(&id)
    }

    pub fn get_mut(&mut self, id: CollisionObjectId) -> Option<&mut CollisionObject> {
        self.objects.get_mut(&id)
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CollisionObjectId, &CollisionObject)> {
        self.objects.iter().map(|(&id, object)| (id, object))
    }

    /// Entry point for an external detector: `a` and `b` intersect
    ///
    /// Each side's listener runs with the other side as its [`Intersection`].
    /// Both ids are checked before any listener runs.
    pub fn report_intersection(
        &mut self,
        a: CollisionObjectId,
        b: CollisionObjectId,
    ) -> Result<(), PhysicsError> {
        let seen_by_a = self.describe(b)?;
        let seen_by_b = self.describe(a)?;
        trace!("Intersection between {} and {}", a, b);

        if let Some(object) = self.objects.get_mut(&a) {
            object.notify_intersect(&seen_by_a);
        }
        if a != b {
            if let Some(object) = self.objects.get_mut(&b) {
                object.notify_intersect(&seen_by_b);
            }
        }
        Ok(())
    }

    /// Removes every object flagged for destruction, in registration order
    pub fn drain_destroyed(&mut self) -> Vec<(CollisionObjectId, CollisionObject)> {
        let flagged: Vec<CollisionObjectId> = self
            .objects
            .iter()
            .filter(|(_, object)| object.is_pending_destroy())
            .map(|(&id, _)| id)
            .collect();

        let drained: Vec<_> = flagged
            .into_iter()
            .filter_map(|id| self.objects.remove(&id).map(|object| (id, object)))
            .collect();

        if !drained.is_empty() {
            debug!("Drained {} destroyed collision object(s)", drained.len());
        }
        drained
    }

    fn describe(&self, id: CollisionObjectId) -> Result<Intersection, PhysicsError> {
        let object = self.get(id).ok_or(PhysicsError::UnknownObject(id))?;
        Ok(Intersection {
            other: id,
            other_mesh: object.mesh(),
            other_is_static: object.is_static(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gfx::scene::NodeId;
    use std::{cell::RefCell, rc::Rc};

    #[test]
    fn test_report_reaches_both_sides() {
        let mut world = CollisionWorld::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let log = Rc::clone(&seen);
        let mut player = CollisionObject::dynamic(NodeId(1));
        player.set_on_intersect_listener(move |this, hit| {
            log.borrow_mut().push((this.mesh(), hit.other_mesh, hit.other_is_static));
        });

        let log = Rc::clone(&seen);
        let mut wall = CollisionObject::fixed(NodeId(2));
        wall.set_on_intersect_listener(move |this, hit| {
            log.borrow_mut().push((this.mesh(), hit.other_mesh, hit.other_is_static));
        });

        let player = world.insert(player);
        let wall = world.insert(wall);
        world.report_intersection(player, wall).unwrap();

        assert_eq!(
            *seen.borrow(),
            vec![(NodeId(1), NodeId(2), true), (NodeId(2), NodeId(1), false)]
        );
    }

    #[test]
    fn test_unknown_id_runs_no_listener() {
        let mut world = CollisionWorld::new();
        let mut coin = CollisionObject::dynamic(NodeId(4));
        coin.set_on_intersect_listener(|this, _| this.destroy());
        let coin = world.insert(coin);

        let ghost = CollisionObjectId(99);
        assert_eq!(
            world.report_intersection(coin, ghost),
            Err(PhysicsError::UnknownObject(ghost))
        );
        assert!(!world.get(coin).unwrap().is_pending_destroy());
    }

    #[test]
    fn test_drain_only_flagged_in_order() {
        let mut world = CollisionWorld::new();
        let a = world.insert(CollisionObject::dynamic(NodeId(10)));
        let b = world.insert(CollisionObject::dynamic(NodeId(11)));
        let c = world.insert(CollisionObject::dynamic(NodeId(12)));

        world.get_mut(c).unwrap().destroy();
        world.get_mut(a).unwrap().destroy();

        let drained: Vec<_> = world
            .drain_destroyed()
            .into_iter()
            .map(|(id, object)| (id, object.mesh()))
            .collect();
        assert_eq!(drained, vec![(a, NodeId(10)), (c, NodeId(12))]);
        assert_eq!(world.len(), 1);
        assert!(world.get(b).is_some());
        assert!(world.drain_destroyed().is_empty());
    }

    #[test]
    fn test_listener_destroy_is_deferred_to_drain() {
        let mut world = CollisionWorld::new();
        let mut pickup = CollisionObject::dynamic(NodeId(7));
        pickup.set_on_intersect_listener(|this, _| this.destroy());
        let pickup = world.insert(pickup);
        let player = world.insert(CollisionObject::dynamic(NodeId(8)));

        world.report_intersection(player, pickup).unwrap();
        // Flagged, but still owned by the world until drained
        assert!(world.get(pickup).unwrap().is_pending_destroy());
        assert_eq!(world.len(), 2);

        assert_eq!(world.drain_destroyed().len(), 1);
        assert!(world.get(pickup).is_none());
    }
}
