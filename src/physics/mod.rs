//! # Physics Module
//!
//! Collision bookkeeping for scene objects. There is no detection or
//! integration here: a detector outside this crate decides when two objects
//! intersect and reports it to the [`CollisionWorld`], which runs the
//! objects' listeners and queues flagged objects for removal.
//!
//! ```rust
//! use orrery::gfx::scene::{Node, Scene};
//! use orrery::physics::{CollisionObject, CollisionWorld};
//!
//! let mut scene = Scene::new();
//! let coin_mesh = scene.add_to_root(Node::group("Coin"));
//! let player_mesh = scene.add_to_root(Node::group("Player"));
//!
//! let mut world = CollisionWorld::new();
//! let mut coin = CollisionObject::dynamic(coin_mesh);
//! coin.set_on_intersect_listener(|this, _| this.destroy());
//! let coin = world.insert(coin);
//! let player = world.insert(CollisionObject::dynamic(player_mesh));
//!
//! world.report_intersection(player, coin).unwrap();
//! for (_, object) in world.drain_destroyed() {
//!     scene.remove(object.mesh()).unwrap();
//! }
//! assert!(!scene.contains(coin_mesh));
//! ```

pub mod collision_object;
pub mod world;

pub use collision_object::{CollisionObject, CollisionObjectId, IntersectListener, Intersection};
pub use world::{CollisionWorld, PhysicsError};
