//! # Scene Management Module
//!
//! Hierarchical scene graph for the orrery: nodes with local transforms,
//! parent/child links, world-matrix composition and light resolution.
//!
//! ## Key Components
//!
//! - [`Scene`] - Arena of nodes hanging off a single root group
//! - [`Node`] - A named node with a [`Transform`] and a [`NodeKind`]
//! - [`Mesh`] - Sphere geometry descriptor plus material reference
//! - [`PointLight`] / [`AmbientLight`] - Light node payloads
//!
//! ## Transform composition
//!
//! A node's world matrix is its ancestors' local matrices composed
//! top-down followed by its own. Parking a body under an invisible
//! [`NodeKind::Orbit`] node lets revolution (rotating the orbit node) and
//! spin (rotating the body) stay independent:
//!
//! ```rust
//! use cgmath::Vector3;
//! use orrery::gfx::scene::{Node, Scene};
//!
//! let mut scene = Scene::new();
//! let orbit = scene.add_to_root(Node::orbit("Orbit"));
//! let body = scene
//!     .add(orbit, Node::group("Body").with_position(Vector3::new(15.0, 0.0, 0.0)))
//!     .unwrap();
//!
//! scene.rotate(body, Vector3::new(0.0, 1.0, 0.0)).unwrap();
//! // Spinning the body leaves its position untouched
//! assert!((scene.world_position(body).unwrap().x - 15.0).abs() < 1e-5);
//! ```

pub mod light;
pub mod node;
pub mod scene;

// Re-export main types
pub use light::{
    rgb_from_hex, AmbientLight, LightingUniform, PointLight, ResolvedPointLight, SceneLighting,
};
pub use node::{Mesh, Node, NodeId, NodeKind, Transform};
pub use scene::{Scene, SceneError, SceneStatistics};
